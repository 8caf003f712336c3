use crate::platform::{Scheduler, TimerHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Runs the callback once the calls have been quiet for `wait_ms`,
/// with the argument of the last call.
pub struct Debounce<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u32,
    callback: Rc<dyn Fn(A)>,
    pending: RefCell<Option<TimerHandle>>,
}

impl<A: 'static> Debounce<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            wait_ms,
            callback: Rc::new(callback),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, arg: A) {
        let callback = self.callback.clone();
        let handle = self
            .scheduler
            .timeout(self.wait_ms, Box::new(move || callback(arg)));
        // replacing the handle cancels the previous wait
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

/// Runs the callback at most once per `limit_ms`; calls inside the window are dropped.
pub struct Throttle<A> {
    scheduler: Rc<dyn Scheduler>,
    limit_ms: u32,
    callback: Box<dyn Fn(A)>,
    blocked: Rc<Cell<bool>>,
    reset: RefCell<Option<TimerHandle>>,
}

impl<A> Throttle<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, limit_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            limit_ms,
            callback: Box::new(callback),
            blocked: Rc::new(Cell::new(false)),
            reset: RefCell::new(None),
        }
    }

    /// Returns whether the callback ran.
    pub fn call(&self, arg: A) -> bool {
        if self.blocked.get() {
            return false;
        }
        (self.callback)(arg);
        self.blocked.set(true);

        let blocked = self.blocked.clone();
        let handle = self
            .scheduler
            .timeout(self.limit_ms, Box::new(move || blocked.set(false)));
        *self.reset.borrow_mut() = Some(handle);
        true
    }
}
