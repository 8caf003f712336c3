use crate::platform::{NodeId, Scheduler, Surface, TimerHandle};
use crate::types::{Notification, Severity};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Single-slot notification area. Showing a message replaces the previous
/// one, and only one dismiss timer is ever pending.
#[derive(Clone)]
pub struct Notifier {
    inner: Rc<NotifierInner>,
}

struct NotifierInner {
    surface: Rc<dyn Surface>,
    scheduler: Rc<dyn Scheduler>,
    fade_ms: u32,
    next_id: Cell<u64>,
    current: Cell<Option<NodeId>>,
    pending: RefCell<Option<TimerHandle>>,
}

impl NotifierInner {
    fn dismiss(&self, id: NodeId) {
        self.pending.borrow_mut().take();
        self.surface.remove(id);
        if self.current.get() == Some(id) {
            self.current.set(None);
        }
    }

    fn begin_fade(self: &Rc<Self>, id: NodeId) {
        self.surface.fade_out(id);
        let weak = Rc::downgrade(self);
        let handle = self.scheduler.timeout(
            self.fade_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    debug!(id = id.0, "notification expired");
                    inner.dismiss(id);
                }
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }
}

impl Notifier {
    pub fn new(surface: Rc<dyn Surface>, scheduler: Rc<dyn Scheduler>, fade_ms: u32) -> Self {
        Self {
            inner: Rc::new(NotifierInner {
                surface,
                scheduler,
                fade_ms,
                next_id: Cell::new(0),
                current: Cell::new(None),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn show_message(&self, message: &str, severity: Severity, duration_ms: u32) {
        let inner = &self.inner;
        if !inner.surface.ensure_container() {
            warn!("message container not found");
            return;
        }

        self.clear_messages();

        let id = NodeId(inner.next_id.get());
        inner.next_id.set(id.0 + 1);
        let notification = Notification::new(message, severity, duration_ms);

        let weak: Weak<NotifierInner> = Rc::downgrade(inner);
        let on_click = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.dismiss(id);
            }
        });
        if !inner.surface.render(id, &notification, on_click) {
            warn!("failed to render notification");
            return;
        }
        inner.current.set(Some(id));

        if duration_ms > 0 {
            let weak = Rc::downgrade(inner);
            let handle = inner.scheduler.timeout(
                duration_ms,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.begin_fade(id);
                    }
                }),
            );
            *inner.pending.borrow_mut() = Some(handle);
        }
    }

    pub fn info(&self, message: &str, duration_ms: u32) {
        self.show_message(message, Severity::Info, duration_ms);
    }

    pub fn success(&self, message: &str, duration_ms: u32) {
        self.show_message(message, Severity::Success, duration_ms);
    }

    pub fn warning(&self, message: &str, duration_ms: u32) {
        self.show_message(message, Severity::Warning, duration_ms);
    }

    pub fn error(&self, message: &str, duration_ms: u32) {
        self.show_message(message, Severity::Error, duration_ms);
    }

    pub fn clear_messages(&self) {
        self.inner.pending.borrow_mut().take();
        self.inner.current.set(None);
        self.inner.surface.clear();
    }

    pub fn has_pending_dismiss(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    pub fn is_showing(&self) -> bool {
        self.inner.current.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSurface, ManualScheduler};

    fn setup() -> (Rc<FakeSurface>, Rc<ManualScheduler>, Notifier) {
        let surface = Rc::new(FakeSurface::default());
        let scheduler = Rc::new(ManualScheduler::default());
        let notifier = Notifier::new(surface.clone(), scheduler.clone(), 300);
        (surface, scheduler, notifier)
    }

    #[test]
    fn test_show_creates_container_lazily() {
        let (surface, _, notifier) = setup();
        assert!(!surface.has_container());
        notifier.show_message("Saved", Severity::Success, 5000);
        assert!(surface.has_container());
        assert_eq!(surface.visible()[0].message, "Saved");
        assert_eq!(surface.visible()[0].severity, Severity::Success);
    }

    #[test]
    fn test_second_message_replaces_first() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("first", Severity::Info, 5000);
        notifier.show_message("second", Severity::Warning, 5000);

        assert_eq!(surface.visible_count(), 1);
        assert_eq!(surface.visible()[0].message, "second");
        assert_eq!(scheduler.active_timers(), 1);
    }

    #[test]
    fn test_auto_dismiss_fades_then_removes() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("bye", Severity::Info, 5000);

        scheduler.advance(4999);
        assert_eq!(surface.visible_count(), 1);
        assert!(!surface.is_faded(0));

        scheduler.advance(1);
        assert!(surface.is_faded(0));
        assert_eq!(scheduler.active_timers(), 1);

        scheduler.advance(299);
        assert_eq!(surface.visible_count(), 1);
        scheduler.advance(1);
        assert_eq!(surface.visible_count(), 0);
        assert_eq!(scheduler.active_timers(), 0);
        assert!(!notifier.is_showing());
    }

    #[test]
    fn test_zero_duration_is_persistent() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("sticky", Severity::Error, 0);
        assert_eq!(scheduler.active_timers(), 0);
        scheduler.advance(60_000);
        assert_eq!(surface.visible_count(), 1);
    }

    #[test]
    fn test_click_cancels_timer_and_removes() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("click me", Severity::Info, 5000);
        surface.click(0);

        assert_eq!(surface.visible_count(), 0);
        assert!(!notifier.has_pending_dismiss());
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[test]
    fn test_stale_timer_does_not_touch_new_message() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("old", Severity::Info, 1000);
        scheduler.advance(500);
        notifier.show_message("new", Severity::Info, 5000);
        scheduler.advance(1000);

        assert_eq!(surface.visible_count(), 1);
        assert!(!surface.is_faded(0));
        assert_eq!(surface.visible()[0].message, "new");
    }

    #[test]
    fn test_clear_messages() {
        let (surface, scheduler, notifier) = setup();
        notifier.show_message("a", Severity::Info, 5000);
        notifier.clear_messages();
        assert_eq!(surface.visible_count(), 0);
        assert_eq!(scheduler.active_timers(), 0);

        // clearing an empty area is fine
        notifier.clear_messages();
    }

    #[test]
    fn test_missing_container_is_a_no_op() {
        let surface = Rc::new(FakeSurface::detached());
        let scheduler = Rc::new(ManualScheduler::default());
        let notifier = Notifier::new(surface.clone(), scheduler.clone(), 300);

        notifier.show_message("lost", Severity::Error, 5000);
        assert_eq!(surface.visible_count(), 0);
        assert_eq!(scheduler.active_timers(), 0);
    }
}
