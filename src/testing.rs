//! Test doubles for the platform traits.

use crate::error::{StorageError, TransportError};
use crate::platform::{
    HttpRequest, HttpResponse, KeyValueStore, LocalTask, MemoryStore, NodeId, Platform,
    Scheduler, Surface, TimerHandle, Transport,
};
use crate::types::{ConnectionState, Notification};
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

// --- Surface ---

pub struct Rendered {
    pub id: NodeId,
    pub notification: Notification,
    pub faded: bool,
    on_click: Option<Box<dyn FnOnce()>>,
}

pub struct FakeSurface {
    has_document: Cell<bool>,
    container: Cell<bool>,
    nodes: RefCell<Vec<Rendered>>,
    indicators: Cell<usize>,
    status: Cell<Option<ConnectionState>>,
    status_writes: Cell<usize>,
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self {
            has_document: Cell::new(true),
            container: Cell::new(false),
            nodes: RefCell::default(),
            indicators: Cell::new(2),
            status: Cell::new(None),
            status_writes: Cell::new(0),
        }
    }
}

impl FakeSurface {
    /// A page without a body: the container can never be created.
    pub fn detached() -> Self {
        let surface = Self::default();
        surface.has_document.set(false);
        surface
    }

    pub fn has_container(&self) -> bool {
        self.container.get()
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.nodes
            .borrow()
            .iter()
            .map(|n| n.notification.clone())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn count_of(&self, severity: crate::types::Severity) -> usize {
        self.nodes
            .borrow()
            .iter()
            .filter(|n| n.notification.severity == severity)
            .count()
    }

    pub fn is_faded(&self, index: usize) -> bool {
        self.nodes.borrow().get(index).is_some_and(|n| n.faded)
    }

    pub fn click(&self, index: usize) {
        let handler = self
            .nodes
            .borrow_mut()
            .get_mut(index)
            .and_then(|n| n.on_click.take());
        if let Some(handler) = handler {
            handler();
        }
    }

    pub fn status(&self) -> Option<ConnectionState> {
        self.status.get()
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.get()
    }
}

impl Surface for FakeSurface {
    fn ensure_container(&self) -> bool {
        if self.has_document.get() {
            self.container.set(true);
        }
        self.container.get()
    }

    fn render(&self, id: NodeId, notification: &Notification, on_click: Box<dyn FnOnce()>) -> bool {
        if !self.container.get() {
            return false;
        }
        self.nodes.borrow_mut().push(Rendered {
            id,
            notification: notification.clone(),
            faded: false,
            on_click: Some(on_click),
        });
        true
    }

    fn fade_out(&self, id: NodeId) {
        if let Some(n) = self.nodes.borrow_mut().iter_mut().find(|n| n.id == id) {
            n.faded = true;
        }
    }

    fn remove(&self, id: NodeId) {
        self.nodes.borrow_mut().retain(|n| n.id != id);
    }

    fn clear(&self) {
        self.nodes.borrow_mut().clear();
    }

    fn set_connection_status(&self, state: ConnectionState) -> usize {
        self.status.set(Some(state));
        self.status_writes.set(self.status_writes.get() + 1);
        self.indicators.get()
    }
}

// --- Transport ---

#[derive(Default)]
pub struct FakeTransport {
    script: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: RefCell<Option<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

pub fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text.to_string(),
        body: body.to_string(),
    }
}

impl FakeTransport {
    /// Every request that is not scripted gets this answer.
    pub fn always(result: Result<HttpResponse, TransportError>) -> Self {
        let transport = Self::default();
        *transport.fallback.borrow_mut() = Some(result);
        transport
    }

    pub fn json(body: &str) -> Self {
        Self::always(Ok(response(200, "OK", body)))
    }

    pub fn set_fallback(&self, result: Result<HttpResponse, TransportError>) {
        *self.fallback.borrow_mut() = Some(result);
    }

    pub fn push(&self, result: Result<HttpResponse, TransportError>) {
        self.script.borrow_mut().push_back(result);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        if let Some(next) = self.script.borrow_mut().pop_front() {
            return next;
        }
        self.fallback
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(TransportError("no scripted response".into())))
    }
}

type Reply = Result<HttpResponse, TransportError>;

/// Keeps every request open until the test answers it by index.
#[derive(Default)]
pub struct HeldTransport {
    pending: RefCell<Vec<Option<oneshot::Sender<Reply>>>>,
}

impl HeldTransport {
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().iter().filter(|p| p.is_some()).count()
    }

    pub fn release(&self, index: usize, result: Reply) {
        let sender = self
            .pending
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take);
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }
}

#[async_trait(?Send)]
impl Transport for HeldTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(TransportError("request abandoned".into())))
    }
}

// --- Storage ---

pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("SecurityError".into()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("SecurityError".into()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("SecurityError".into()))
    }
}

// --- Scheduler ---

enum Callback {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut()>),
}

struct Timer {
    seq: u64,
    due: u64,
    period: Option<u64>,
    cancelled: Rc<Cell<bool>>,
    callback: Callback,
}

struct CancelOnDrop(Rc<Cell<bool>>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

/// Virtual clock: timers only fire inside `advance`, and spawned tasks run
/// until stalled after each one.
pub struct ManualScheduler {
    now: Cell<u64>,
    seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(0),
            seq: Cell::new(0),
            timers: RefCell::default(),
            pool: RefCell::new(pool),
            spawner,
        }
    }
}

impl ManualScheduler {
    pub fn active_timers(&self) -> usize {
        self.timers
            .borrow()
            .iter()
            .filter(|t| !t.cancelled.get())
            .count()
    }

    pub fn active_intervals(&self) -> usize {
        self.timers
            .borrow()
            .iter()
            .filter(|t| !t.cancelled.get() && t.period.is_some())
            .count()
    }

    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        self.run_until_stalled();
        while let Some(timer) = self.next_due(target) {
            let Timer {
                seq,
                due,
                period,
                cancelled,
                callback,
            } = timer;
            self.now.set(due);
            match callback {
                Callback::Once(f) => f(),
                Callback::Repeat(mut f) => {
                    f();
                    if !cancelled.get() {
                        self.timers.borrow_mut().push(Timer {
                            seq,
                            due: due + period.unwrap_or(1).max(1),
                            period,
                            cancelled,
                            callback: Callback::Repeat(f),
                        });
                    }
                }
            }
            self.run_until_stalled();
        }
        self.timers.borrow_mut().retain(|t| !t.cancelled.get());
        self.now.set(target);
    }

    fn next_due(&self, target: u64) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        timers.retain(|t| !t.cancelled.get());
        let idx = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.remove(idx))
    }

    fn schedule(&self, ms: u32, period: Option<u64>, callback: Callback) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            seq,
            due: self.now.get() + u64::from(ms),
            period,
            cancelled: cancelled.clone(),
            callback,
        });
        TimerHandle::new(CancelOnDrop(cancelled))
    }
}

impl Scheduler for ManualScheduler {
    fn timeout(&self, ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        self.schedule(ms, None, Callback::Once(callback))
    }

    fn interval(&self, ms: u32, callback: Box<dyn FnMut()>) -> TimerHandle {
        self.schedule(ms, Some(u64::from(ms)), Callback::Repeat(callback))
    }

    fn spawn(&self, task: LocalTask) {
        let _ = self.spawner.spawn_local(task);
    }
}

/// A full set of fakes plus typed handles to inspect them.
pub struct Harness {
    pub surface: Rc<FakeSurface>,
    pub transport: Rc<FakeTransport>,
    pub store: Rc<MemoryStore>,
    pub scheduler: Rc<ManualScheduler>,
}

impl Harness {
    pub fn new(transport: FakeTransport) -> Self {
        Self {
            surface: Rc::new(FakeSurface::default()),
            transport: Rc::new(transport),
            store: Rc::new(MemoryStore::new()),
            scheduler: Rc::new(ManualScheduler::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            surface: self.surface.clone(),
            transport: self.transport.clone(),
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}
