use crate::config::{ConsoleOptions, STATUS_ENDPOINT};
use crate::notify::Notifier;
use crate::platform::{HttpRequest, Method, Scheduler, Surface, TimerHandle, Transport};
use crate::types::ConnectionState;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

pub const CONNECTION_LOST_MESSAGE: &str = "Connection to device lost";

/// Header-only liveness probe. Any transport failure counts as offline.
pub async fn check_connection_status(transport: &dyn Transport, url: &str) -> bool {
    let mut request = HttpRequest::new(Method::Head, url);
    request.no_cache = true;
    match transport.send(request).await {
        Ok(response) => response.ok(),
        Err(e) => {
            debug!(error = %e, "status probe failed");
            false
        }
    }
}

#[derive(Clone)]
pub struct ConnectionMonitor {
    inner: Rc<MonitorInner>,
}

struct MonitorInner {
    transport: Rc<dyn Transport>,
    scheduler: Rc<dyn Scheduler>,
    surface: Rc<dyn Surface>,
    notifier: Notifier,
    options: Rc<ConsoleOptions>,
    poll: RefCell<Option<TimerHandle>>,
    state: Cell<ConnectionState>,
    /// Sequence number of the last probe issued.
    issued: Cell<u64>,
    /// Probes at or below this number are discarded when they finish.
    floor: Cell<u64>,
}

impl MonitorInner {
    fn status_url(&self) -> String {
        self.options.endpoint(STATUS_ENDPOINT)
    }

    fn tick(self: &Rc<Self>) {
        let transport = self.transport.clone();
        let url = self.status_url();
        let seq = self.issued.get() + 1;
        self.issued.set(seq);
        let weak: Weak<MonitorInner> = Rc::downgrade(self);
        self.scheduler.spawn(Box::pin(async move {
            let online = check_connection_status(transport.as_ref(), &url).await;
            if let Some(inner) = weak.upgrade() {
                inner.apply(seq, online);
            }
        }));
    }

    fn apply(&self, seq: u64, online: bool) {
        if seq <= self.floor.get() {
            debug!(seq, online, "stale status probe dropped");
            return;
        }
        self.floor.set(seq);

        let next = ConnectionState::from(online);
        let updated = self.surface.set_connection_status(next);
        let previous = self.state.replace(next);
        debug!(online, indicators = updated, "connection polled");

        match (previous, next) {
            (ConnectionState::Online, ConnectionState::Offline) => {
                warn!("device unreachable");
                self.notifier
                    .warning(CONNECTION_LOST_MESSAGE, self.options.message_duration_ms);
            }
            (ConnectionState::Offline, ConnectionState::Online) => {
                info!("device reachable again");
            }
            _ => {}
        }
    }
}

impl ConnectionMonitor {
    pub fn new(
        transport: Rc<dyn Transport>,
        scheduler: Rc<dyn Scheduler>,
        surface: Rc<dyn Surface>,
        notifier: Notifier,
        options: Rc<ConsoleOptions>,
    ) -> Self {
        Self {
            inner: Rc::new(MonitorInner {
                transport,
                scheduler,
                surface,
                notifier,
                options,
                poll: RefCell::new(None),
                state: Cell::new(ConnectionState::Online),
                issued: Cell::new(0),
                floor: Cell::new(0),
            }),
        }
    }

    pub async fn check_connection_status(&self) -> bool {
        check_connection_status(self.inner.transport.as_ref(), &self.inner.status_url()).await
    }

    pub fn start_connection_monitoring(&self) {
        if self.is_active() {
            debug!("connection monitoring already running");
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let handle = self.inner.scheduler.interval(
            self.inner.options.poll_interval_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick();
                }
            }),
        );
        *self.inner.poll.borrow_mut() = Some(handle);
        debug!(
            interval_ms = self.inner.options.poll_interval_ms,
            "connection monitoring started"
        );
    }

    pub fn stop_connection_monitoring(&self) {
        // probes still in flight must not land after a stop
        self.inner.floor.set(self.inner.issued.get());
        if self.inner.poll.borrow_mut().take().is_some() {
            debug!("connection monitoring stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.poll.borrow().is_some()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.get()
    }
}
