//! Host facilities the console runs on: the document, the network, key/value
//! storage and timers. The browser implementations live in [`web`]; everything
//! above this module talks to the traits only.

use crate::error::{StorageError, TransportError};
use crate::types::{ConnectionState, Notification};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::MemoryStore;

// --- Document ---

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u64);

pub trait Surface {
    /// Makes sure the notification container exists, creating it if needed.
    /// Returns `false` when there is no document to put it in.
    fn ensure_container(&self) -> bool;
    fn render(&self, id: NodeId, notification: &Notification, on_click: Box<dyn FnOnce()>)
        -> bool;
    fn fade_out(&self, id: NodeId);
    fn remove(&self, id: NodeId);
    fn clear(&self);
    /// Rewrites every status indicator; returns how many were updated.
    fn set_connection_status(&self, state: ConnectionState) -> usize;
}

// --- Network ---

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            other => Err(format!("unsupported method {other}")),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub no_cache: bool,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// --- Storage ---

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// --- Timers ---

/// Owns a scheduled timer. Dropping the handle cancels the timer.
pub struct TimerHandle {
    _inner: Box<dyn Any>,
}

impl TimerHandle {
    pub fn new<T: 'static>(inner: T) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimerHandle")
    }
}

pub type LocalTask = LocalBoxFuture<'static, ()>;

pub trait Scheduler {
    fn timeout(&self, ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle;
    fn interval(&self, ms: u32, callback: Box<dyn FnMut()>) -> TimerHandle;
    fn spawn(&self, task: LocalTask);
}

/// The facilities one console session runs on.
#[derive(Clone)]
pub struct Platform {
    pub surface: Rc<dyn Surface>,
    pub transport: Rc<dyn Transport>,
    pub store: Rc<dyn KeyValueStore>,
    pub scheduler: Rc<dyn Scheduler>,
}

#[cfg(target_arch = "wasm32")]
impl Platform {
    /// Falls back to a [`MemoryStore`] when `localStorage` is blocked, so
    /// preferences still hold for the life of the page.
    pub fn browser() -> Self {
        let store: Rc<dyn KeyValueStore> = if web::BrowserStorage::available() {
            Rc::new(web::BrowserStorage)
        } else {
            tracing::warn!("localStorage unavailable, settings will not persist");
            Rc::new(MemoryStore::new())
        };
        Self {
            surface: Rc::new(web::DomSurface::default()),
            transport: Rc::new(web::FetchTransport),
            store,
            scheduler: Rc::new(web::BrowserScheduler),
        }
    }
}

/// Adapts a one-shot handler to a listener that may be invoked many times.
/// Only the first call runs it; dropping the listener drops the handler.
pub fn fire_once(handler: Box<dyn FnOnce()>) -> impl FnMut() {
    let mut handler = Some(handler);
    move || {
        if let Some(handler) = handler.take() {
            handler();
        }
    }
}
