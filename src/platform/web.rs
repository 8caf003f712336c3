use super::{
    fire_once, HttpRequest, HttpResponse, KeyValueStore, LocalTask, Method, NodeId, Scheduler, Surface,
    TimerHandle, Transport,
};
use crate::config::{CONNECTION_STATUS_CLASS, FADE_OUT_CLASS, MESSAGE_CONTAINER_ID};
use crate::error::{StorageError, TransportError};
use crate::types::{ConnectionState, Notification};
use async_trait::async_trait;
use gloo_timers::callback::{Interval, Timeout};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Headers, Request, RequestCache, RequestInit, Response};

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

struct MessageNode {
    element: Element,
    on_click: Closure<dyn FnMut(web_sys::Event)>,
}

impl MessageNode {
    fn detach(self) {
        let _ = self
            .element
            .remove_event_listener_with_callback("click", self.on_click.as_ref().unchecked_ref());
        self.element.remove();
    }
}

#[derive(Default)]
pub struct DomSurface {
    nodes: RefCell<HashMap<NodeId, MessageNode>>,
}

impl DomSurface {
    fn container(&self) -> Option<Element> {
        document()?.get_element_by_id(MESSAGE_CONTAINER_ID)
    }

    fn build(&self, doc: &Document, notification: &Notification) -> Result<Element, JsValue> {
        let node = doc.create_element("div")?;
        node.set_class_name(&notification.class_name());

        let text = doc.create_element("span")?;
        text.set_text_content(Some(&notification.message));
        node.append_child(&text)?;

        let close = doc.create_element("span")?;
        close.set_text_content(Some("\u{00d7}"));
        close.set_attribute("style", "float: right; cursor: pointer; font-weight: bold;")?;
        node.append_child(&close)?;

        Ok(node)
    }
}

impl Surface for DomSurface {
    fn ensure_container(&self) -> bool {
        if self.container().is_some() {
            return true;
        }
        let Some(doc) = document() else {
            return false;
        };
        let Some(body) = doc.body() else {
            return false;
        };
        match doc.create_element("div") {
            Ok(container) => {
                container.set_id(MESSAGE_CONTAINER_ID);
                body.append_child(&container).is_ok()
            }
            Err(_) => false,
        }
    }

    fn render(
        &self,
        id: NodeId,
        notification: &Notification,
        on_click: Box<dyn FnOnce()>,
    ) -> bool {
        let (Some(doc), Some(container)) = (document(), self.container()) else {
            return false;
        };
        let node = match self.build(&doc, notification) {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!(error = ?e, "failed to build notification node");
                return false;
            }
        };
        if container.append_child(&node).is_err() {
            return false;
        }

        // The close span bubbles up here too.
        let mut handler = fire_once(on_click);
        let on_click = Closure::wrap(
            Box::new(move |_: web_sys::Event| handler()) as Box<dyn FnMut(web_sys::Event)>
        );
        if let Err(e) = node.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()) {
            tracing::warn!(error = ?e, "failed to attach dismiss listener");
        }

        let replaced = self.nodes.borrow_mut().insert(
            id,
            MessageNode {
                element: node,
                on_click,
            },
        );
        if let Some(old) = replaced {
            old.detach();
        }
        true
    }

    fn fade_out(&self, id: NodeId) {
        if let Some(node) = self.nodes.borrow().get(&id) {
            let _ = node.element.class_list().add_1(FADE_OUT_CLASS);
        }
    }

    fn remove(&self, id: NodeId) {
        let node = self.nodes.borrow_mut().remove(&id);
        if let Some(node) = node {
            node.detach();
        }
    }

    fn clear(&self) {
        let nodes: Vec<MessageNode> = self.nodes.borrow_mut().drain().map(|(_, n)| n).collect();
        for node in nodes {
            node.detach();
        }
        if let Some(container) = self.container() {
            container.set_inner_html("");
        }
    }

    fn set_connection_status(&self, state: ConnectionState) -> usize {
        let Some(doc) = document() else {
            return 0;
        };
        let Ok(list) = doc.query_selector_all(&format!(".{}", CONNECTION_STATUS_CLASS)) else {
            return 0;
        };

        let mut updated = 0;
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                el.set_text_content(Some(state.label()));
                el.set_class_name(state.class_name());
                updated += 1;
            }
        }
        updated
    }
}

pub struct FetchTransport;

impl FetchTransport {
    async fn fetch(request: &HttpRequest) -> Result<HttpResponse, JsValue> {
        let window = web_sys::window().ok_or("No window")?;

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        if request.no_cache {
            opts.set_cache(RequestCache::NoCache);
        }
        let headers = Headers::new()?;
        for (name, value) in &request.headers {
            headers.set(name, value)?;
        }
        opts.set_headers(&headers);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let req = Request::new_with_str_and_init(&request.url, &opts)?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&req))
            .await?
            .dyn_into()?;

        let body = if request.method == Method::Head {
            String::new()
        } else {
            JsFuture::from(resp.text()?)
                .await?
                .as_string()
                .unwrap_or_default()
        };

        Ok(HttpResponse {
            status: resp.status(),
            status_text: resp.status_text(),
            body,
        })
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Self::fetch(&request).await.map_err(TransportError::from)
    }
}

/// `window.localStorage`; every call re-resolves it so a page that loses
/// storage access mid-session degrades instead of holding a dead handle.
pub struct BrowserStorage;

impl BrowserStorage {
    pub fn available() -> bool {
        Self::storage().is_ok()
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window".into()))?;
        window
            .local_storage()?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(Self::storage()?.get_item(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(Self::storage()?.set_item(key, value)?)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Ok(Self::storage()?.remove_item(key)?)
    }
}

pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn timeout(&self, ms: u32, callback: Box<dyn FnOnce()>) -> TimerHandle {
        TimerHandle::new(Timeout::new(ms, callback))
    }

    fn interval(&self, ms: u32, callback: Box<dyn FnMut()>) -> TimerHandle {
        TimerHandle::new(Interval::new(ms, callback))
    }

    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
