//! The page-facing namespace: one console per page, created when the module
//! loads and started once the document is ready.

use crate::config::ConsoleOptions;
use crate::logging::init_logging;
use crate::platform::web::BrowserScheduler;
use crate::platform::{Method, Platform, Scheduler};
use crate::session::Console;
use crate::shortcuts::Shortcut;
use crate::types::{Severity, UserPreferences};
use crate::utils::format::{format_bytes, format_timestamp_f64, format_uptime};
use crate::utils::timing::{Debounce, Throttle};
use crate::utils::validate::{
    validate_brightness, validate_device_id, validate_orientation, FieldValue,
};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

thread_local! {
    static CONSOLE: RefCell<Option<Rc<Console>>> = const { RefCell::new(None) };
}

fn console() -> Result<Rc<Console>, JsValue> {
    CONSOLE
        .with(|c| c.borrow().clone())
        .ok_or_else(|| JsValue::from_str("console not initialised"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn field_value(value: &JsValue) -> Option<FieldValue> {
    if let Some(n) = value.as_f64() {
        Some(FieldValue::Float(n))
    } else {
        value.as_string().map(FieldValue::Text)
    }
}

fn boot(options: ConsoleOptions) -> Rc<Console> {
    let console = Rc::new(Console::new(Platform::browser(), options));
    let previous = CONSOLE.with(|c| c.borrow_mut().replace(console.clone()));
    if let Some(previous) = previous {
        previous.stop();
    }
    console
}

fn install_page_hooks(console: &Rc<Console>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let weak = Rc::downgrade(console);
    let on_key = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let Some(shortcut) = Shortcut::from_key(event.ctrl_key(), &event.key()) else {
            return;
        };
        if shortcut.prevents_default() {
            event.prevent_default();
        }
        if let Some(console) = weak.upgrade() {
            console.handle_shortcut(shortcut);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    let weak = Rc::downgrade(console);
    let on_unload = Closure::wrap(Box::new(move |_: web_sys::Event| {
        if let Some(console) = weak.upgrade() {
            console.stop();
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())?;
    on_unload.forget();

    Ok(())
}

fn start_when_ready(console: Rc<Console>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("No document")?;

    install_page_hooks(&console)?;

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(move |_: web_sys::Event| console.start());
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        console.start();
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging(tracing::Level::INFO);
    start_when_ready(boot(ConsoleOptions::default()))
}

/// Restart the console with host-provided options.
#[wasm_bindgen]
pub fn configure(options: JsValue) -> Result<(), JsValue> {
    let options: ConsoleOptions = if options.is_undefined() || options.is_null() {
        ConsoleOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    start_when_ready(boot(options))
}

// --- UI ---

#[wasm_bindgen(js_name = showMessage)]
pub fn show_message(
    message: &str,
    severity: Option<String>,
    duration: Option<u32>,
) -> Result<(), JsValue> {
    let severity = severity.map(|s| Severity::parse(&s)).unwrap_or_default();
    console()?.show_message(message, severity, duration);
    Ok(())
}

#[wasm_bindgen(js_name = clearMessages)]
pub fn clear_messages() -> Result<(), JsValue> {
    console()?.clear_messages();
    Ok(())
}

#[wasm_bindgen(js_name = registerShortcut)]
pub fn register_shortcut(name: &str, handler: js_sys::Function) -> Result<(), JsValue> {
    let console = console()?;
    let call = move || {
        if let Err(e) = handler.call0(&JsValue::NULL) {
            tracing::warn!(error = ?e, "shortcut handler threw");
        }
    };
    match name.parse::<Shortcut>()? {
        Shortcut::Refresh => console.on_refresh(call),
        Shortcut::Save => console.on_save(call),
        Shortcut::Dismiss => return Err("dismiss is built in".into()),
    }
    Ok(())
}

// --- API ---

#[wasm_bindgen(js_name = apiCall)]
pub fn api_call(endpoint: String, method: Option<String>, data: JsValue) -> js_sys::Promise {
    future_to_promise(async move {
        let method = match method {
            Some(m) => m.parse::<Method>()?,
            None => Method::Get,
        };
        let data: Option<Value> = if data.is_undefined() || data.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(data)?)
        };
        let api = console()?.api().clone();
        let value = api.api_call(&endpoint, method, data.as_ref()).await?;
        to_js(&value)
    })
}

#[wasm_bindgen(js_name = getStatus)]
pub fn get_status() -> js_sys::Promise {
    future_to_promise(async move {
        let api = console()?.api().clone();
        to_js(&api.get_status().await?)
    })
}

#[wasm_bindgen(js_name = getConfig)]
pub fn get_config() -> js_sys::Promise {
    future_to_promise(async move {
        let api = console()?.api().clone();
        to_js(&api.get_config().await?)
    })
}

#[wasm_bindgen(js_name = saveConfig)]
pub fn save_config(config: JsValue) -> js_sys::Promise {
    future_to_promise(async move {
        let update = serde_wasm_bindgen::from_value(config)?;
        let api = console()?.api().clone();
        to_js(&api.save_config(&update).await?)
    })
}

// --- Formatting ---

#[wasm_bindgen(js_name = formatBytes)]
pub fn format_bytes_js(bytes: f64) -> String {
    format_bytes(bytes.max(0.0) as u64)
}

#[wasm_bindgen(js_name = formatUptime)]
pub fn format_uptime_js(seconds: f64) -> String {
    format_uptime(seconds.max(0.0) as u64)
}

#[wasm_bindgen(js_name = formatTimestamp)]
pub fn format_timestamp_js(ms: f64) -> String {
    format_timestamp_f64(ms)
}

// --- Timing ---

fn call_js(f: &js_sys::Function, arg: &JsValue) {
    if let Err(e) = f.call1(&JsValue::NULL, arg) {
        tracing::warn!(error = ?e, "timed callback threw");
    }
}

fn browser_scheduler() -> Rc<dyn Scheduler> {
    Rc::new(BrowserScheduler)
}

/// Handle returned by `debounce`; `call` restarts the wait.
#[wasm_bindgen]
pub struct Debounced {
    inner: Debounce<JsValue>,
}

#[wasm_bindgen]
impl Debounced {
    pub fn call(&self, arg: JsValue) {
        self.inner.call(arg);
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }
}

#[wasm_bindgen]
pub fn debounce(f: js_sys::Function, wait: u32) -> Debounced {
    Debounced {
        inner: Debounce::new(browser_scheduler(), wait, move |arg: JsValue| call_js(&f, &arg)),
    }
}

/// Handle returned by `throttle`; `call` reports whether `f` ran.
#[wasm_bindgen]
pub struct Throttled {
    inner: Throttle<JsValue>,
}

#[wasm_bindgen]
impl Throttled {
    pub fn call(&self, arg: JsValue) -> bool {
        self.inner.call(arg)
    }
}

#[wasm_bindgen]
pub fn throttle(f: js_sys::Function, limit: u32) -> Throttled {
    Throttled {
        inner: Throttle::new(browser_scheduler(), limit, move |arg: JsValue| call_js(&f, &arg)),
    }
}

// --- Validation ---

#[wasm_bindgen(js_name = validateDeviceID)]
pub fn validate_device_id_js(id: JsValue) -> bool {
    id.as_string().is_some_and(|s| validate_device_id(&s))
}

#[wasm_bindgen(js_name = validateBrightness)]
pub fn validate_brightness_js(value: JsValue) -> bool {
    field_value(&value).is_some_and(|v| validate_brightness(v))
}

#[wasm_bindgen(js_name = validateOrientation)]
pub fn validate_orientation_js(value: JsValue) -> bool {
    field_value(&value).is_some_and(|v| validate_orientation(v))
}

// --- Storage ---

#[wasm_bindgen(js_name = saveToLocalStorage)]
pub fn save_to_local_storage(key: &str, value: JsValue) -> Result<bool, JsValue> {
    let console = console()?;
    let Ok(value) = serde_wasm_bindgen::from_value::<Value>(value) else {
        return Ok(false);
    };
    Ok(console.store().save_to_local_storage(key, &value))
}

#[wasm_bindgen(js_name = loadFromLocalStorage)]
pub fn load_from_local_storage(key: &str, default: JsValue) -> Result<JsValue, JsValue> {
    let console = console()?;
    match console.store().load_value(key) {
        Some(value) => to_js(&value),
        None => Ok(default),
    }
}

#[wasm_bindgen(js_name = loadUserPreferences)]
pub fn load_user_preferences() -> Result<JsValue, JsValue> {
    let console = console()?;
    to_js(&console.store().load_user_preferences())
}

#[wasm_bindgen(js_name = saveUserPreferences)]
pub fn save_user_preferences(prefs: JsValue) -> Result<bool, JsValue> {
    let console = console()?;
    let stored: Value = serde_wasm_bindgen::from_value(prefs)?;
    let prefs = UserPreferences::from_stored(&stored);
    Ok(console.save_preferences(prefs))
}

// --- Monitoring ---

#[wasm_bindgen(js_name = startConnectionMonitoring)]
pub fn start_connection_monitoring() -> Result<(), JsValue> {
    console()?.monitor().start_connection_monitoring();
    Ok(())
}

#[wasm_bindgen(js_name = stopConnectionMonitoring)]
pub fn stop_connection_monitoring() -> Result<(), JsValue> {
    console()?.monitor().stop_connection_monitoring();
    Ok(())
}

#[wasm_bindgen(js_name = checkConnectionStatus)]
pub fn check_connection_status() -> js_sys::Promise {
    future_to_promise(async move {
        let monitor = console()?.monitor().clone();
        Ok(JsValue::from_bool(monitor.check_connection_status().await))
    })
}
