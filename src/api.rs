use crate::config::{
    ConsoleOptions, BACKUP_CREATE_ENDPOINT, BACKUP_LIST_ENDPOINT, BRIGHTNESS_ENDPOINT,
    BUTTON_COUNT, BUTTON_ENDPOINT, CONFIG_ENDPOINT, DEVICE_ID_ENDPOINT, FACTORY_RESET_ENDPOINT,
    ORIENTATION_ENDPOINT, REBOOT_ENDPOINT, STATUS_ENDPOINT,
};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::platform::{HttpRequest, Method, Transport};
use crate::types::{Ack, BackupList, ConfigUpdate, DeviceConfig, DeviceStatus, Orientation};
use crate::utils::validate::{validate_brightness, validate_device_id};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::rc::Rc;
use tracing::{debug, error};
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encodes a JSON object the way `URLSearchParams` would: strings verbatim,
/// everything else through its JSON text.
pub fn encode_form(data: &Value) -> Result<String, ApiError> {
    let obj = data
        .as_object()
        .ok_or_else(|| ApiError::Invalid("form data must be an object".into()))?;

    let mut form = form_urlencoded::Serializer::new(String::new());
    for (key, value) in obj {
        match value {
            Value::String(s) => form.append_pair(key, s),
            other => form.append_pair(key, &other.to_string()),
        };
    }
    Ok(form.finish())
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn Transport>,
    notifier: Notifier,
    options: Rc<ConsoleOptions>,
}

impl ApiClient {
    pub fn new(transport: Rc<dyn Transport>, notifier: Notifier, options: Rc<ConsoleOptions>) -> Self {
        Self {
            transport,
            notifier,
            options,
        }
    }

    fn build(&self, endpoint: &str, method: Method, data: Option<&Value>) -> Result<HttpRequest, ApiError> {
        let mut request = HttpRequest::new(method, self.options.endpoint(endpoint));
        // Payloads only travel with POST; other methods drop them.
        if let (Method::Post, Some(data)) = (method, data) {
            request.body = Some(encode_form(data)?);
            request
                .headers
                .push(("Content-Type".into(), FORM_CONTENT_TYPE.into()));
        }
        Ok(request)
    }

    async fn request(&self, request: HttpRequest) -> Result<Value, ApiError> {
        debug!(method = %request.method, url = %request.url, "api request");
        let response = self.transport.send(request).await?;
        if !response.ok() {
            return Err(ApiError::Status {
                status: response.status,
                status_text: response.status_text,
            });
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    fn report<T>(&self, endpoint: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result {
            error!(endpoint, error = %e, "API error");
            self.notifier.error(
                &format!("API error: {}", e),
                self.options.message_duration_ms,
            );
        }
        result
    }

    pub async fn api_call(
        &self,
        endpoint: &str,
        method: Method,
        data: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build(endpoint, method, data)?;
        let result = self.request(request).await;
        self.report(endpoint, result)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        data: Option<&Value>,
    ) -> Result<T, ApiError> {
        let request = self.build(endpoint, method, data)?;
        let result = match self.request(request).await {
            Ok(value) => serde_json::from_value(value).map_err(ApiError::from),
            Err(e) => Err(e),
        };
        self.report(endpoint, result)
    }

    pub async fn get_status(&self) -> Result<DeviceStatus, ApiError> {
        self.call_typed(STATUS_ENDPOINT, Method::Get, None).await
    }

    pub async fn get_config(&self) -> Result<DeviceConfig, ApiError> {
        self.call_typed(CONFIG_ENDPOINT, Method::Get, None).await
    }

    pub async fn save_config(&self, config: &ConfigUpdate) -> Result<Ack, ApiError> {
        if let Some(id) = &config.device_id {
            if !validate_device_id(id) {
                return Err(ApiError::Invalid(format!("device id {id:?} must be 4 digits")));
            }
        }
        if let Some(level) = config.brightness {
            if !validate_brightness(level) {
                return Err(ApiError::Invalid(format!("brightness {level} out of range")));
            }
        }
        let data = serde_json::to_value(config)?;
        self.call_typed(CONFIG_ENDPOINT, Method::Post, Some(&data)).await
    }

    pub async fn set_brightness(&self, value: i64) -> Result<Ack, ApiError> {
        if !validate_brightness(value) {
            return Err(ApiError::Invalid(format!("brightness {value} out of range")));
        }
        self.call_typed(BRIGHTNESS_ENDPOINT, Method::Post, Some(&json!({ "value": value })))
            .await
    }

    pub async fn set_orientation(&self, orientation: Orientation) -> Result<Ack, ApiError> {
        let value = u8::from(orientation);
        self.call_typed(ORIENTATION_ENDPOINT, Method::Post, Some(&json!({ "value": value })))
            .await
    }

    pub async fn set_device_id(&self, id: &str) -> Result<Ack, ApiError> {
        if !validate_device_id(id) {
            return Err(ApiError::Invalid(format!("device id {id:?} must be 4 digits")));
        }
        self.call_typed(DEVICE_ID_ENDPOINT, Method::Post, Some(&json!({ "value": id })))
            .await
    }

    pub async fn set_button(&self, button: u8, on: bool) -> Result<Ack, ApiError> {
        if !(1..=BUTTON_COUNT).contains(&button) {
            return Err(ApiError::Invalid(format!(
                "button {button} out of range 1-{BUTTON_COUNT}"
            )));
        }
        let data = json!({ "button": button, "state": u8::from(on) });
        self.call_typed(BUTTON_ENDPOINT, Method::Post, Some(&data))
            .await
    }

    pub async fn create_backup(&self) -> Result<Ack, ApiError> {
        self.call_typed(BACKUP_CREATE_ENDPOINT, Method::Post, None).await
    }

    pub async fn list_backups(&self) -> Result<BackupList, ApiError> {
        self.call_typed(BACKUP_LIST_ENDPOINT, Method::Get, None).await
    }

    pub async fn reboot(&self) -> Result<Ack, ApiError> {
        self.call_typed(REBOOT_ENDPOINT, Method::Post, None).await
    }

    pub async fn factory_reset(&self) -> Result<Ack, ApiError> {
        self.call_typed(FACTORY_RESET_ENDPOINT, Method::Post, None).await
    }
}
