use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },
    #[error("invalid JSON response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e.0)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// The network request never produced a response.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded: {0}")]
    Quota(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialize(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
mod js {
    use super::{ApiError, StorageError, TransportError};
    use wasm_bindgen::JsValue;

    fn describe(v: &JsValue) -> String {
        js_sys::Reflect::get(v, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| v.as_string())
            .unwrap_or_else(|| format!("{:?}", v))
    }

    impl From<JsValue> for TransportError {
        fn from(v: JsValue) -> Self {
            TransportError(describe(&v))
        }
    }

    impl From<JsValue> for StorageError {
        fn from(v: JsValue) -> Self {
            let name = js_sys::Reflect::get(&v, &"name".into())
                .ok()
                .and_then(|n| n.as_string())
                .unwrap_or_default();
            if name == "QuotaExceededError" {
                StorageError::Quota(describe(&v))
            } else {
                StorageError::Unavailable(describe(&v))
            }
        }
    }

    impl From<ApiError> for JsValue {
        fn from(e: ApiError) -> Self {
            js_sys::Error::new(&e.to_string()).into()
        }
    }
}
