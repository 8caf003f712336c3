use crate::config::{PREFERENCES_KEY, STORAGE_PREFIX};
use crate::error::StorageError;
use crate::platform::KeyValueStore;
use crate::types::UserPreferences;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use tracing::warn;

/// JSON values under the `esp32_` namespace. Storage failures never reach
/// the caller: saves report `false`, loads fall back to the default.
#[derive(Clone)]
pub struct LocalStore {
    backend: Rc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", STORAGE_PREFIX, key)
    }

    fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set_item(&Self::namespaced(key), &json)
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get_item(&Self::namespaced(key))? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn save_to_local_storage<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "local storage save failed");
                false
            }
        }
    }

    pub fn load_from_local_storage<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "local storage load failed");
                default
            }
        }
    }

    /// The stored JSON as-is, `null` included. `None` when nothing usable is stored.
    pub fn load_value(&self, key: &str) -> Option<Value> {
        match self.try_load::<Value>(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "local storage load failed");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        self.backend.remove_item(&Self::namespaced(key)).is_ok()
    }

    pub fn load_user_preferences(&self) -> UserPreferences {
        match self.try_load::<Value>(PREFERENCES_KEY) {
            Ok(Some(stored)) => {
                let prefs = UserPreferences::from_stored(&stored);
                if serde_json::to_value(&prefs).ok().as_ref() != Some(&stored) {
                    warn!("stored preferences were incomplete or malformed, defaults applied");
                }
                prefs
            }
            Ok(None) => UserPreferences::default(),
            Err(e) => {
                warn!(error = %e, "stored preferences unreadable, using defaults");
                UserPreferences::default()
            }
        }
    }

    pub fn save_user_preferences(&self, prefs: &UserPreferences) -> bool {
        self.save_to_local_storage(PREFERENCES_KEY, prefs)
    }
}
