use serde::{Deserialize, Serialize};

/// --- Device Endpoints ---
pub const STATUS_ENDPOINT: &str = "/api/status";
pub const CONFIG_ENDPOINT: &str = "/api/config";
pub const BRIGHTNESS_ENDPOINT: &str = "/api/brightness";
pub const ORIENTATION_ENDPOINT: &str = "/api/orientation";
pub const DEVICE_ID_ENDPOINT: &str = "/api/device-id";
pub const BUTTON_ENDPOINT: &str = "/api/button";
pub const BACKUP_CREATE_ENDPOINT: &str = "/api/backup/create";
pub const BACKUP_LIST_ENDPOINT: &str = "/api/backup/list";
pub const REBOOT_ENDPOINT: &str = "/api/system/reboot";
pub const FACTORY_RESET_ENDPOINT: &str = "/api/system/reset";

/// --- Storage ---
pub const STORAGE_PREFIX: &str = "esp32_";
pub const PREFERENCES_KEY: &str = "preferences";

/// --- DOM Contract ---
pub const MESSAGE_CONTAINER_ID: &str = "messageContainer";
pub const CONNECTION_STATUS_CLASS: &str = "connection-status";
pub const FADE_OUT_CLASS: &str = "fade-out";

/// --- UI Timing & Intervals ---
pub const MESSAGE_DURATION_MS: u32 = 5000;
pub const FADE_DURATION_MS: u32 = 300;
pub const POLL_INTERVAL_MS: u32 = 10_000;
pub const WELCOME_DELAY_MS: u32 = 1000;
pub const WELCOME_DURATION_MS: u32 = 3000;

/// --- Device Limits ---
pub const MAX_BRIGHTNESS: i64 = 100;
pub const BUTTON_COUNT: u8 = 6;

/// Tunables a host page may override when booting the console.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleOptions {
    /// Prefix joined onto every endpoint path; empty means same origin.
    pub base_url: String,
    pub poll_interval_ms: u32,
    pub message_duration_ms: u32,
    pub fade_ms: u32,
    pub welcome_delay_ms: u32,
    pub welcome_duration_ms: u32,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            poll_interval_ms: POLL_INTERVAL_MS,
            message_duration_ms: MESSAGE_DURATION_MS,
            fade_ms: FADE_DURATION_MS,
            welcome_delay_ms: WELCOME_DELAY_MS,
            welcome_duration_ms: WELCOME_DURATION_MS,
        }
    }
}

impl ConsoleOptions {
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}{}", base, path)
    }
}
