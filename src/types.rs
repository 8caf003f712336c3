use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Unknown names fall back to `Info`, matching how the pages style them.
    pub fn parse(name: &str) -> Self {
        match name {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// Zero keeps the notification until it is clicked or cleared.
    pub auto_dismiss_ms: u32,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, auto_dismiss_ms: u32) -> Self {
        Self {
            message: message.into(),
            severity,
            auto_dismiss_ms,
        }
    }

    pub fn class_name(&self) -> String {
        format!("message {}", self.severity)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "autoRefresh")]
    pub auto_refresh: bool,
    #[serde(rename = "refreshInterval")]
    pub refresh_interval_ms: u32,
    #[serde(rename = "showNotifications")]
    pub show_notifications: bool,
    pub theme: Theme,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval_ms: 5000,
            show_notifications: true,
            theme: Theme::Auto,
        }
    }
}

impl UserPreferences {
    /// Rebuilds preferences from whatever was stored, field by field.
    /// A missing or mistyped field takes its default instead of discarding the rest.
    pub fn from_stored(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };

        Self {
            auto_refresh: obj
                .get("autoRefresh")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.auto_refresh),
            refresh_interval_ms: obj
                .get("refreshInterval")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.refresh_interval_ms),
            show_notifications: obj
                .get("showNotifications")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.show_notifications),
            theme: obj
                .get("theme")
                .and_then(|v| Theme::deserialize(v).ok())
                .unwrap_or(defaults.theme),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ConnectionState {
    #[default]
    Online,
    Offline,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Online => "Online",
            ConnectionState::Offline => "Offline",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ConnectionState::Online => "connection-status status-ok",
            ConnectionState::Offline => "connection-status status-error",
        }
    }
}

impl From<bool> for ConnectionState {
    fn from(online: bool) -> Self {
        if online {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Orientation::Portrait),
            1 => Ok(Orientation::Landscape),
            other => Err(format!("invalid orientation {other}, expected 0 or 1")),
        }
    }
}

impl From<Orientation> for u8 {
    fn from(value: Orientation) -> Self {
        match value {
            Orientation::Portrait => 0,
            Orientation::Landscape => 1,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "Portrait"),
            Orientation::Landscape => write!(f, "Landscape"),
        }
    }
}

// --- Device payloads ---

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub uptime: u64,
    pub free_heap: u64,
    pub chip_model: String,
    pub chip_revision: u32,
    pub flash_size: u64,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub id: String,
    pub brightness: u8,
    pub orientation: Orientation,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiInfo {
    pub mode: String,
    pub ssid: String,
    pub ip: String,
    pub clients: u32,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunicationStats {
    pub total_sent: u64,
    pub total_collisions: u64,
    pub total_retries: u64,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceStatus {
    pub system: SystemInfo,
    pub device: DeviceInfo,
    pub wifi: WifiInfo,
    pub communication: CommunicationStats,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub orientation: Orientation,
    pub brightness: u8,
    #[serde(rename = "debugMode", default)]
    pub debug_mode: bool,
}

/// Form body accepted by `POST /api/config`; absent fields are left untouched.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(rename = "deviceID", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BackupEntry {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupList {
    pub backups: Vec<BackupEntry>,
}
