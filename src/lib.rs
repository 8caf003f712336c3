//! Client-side console for the touch panel's web configuration pages.

pub mod api;
#[cfg(target_arch = "wasm32")]
mod bindings;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod platform;
pub mod session;
pub mod shortcuts;
pub mod storage;
#[cfg(test)]
mod testing;
pub mod types;
pub mod utils;

pub use api::ApiClient;
pub use config::ConsoleOptions;
pub use error::{ApiError, StorageError, TransportError};
pub use monitor::ConnectionMonitor;
pub use notify::Notifier;
pub use platform::Platform;
pub use session::Console;
pub use shortcuts::Shortcut;
pub use storage::LocalStore;
pub use types::{ConnectionState, Severity, UserPreferences};
