pub mod format;
pub mod timing;
pub mod validate;

pub use format::{format_bytes, format_timestamp, format_timestamp_f64, format_uptime};
pub use timing::{Debounce, Throttle};
pub use validate::{validate_brightness, validate_device_id, validate_orientation, FieldValue};
