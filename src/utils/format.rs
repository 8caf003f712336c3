use chrono::{DateTime, Local, TimeZone};

const BYTE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals, trailing zeros dropped: 1.50 -> "1.5", 1.00 -> "1".
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, BYTE_UNITS[unit])
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

const INVALID_DATE: &str = "Invalid Date";

/// Largest distance from the epoch a JS `Date` can hold.
const MAX_DATE_MS: f64 = 8.64e15;

/// A JS millisecond number as whole epoch milliseconds. NaN, infinities and
/// values outside the `Date` range have no timestamp.
pub fn millis_from_f64(ms: f64) -> Option<i64> {
    (ms.is_finite() && ms.abs() <= MAX_DATE_MS).then(|| ms.trunc() as i64)
}

/// Like [`format_timestamp`], for a raw JS number.
pub fn format_timestamp_f64(ms: f64) -> String {
    match millis_from_f64(ms) {
        Some(ms) => format_timestamp(ms),
        None => INVALID_DATE.to_string(),
    }
}

/// Epoch milliseconds as `DD.MM.YYYY, HH:MM:SS` in the browser's local time.
pub fn format_timestamp(ms: i64) -> String {
    format_timestamp_in(ms, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(ms) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%d.%m.%Y, %H:%M:%S")
            .to_string(),
        None => INVALID_DATE.to_string(),
    }
}
