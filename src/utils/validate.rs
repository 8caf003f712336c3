use crate::config::MAX_BRIGHTNESS;
use once_cell::sync::Lazy;
use regex::Regex;

static DEVICE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

/// A raw form value as it arrives from an input field or a JSON payload.
#[derive(Clone, PartialEq, Debug)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer coercion: floats truncate, text yields its leading integer
    /// prefix ("42px" -> 42). Anything else is `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            FieldValue::Float(_) => None,
            FieldValue::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate; they are out of any valid range anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

pub fn validate_device_id(id: &str) -> bool {
    DEVICE_ID.is_match(id)
}

pub fn validate_brightness(value: impl Into<FieldValue>) -> bool {
    value
        .into()
        .as_integer()
        .is_some_and(|n| (0..=MAX_BRIGHTNESS).contains(&n))
}

/// Only the literal values 0 and 1, as numbers or strings.
pub fn validate_orientation(value: impl Into<FieldValue>) -> bool {
    match value.into() {
        FieldValue::Int(n) => n == 0 || n == 1,
        FieldValue::Float(f) => f == 0.0 || f == 1.0,
        FieldValue::Text(s) => s == "0" || s == "1",
    }
}
