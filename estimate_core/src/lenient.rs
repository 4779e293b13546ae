//! Lenient serde helpers for the input-parsing boundary.
//!
//! Estimate inputs come from form state and from a storage layer that may
//! re-encode nested objects as JSON text. These helpers substitute zero or a
//! default instead of failing the whole decode.

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value into a finite number, 0 when it is not one.
///
/// Numeric strings (`"1904.00"`) are accepted.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Sanitize an in-memory number: non-finite becomes 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sanitize a measure: non-finite or negative becomes 0.
pub fn measure_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Deserialize any JSON value as a finite number, defaulting to 0.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_number).unwrap_or(0.0))
}

/// Optional number: absent, `null` or unparsable reads as `None`.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite()))
}

/// Deserialize a length or area: like [`number_or_zero`] but negatives clamp to 0.
pub fn measure<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    number_or_zero(deserializer).map(measure_or_zero)
}

/// Deserialize a count: non-negative whole number, 0 when missing.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = number_or_zero(deserializer)?;
    if n <= 0.0 {
        return Ok(0);
    }
    Ok(n.floor().min(u32::MAX as f64) as u32)
}

/// Deserialize a field that may be a native JSON object or its JSON-string encoding.
///
/// `null`, a missing field, or an empty string yield `T::default()`.
pub fn json_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Ok(T::default());
            }
            serde_json::from_str(&text).map_err(D::Error::custom)
        }
        Some(other) => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

/// Deserialize an id -> number map, native or JSON-string encoded, with
/// every value coerced like [`coerce_number`].
pub fn number_map<'de, D>(deserializer: D) -> Result<IndexMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: IndexMap<String, Value> = json_or_string(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, coerce_number(&value)))
        .collect())
}
