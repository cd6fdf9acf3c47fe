//! Custom serde helpers for backend wire formats.

/// Deserializes a JSON number *or* numeric string into `f64`.
///
/// The stocks API sends prices as strings (`"1. open": "187.1500"`), the crypto
/// API as numbers, and user CSV rows may contain anything. Values that are not
/// numeric become `NaN` instead of failing the whole payload.
pub mod lenient_f64 {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value_to_f64(&value))
    }

    /// Same conversion for an already-parsed JSON value.
    pub fn value_to_f64(value: &Value) -> f64 {
        match value {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => crate::shared::parse_lenient_f64(s),
            _ => f64::NAN,
        }
    }
}

/// Deserializes any scalar into a `String` (numbers are stringified, null is empty).
///
/// Used for CSV row fields, which are strings after parsing but may arrive as
/// numbers when rows are round-tripped through JSON.
pub mod lenient_string {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}
