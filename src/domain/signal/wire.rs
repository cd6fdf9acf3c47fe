//! Wire handling for signal endpoint responses.

use serde::Deserialize;
use serde_json::Value;

use super::Signal;
use crate::error::SdkError;

/// Decode a signal endpoint response.
///
/// Every signal endpoint must answer with a JSON array. Anything else (error
/// objects, rate-limit notes) is a [`SdkError::ShapeMismatch`] so the caller
/// can surface it instead of rendering garbage.
pub fn signals_from_value(endpoint: &str, value: &Value) -> Result<Vec<Signal>, SdkError> {
    if !value.is_array() {
        return Err(SdkError::ShapeMismatch {
            endpoint: endpoint.to_string(),
            expected: "array of signals",
        });
    }
    Ok(Vec::<Signal>::deserialize(value)?)
}
