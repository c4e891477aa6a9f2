//! Callback payload types.
//!
//! A callback payload is the opaque string a button carries back when it is
//! pressed: a routing prefix followed by an optional argument. Arguments that
//! start with [`STRUCTURED_MARKER`] are JSON objects; anything else is passed
//! through as a raw string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First character of a structured (JSON object) argument.
pub const STRUCTURED_MARKER: char = '{';

/// Maximum callback payload length accepted by chat transports, in bytes.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Decoded argument handed to a callback handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallbackData {
    /// The payload was exactly the prefix.
    Empty,
    /// The remainder, verbatim. Also used when a structured remainder fails
    /// to decode.
    Raw(String),
    /// The remainder decoded as a JSON object.
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl CallbackData {
    /// Decode the part of a payload that follows the matched prefix.
    pub fn decode(remainder: &str) -> Self {
        if remainder.is_empty() {
            return CallbackData::Empty;
        }
        if remainder.starts_with(STRUCTURED_MARKER) {
            if let Ok(serde_json::Value::Object(map)) =
                serde_json::from_str::<serde_json::Value>(remainder)
            {
                return CallbackData::Structured(map);
            }
        }
        CallbackData::Raw(remainder.to_string())
    }

    /// The raw remainder, if this is a raw argument.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            CallbackData::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// A field of a structured argument.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        match self {
            CallbackData::Structured(map) => map.get(key),
            _ => None,
        }
    }
}

/// Errors building a callback payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("callback payload is {len} bytes, limit is {MAX_CALLBACK_DATA_LEN}")]
    TooLong { len: usize },

    #[error("failed to encode structured payload: {0}")]
    Encode(String),
}

/// Build a payload from a prefix and a raw argument.
pub fn encode_raw(prefix: &str, arg: &str) -> Result<String, PayloadError> {
    check_len(format!("{prefix}{arg}"))
}

/// Build a payload from a prefix and a structured argument.
pub fn encode_structured<T: Serialize>(prefix: &str, arg: &T) -> Result<String, PayloadError> {
    let body = serde_json::to_string(arg).map_err(|e| PayloadError::Encode(e.to_string()))?;
    if !body.starts_with(STRUCTURED_MARKER) {
        return Err(PayloadError::Encode(
            "structured payload must serialize to a JSON object".to_string(),
        ));
    }
    check_len(format!("{prefix}{body}"))
}

fn check_len(payload: String) -> Result<String, PayloadError> {
    if payload.len() > MAX_CALLBACK_DATA_LEN {
        return Err(PayloadError::TooLong { len: payload.len() });
    }
    Ok(payload)
}
