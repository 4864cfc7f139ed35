//! JSON encoding and decoding for the task board REST contract.
//!
//! Request and response bodies are plain JSON. Error bodies are
//! loosely shaped: the server may put its human-readable text under
//! `message` or under `error`, or send nothing useful at all.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The body was empty where a payload was required.
    #[error("empty body")]
    EmptyBody,
}

/// Encodes a request body as a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a response body from JSON text.
///
/// # Errors
///
/// Returns `CodecError::EmptyBody` for a blank body, or
/// `CodecError::Serialization` if the JSON does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CodecError> {
    if body.trim().is_empty() {
        return Err(CodecError::EmptyBody);
    }
    serde_json::from_str(body).map_err(|e| CodecError::Serialization(e.to_string()))
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extracts the human-readable message from a non-2xx response body.
///
/// Looks at `message` first, then `error`. Returns `None` when the body is
/// not JSON, has neither field, or the field is blank.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .into_iter()
        .chain(parsed.error)
        .map(|m| m.trim().to_string())
        .find(|m| !m.is_empty())
}
