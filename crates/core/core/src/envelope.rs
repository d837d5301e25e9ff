//! API response envelope.
//!
//! Success bodies on the wire are either enveloped as
//! `{"success": true, "data": ...}` or returned bare. The envelope is decoded
//! structurally into an explicit tagged union; callers never probe for key
//! presence on loose JSON.

use serde::Deserialize;
use serde_json::Value;

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// `success: true`; `data` may be absent for empty responses.
    Success { data: Option<T> },
    /// `success: false` with an error body.
    Failure { error: ApiErrorBody },
}

/// Error body carried by failure envelopes and bare error responses.
///
/// Error responses come in two wire shapes: a flat `{"message": ...}` and a
/// nested `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    /// Machine-readable error code, when the server supplies one.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Structural wire shape of an envelope. `success` is required; an object
/// without it is not an envelope and deserialization fails, which is how
/// unenveloped bodies are detected.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RawEnvelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl<T: for<'de> Deserialize<'de>> Envelope<T> {
    /// Decodes an envelope from raw body bytes.
    ///
    /// Returns `Err` when the body is not an envelope at all; callers then
    /// fall back to treating the body as a bare `T`.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawEnvelope<T> = serde_json::from_slice(body)?;
        Ok(if raw.success {
            Envelope::Success { data: raw.data }
        } else {
            Envelope::Failure {
                error: raw.error.unwrap_or_else(|| ApiErrorBody {
                    code: None,
                    message: "Unknown error".to_string(),
                }),
            }
        })
    }
}

/// Extracts an error message from an arbitrary error response body,
/// accepting both wire shapes. Returns `None` when neither matches.
pub fn error_message(body: &[u8]) -> Option<ApiErrorBody> {
    let value: Value = serde_json::from_slice(body).ok()?;

    if let Some(nested) = value.get("error") {
        if let Ok(body) = serde_json::from_value::<ApiErrorBody>(nested.clone()) {
            if !body.message.is_empty() {
                return Some(body);
            }
        }
    }

    let flat: ApiErrorBody = serde_json::from_value(value).ok()?;
    if flat.message.is_empty() {
        None
    } else {
        Some(flat)
    }
}
