//! Error types for the Eventaic API client.
//!
//! Every failure surfaced to a caller is normalized into [`ApiError`] with a
//! human-readable message: the server's `detail` field when present, the
//! transport error otherwise, a generic fallback as a last resort.

use reqwest::StatusCode;
use thiserror::Error;

/// Fallback message when neither the server nor the transport supplied one.
const GENERIC_FAILURE: &str = "request failed";

/// Errors that can occur when calling the Eventaic API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session could not be recovered: the refresh token was missing or
    /// rejected. The session has already been cleared and an
    /// [`crate::SessionEvent::Expired`] event emitted when this is returned.
    #[error("session expired: {0}")]
    AuthExpired(String),

    /// No response was received (connection failure, timeout, cancelled).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Normalized server-supplied message.
        message: String,
    },

    /// The server rejected the request with structured field-level errors,
    /// joined as `field: message; ...`.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A success response carried a body the client could not parse.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code of the failure, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure ended the session.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// Map a reqwest transport failure. Timeouts, connection failures, and
    /// anything else without a response all surface as [`Self::Network`].
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Error body as the backend produces it.
///
/// `detail` is either a plain string or, for validation failures, an array of
/// field errors; some error paths use `error` instead.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// One entry of a structured validation `detail` array.
#[derive(Debug, serde::Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl FieldError {
    /// `field: message`, using the last location segment as the field name.
    fn render(&self) -> String {
        let field = self
            .loc
            .last()
            .and_then(|segment| segment.as_str().map(String::from))
            .unwrap_or_else(|| "request".to_string());
        format!("{field}: {}", self.msg)
    }
}

/// Normalize a non-success response body into an [`ApiError`].
///
/// Preference order for the message: `detail` string, structured `detail`
/// array (becomes [`ApiError::Validation`]), `error` string, raw body,
/// generic fallback.
pub(crate) fn normalize(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
                return ApiError::RequestFailed {
                    status: status.as_u16(),
                    message: detail,
                };
            }
            Some(serde_json::Value::Array(entries)) => {
                if let Some(message) = join_field_errors(&entries) {
                    return ApiError::Validation(message);
                }
            }
            _ => {}
        }

        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return ApiError::RequestFailed {
                status: status.as_u16(),
                message: error,
            };
        }
    }

    let trimmed = body.trim();
    ApiError::RequestFailed {
        status: status.as_u16(),
        message: if trimmed.is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            trimmed.to_string()
        },
    }
}

/// Join a structured `detail` array into a single `field: message` string.
///
/// Returns `None` when no entry matches the field-error shape.
fn join_field_errors(entries: &[serde_json::Value]) -> Option<String> {
    let rendered: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            serde_json::from_value::<FieldError>(entry.clone())
                .map(|field_error| field_error.render())
                .ok()
        })
        .collect();

    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join("; "))
    }
}
