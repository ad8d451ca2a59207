//! Error types for the management API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the status
//! code and the server's error message.
//!
//! `MalformedFieldError` is raised by the tolerant `lifetime_in_seconds`
//! codec. Inside a full response decode it surfaces through
//! `ApiError::Deserialization`; the standalone `jwt::decode` keeps it typed
//! via `DecodeError`.

use serde::Deserialize;

/// Errors returned by `ClientManager` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404: the requested client or credential does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The base URL is unparsable or cannot carry path segments.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// A field's raw JSON value had a type or content that cannot be converted.
///
/// Non-retryable: the document that carried it is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected type for field {field}")]
pub struct MalformedFieldError {
    pub field: &'static str,
}

/// Failure of a standalone record decode.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    MalformedField(#[from] MalformedFieldError),

    /// Any other field failed structural decoding.
    #[error(transparent)]
    Structural(#[from] serde_json::Error),
}

/// Error body the management API sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build an `HttpError` from a status and raw body, preferring the
    /// server's `message` (then `error`) over the raw text.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        if status == 404 {
            return ApiError::NotFound;
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| body.to_string());
        ApiError::HttpError { status, message }
    }
}
