//! Error types for the fetch client.
//!
//! # Design
//! Statuses with a localized message get `Status`, whose `Display` is exactly
//! that message so it can be shown to users as-is. Every other non-2xx
//! response lands in `UnexpectedStatus` with the raw status and body.
//! Transport failures are split into `Timeout` and everything else.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `FetchClient` parse methods and `Fetcher` operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server returned one of the statuses in the message table.
    #[error("{message}")]
    Status { status: u16, message: &'static str },

    /// The server returned a non-2xx status without a mapped message.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request deadline elapsed and the in-flight request was cancelled.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be assembled, e.g. a header value with a
    /// line break.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A download finished with an empty body; nothing was saved.
    #[error("download body is empty")]
    EmptyBody,

    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } | FetchError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_only_the_message() {
        let err = FetchError::Status {
            status: 404,
            message: "资源不存在",
        };
        assert_eq!(err.to_string(), "资源不存在");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn timeout_has_no_status() {
        let err = FetchError::Timeout(Duration::from_secs(10));
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }
}
