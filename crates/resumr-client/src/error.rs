use std::time::Duration;

use resumr_core::{Namespace, SessionError};
use thiserror::Error;

/// Errors returned by [`crate::ApiClient`] and the domain services.
///
/// `Display` output is the user-facing message. Retry classification in
/// [`RequestError::is_retryable`] matches substrings of that message, so the
/// wording of [`RequestError::Timeout`] and [`RequestError::Network`] is part
/// of the contract.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request path must not be empty")]
    EmptyPath,

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Request timeout after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success status on a JSON endpoint. `payload` is the parsed error
    /// body, or an empty object when the body was not JSON.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        payload: serde_json::Value,
    },

    #[error("Download failed with status {status}")]
    Download { status: u16 },

    #[error("failed to decode response for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no refresh token stored for the {0} session")]
    NoRefreshToken(Namespace),

    #[error("session storage error: {0}")]
    Session(#[from] SessionError),
}

/// Structured view of a [`RequestError`] for callers that do not want to
/// match on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Network,
    Status,
    Download,
    InvalidRequest,
    Decode,
    Session,
}

impl RequestError {
    /// Maps a transport failure, folding reqwest's own deadline into
    /// [`RequestError::Timeout`] so both timeout paths look the same.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { after: timeout }
        } else if err.is_builder() {
            Self::InvalidRequest {
                reason: err.to_string(),
            }
        } else {
            Self::Network(err)
        }
    }

    /// Builds a [`RequestError::Status`] from a non-success response body.
    ///
    /// The server's `message` field wins; otherwise the fixed per-status
    /// default from [`default_status_message`] is used.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let payload: serde_json::Value =
            serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({}));
        let message = payload
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map_or_else(|| default_status_message(status).to_owned(), str::to_owned);
        Self::Status {
            status,
            message,
            payload,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network(_) => ErrorKind::Network,
            Self::Status { .. } => ErrorKind::Status,
            Self::Download { .. } => ErrorKind::Download,
            Self::EmptyPath | Self::InvalidRequest { .. } | Self::NoRefreshToken(_) => {
                ErrorKind::InvalidRequest
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Session(_) => ErrorKind::Session,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Download { status } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` if the attempt that produced this error may be retried.
    ///
    /// Retryable means a cancelled (timed-out) attempt, or any error whose
    /// message contains `"Network"` or `"timeout"` (case-sensitive). Status codes are not consulted directly, so a 5xx
    /// whose default message is the generic network message is retried while
    /// a 500 is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        if matches!(self, Self::Timeout { .. }) {
            return true;
        }
        let message = self.to_string();
        message.contains("Network") || message.contains("timeout")
    }
}

/// Fixed fallback message for a status code when the server sends none.
#[must_use]
pub fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request. Please check your input and try again.",
        401 => "You are not authorized to perform this action.",
        403 => "Access denied. You do not have permission to access this resource.",
        404 => "The requested resource was not found.",
        500 => "Internal server error. Please try again later.",
        _ => "Network error. Please check your connection and try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_without_server_message_uses_default() {
        let err = RequestError::from_status(401, "");
        assert_eq!(
            err.to_string(),
            "You are not authorized to perform this action."
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn server_message_wins_over_default() {
        let err = RequestError::from_status(400, r#"{"message":"Email already registered"}"#);
        assert_eq!(err.to_string(), "Email already registered");
        match err {
            RequestError::Status { payload, .. } => {
                assert_eq!(payload["message"], "Email already registered");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn blank_server_message_falls_back_to_default() {
        let err = RequestError::from_status(404, r#"{"message":"  "}"#);
        assert_eq!(err.to_string(), "The requested resource was not found.");
    }

    #[test]
    fn unparseable_body_defaults_to_empty_object() {
        let err = RequestError::from_status(500, "<html>oops</html>");
        match err {
            RequestError::Status {
                status, payload, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(payload, serde_json::json!({}));
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn default_message_table() {
        assert!(default_status_message(400).starts_with("Invalid request"));
        assert!(default_status_message(403).starts_with("Access denied"));
        assert!(default_status_message(404).contains("not found"));
        assert!(default_status_message(500).starts_with("Internal server error"));
        assert!(default_status_message(418).starts_with("Network error"));
    }

    #[test]
    fn timeout_is_retryable() {
        let err = RequestError::Timeout {
            after: Duration::from_millis(50),
        };
        assert!(err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Request timeout after 50ms");
    }

    #[test]
    fn status_retry_follows_message_text() {
        assert!(!RequestError::from_status(500, "").is_retryable());
        assert!(!RequestError::from_status(404, "").is_retryable());
        assert!(RequestError::from_status(503, "").is_retryable());
        assert!(RequestError::from_status(400, r#"{"message":"upstream timeout"}"#).is_retryable());
        assert!(!RequestError::from_status(400, r#"{"message":"network down"}"#).is_retryable());
    }

    #[test]
    fn non_transport_errors_are_not_retryable() {
        assert!(!RequestError::EmptyPath.is_retryable());
        assert!(!RequestError::Download { status: 503 }.is_retryable());
        let src = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = RequestError::Decode {
            context: "GET resumes".to_owned(),
            source: src,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
