use std::fmt;

use crate::sanitize::sanitize_details;
use crate::{config::ConfigError, validation::ValidationError};

/// Code used when a failure never produced an HTTP response.
pub const NO_RESPONSE_CODE: u16 = 0;

/// Code attached to rejections synthesized from a 2xx response whose payload
/// signals failure.
pub const REJECTED_CODE: u16 = 400;

/// Details text used when a failure carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of a single physical HTTP attempt.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Status { status: u16, body: String },
    /// A 2xx response whose body could not be decoded.
    #[error("decode error: {message}")]
    Decode { message: String, body: String },
    /// Local I/O failure while preparing the request.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    /// HTTP status carried by this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::Decode { .. } | Self::Io(_) => None,
        }
    }
}

/// Opaque payload attached to a [`WebStoreError`].
#[derive(Clone, Debug, PartialEq)]
pub enum Details {
    Absent,
    Text(String),
    Json(serde_json::Value),
}

impl Details {
    /// Wraps a message, substituting [`UNKNOWN_ERROR`] for blank text.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Text(UNKNOWN_ERROR.to_owned())
        } else {
            Self::Text(text)
        }
    }

    /// Interprets a response body: JSON when it parses, text otherwise.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::Absent;
        }
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body.to_owned()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<serde_json::Value> for Details {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Structured failure surfaced by every remote operation.
///
/// `Display` never prints raw details; they always pass through
/// [`sanitize_details`] first.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}. Code: {code}. Details: {}", sanitize_details(.details))]
pub struct WebStoreError {
    message: String,
    code: u16,
    details: Details,
}

impl WebStoreError {
    pub fn new(message: impl Into<String>, code: u16, details: Details) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unexpected error during deployment".to_owned()
        } else {
            message
        };
        Self {
            message,
            code,
            details,
        }
    }

    /// Normalizes a terminal attempt failure.
    ///
    /// Failures without an HTTP status get [`NO_RESPONSE_CODE`].
    pub fn from_request_error(err: RequestError, message: impl Into<String>) -> Self {
        let code = err.status().unwrap_or(NO_RESPONSE_CODE);
        let details = match err {
            RequestError::Status { body, .. } => Details::from_body(&body),
            RequestError::Transport(err) => Details::message(err.to_string()),
            RequestError::Decode { message, .. } => Details::message(message),
            RequestError::Io(err) => Details::message(err.to_string()),
        };
        Self::new(message, code, details)
    }

    /// A transport-level success whose payload reports failure.
    pub fn rejected(message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(message, REJECTED_CODE, Details::Json(payload))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn details(&self) -> &Details {
        &self.details
    }
}

/// Error type returned by the deploy pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    WebStore(#[from] WebStoreError),
}

impl Error {
    /// Status code reported to CI; precondition failures never reached the API.
    pub fn code(&self) -> u16 {
        match self {
            Self::WebStore(err) => err.code(),
            Self::Config(_) | Self::Validation(_) => NO_RESPONSE_CODE,
        }
    }
}

impl fmt::Display for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&sanitize_details(self))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_failure_keeps_code_and_json_body() {
        let err = RequestError::Status {
            status: 500,
            body: r#"{"error":"backend"}"#.to_owned(),
        };
        let mapped = WebStoreError::from_request_error(err, "Failed to get access token");

        assert_eq!(mapped.code(), 500);
        assert_eq!(mapped.message(), "Failed to get access token");
        assert_eq!(mapped.details(), &Details::Json(json!({"error": "backend"})));
    }

    #[test]
    fn status_failure_with_plain_body_keeps_text() {
        let err = RequestError::Status {
            status: 404,
            body: "Not Found".to_owned(),
        };
        let mapped = WebStoreError::from_request_error(err, "Failed to publish item");

        assert_eq!(mapped.code(), 404);
        assert_eq!(mapped.details(), &Details::Text("Not Found".to_owned()));
    }

    #[test]
    fn failures_without_status_default_to_zero() {
        let err = RequestError::Decode {
            message: "expected value at line 1".to_owned(),
            body: "<html>".to_owned(),
        };
        let mapped = WebStoreError::from_request_error(err, "Failed to upload package");

        assert_eq!(mapped.code(), NO_RESPONSE_CODE);
        assert_eq!(
            mapped.details(),
            &Details::Text("expected value at line 1".to_owned())
        );
    }

    #[test]
    fn blank_messages_use_unknown_sentinel() {
        assert_eq!(Details::message("  "), Details::Text(UNKNOWN_ERROR.to_owned()));

        let err = WebStoreError::new("", 0, Details::Absent);
        assert!(!err.message().is_empty());
    }

    #[test]
    fn rejection_uses_client_side_code() {
        let payload = json!({"uploadState": "FAILURE"});
        let err = WebStoreError::rejected("Failed to upload package", payload.clone());

        assert_eq!(err.code(), REJECTED_CODE);
        assert_eq!(err.details(), &Details::Json(payload));
    }

    #[test]
    fn display_redacts_details() {
        let err = WebStoreError::new(
            "Failed to get access token",
            401,
            Details::Text("bad refresh_token=1//abcdef-secret".to_owned()),
        );
        let text = err.to_string();

        assert!(text.starts_with("Failed to get access token. Code: 401. Details: "));
        assert!(text.contains("[REDACTED]"));
        assert!(!text.contains("abcdef-secret"));
    }
}
