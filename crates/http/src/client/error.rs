//! Client error types

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the credential (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Network, connection or timeout failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success status other than 401
    #[error("Server error {status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// Structured error body, when the server sent JSON
        body: Option<JsonValue>,
    },

    /// Response body did not match the endpoint's result type
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and raw body
    pub fn from_status(status: reqwest::StatusCode, text: String) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Self::Unauthorized;
        }

        let body = serde_json::from_str::<JsonValue>(&text).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        Self::Status {
            status: status.as_u16(),
            message,
            body,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }

    /// Structured body carried by a failed response, if any
    pub fn error_body(&self) -> Option<&JsonValue> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
