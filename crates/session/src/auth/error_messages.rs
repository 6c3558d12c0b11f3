//! User-friendly error message mappings

use crate::config::AuthConfig;
use solara_http::ClientError;

/// Convert a gateway error into a notice suitable for the user
pub fn user_friendly_error(error: &ClientError) -> String {
    match error {
        ClientError::Unauthorized => AuthConfig::SESSION_EXPIRED_NOTICE.to_string(),
        ClientError::Request(_) if error.is_timeout() => {
            "The server took too long to respond. Please try again.".to_string()
        }
        ClientError::Request(_) => {
            "Could not reach the server. Check your connection and try again.".to_string()
        }
        // Server should provide user-friendly messages
        ClientError::Status { message, .. } => message.clone(),
        ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
        ClientError::Configuration(message) => format!("The client is misconfigured: {message}"),
    }
}
