//! API wrapper utilities for handling authentication errors

use crate::auth::Escalation;
use solara_http::ClientError;

/// Escalate if the error is an authorization failure
pub fn handle_api_error(error: &ClientError, escalation: &Escalation) {
    if error.is_unauthorized() {
        escalation.trigger();
    }
}

/// Wrapper for API calls that handles auth errors.
///
/// The error is still returned so the caller can stop whatever it was doing.
pub async fn with_auth_error_handling<T, F>(
    escalation: &Escalation,
    api_call: F,
) -> Result<T, ClientError>
where
    F: std::future::Future<Output = Result<T, ClientError>>,
{
    match api_call.await {
        Ok(result) => Ok(result),
        Err(error) => {
            handle_api_error(&error, escalation);
            Err(error)
        }
    }
}
