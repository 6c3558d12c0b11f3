//! Session configuration

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Login entry point the UI is sent to when a session is torn down
    pub const LOGIN_ROUTE: &'static str = "/login";

    /// Notice shown when the server rejects the session
    pub const SESSION_EXPIRED_NOTICE: &'static str =
        "Your session has expired. Please sign in again.";

    /// Buffered session events per subscriber
    pub const EVENT_CHANNEL_CAPACITY: usize = 16;
}
