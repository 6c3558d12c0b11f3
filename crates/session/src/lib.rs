//! Session lifecycle for the Solara loyalty client
//!
//! [`SessionManager`] owns the in-memory session, restores it from the credential store
//! at startup and exposes login, logout and registration. Any caller that sees
//! [`ClientError::Unauthorized`](solara_http::ClientError::Unauthorized) hands it to the
//! [`Escalation`] policy, which tears the session down and tells the UI to go to the
//! login page.

pub mod auth;
pub mod client_wrapper;
pub mod config;
pub mod services;

pub use auth::context::{SessionManager, SessionPhase, SessionState};
pub use auth::error_handler::{Escalation, SessionEvent};
pub use auth::error_messages::user_friendly_error;
pub use client_wrapper::{AttendOutcome, WrappedClient};
pub use config::AuthConfig;
