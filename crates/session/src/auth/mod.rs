//! Authentication module

pub mod context;
pub mod error_handler;
pub mod error_messages;

// Re-export commonly used items
pub use context::{SessionManager, SessionPhase, SessionState};
pub use error_handler::{Escalation, SessionEvent};
