//! Credential store: the durable slots behind a session
//!
//! Holds the bearer token and the cached profile. No validation, expiry or encryption
//! happens here, and no operation ever fails: read errors are logged and reported as
//! absent, write errors are logged and dropped.

use crate::storage::{MemoryStorage, Storage};
use crate::types::{SessionUser, Token};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Slot holding the raw bearer string
pub const TOKEN_KEY: &str = "token";
/// Slot holding the serialized [`SessionUser`]
pub const USER_KEY: &str = "user";

/// Token and profile slots over a [`Storage`] backend.
///
/// Cloning is cheap and clones share the backend.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
}

impl CredentialStore {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Store backed by process-local memory
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Current token, if one is stored and readable
    pub fn token(&self) -> Option<Token> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(Some(raw)) => {
                let token = Token::from(raw);
                if token.is_empty() { None } else { Some(token) }
            }
            Ok(None) => {
                debug!("No stored token");
                None
            }
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    pub fn set_token(&self, token: &Token) {
        if let Err(e) = self.storage.set_item(TOKEN_KEY, token.as_str()) {
            warn!("Failed to persist token: {}", e);
        }
    }

    pub fn clear_token(&self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            warn!("Failed to clear token: {}", e);
        }
    }

    /// Cached profile, if one is stored and parses
    pub fn user(&self) -> Option<SessionUser> {
        match self.storage.get_item(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring unreadable cached profile: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cached profile: {}", e);
                None
            }
        }
    }

    pub fn set_user(&self, user: &SessionUser) {
        let serialized = match serde_json::to_string(user) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize profile: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(USER_KEY, &serialized) {
            warn!("Failed to persist profile: {}", e);
        }
    }

    pub fn clear_user(&self) {
        if let Err(e) = self.storage.remove_item(USER_KEY) {
            warn!("Failed to clear cached profile: {}", e);
        }
    }

    /// Drop both slots
    pub fn clear(&self) {
        self.clear_token();
        self.clear_user();
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
