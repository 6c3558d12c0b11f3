//! Unauthorized-response escalation
//!
//! Any caller that receives [`ClientError::Unauthorized`](solara_http::ClientError)
//! triggers the [`Escalation`]: the stored credentials are dropped, the session user is
//! cleared and a single [`SessionEvent::Expired`] is broadcast for the UI to show the
//! notice and navigate to the login page.

use super::context::SessionState;
use crate::config::AuthConfig;
use solara_core::CredentialStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// Notifications published by the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// The server rejected the session; show `notice` and navigate to `redirect_to`
    Expired {
        notice: String,
        redirect_to: &'static str,
    },
}

/// Forced logout-and-redirect policy.
///
/// Safe to trigger any number of times, from any number of in-flight requests: clearing
/// already-cleared slots is a no-op and only the first trigger per session emits
/// [`SessionEvent::Expired`].
#[derive(Clone)]
pub struct Escalation {
    store: CredentialStore,
    state: Arc<watch::Sender<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    // Set once the current session has been escalated; cleared by the next sign-in
    fired: Arc<AtomicBool>,
}

impl Escalation {
    pub(crate) fn new(
        store: CredentialStore,
        state: Arc<watch::Sender<SessionState>>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            store,
            state,
            events,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Tear the session down after an authorization failure
    pub fn trigger(&self) {
        self.store.clear();
        self.state.send_if_modified(|state| state.user.take().is_some());

        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("Session already escalated, ignoring repeated authorization failure");
            return;
        }

        warn!(
            "Session rejected by the server, redirecting to {}",
            AuthConfig::LOGIN_ROUTE
        );
        // No subscribers is fine; the state change is still observable
        let _ = self.events.send(SessionEvent::Expired {
            notice: AuthConfig::SESSION_EXPIRED_NOTICE.to_string(),
            redirect_to: AuthConfig::LOGIN_ROUTE,
        });
    }

    /// Whether the current session has already been escalated
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Allow the next authorization failure to notify again
    pub(crate) fn rearm(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }
}
