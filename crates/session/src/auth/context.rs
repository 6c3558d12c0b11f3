//! Session state and the manager that owns it

use super::error_handler::{Escalation, SessionEvent};
use crate::client_wrapper::WrappedClient;
use crate::config::AuthConfig;
use solara_core::{CredentialStore, SessionUser};
use solara_http::ApiClient;
use solara_http::types::{LoginRequest, RegisterRequest, ServerResult};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

/// In-memory session, published to every subscriber
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    /// True until startup restoration has finished
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true, // Start with loading until the stored session is checked
        }
    }
}

/// Where the session lifecycle currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Restoring,
    Authenticated,
    Anonymous,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.loading) {
            (_, true) => SessionPhase::Restoring,
            (Some(_), false) => SessionPhase::Authenticated,
            (None, false) => SessionPhase::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }
}

struct Shared {
    client: ApiClient,
    store: CredentialStore,
    state: Arc<watch::Sender<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    escalation: Escalation,
}

/// Owner of the session state and sole writer of the stored credentials.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Create the manager and spawn startup restoration on the current tokio runtime.
    ///
    /// The credential store is the one the client reads its tokens from.
    pub fn start(client: ApiClient) -> Self {
        let store = client.credentials().clone();
        let (state, _) = watch::channel(SessionState::default());
        let state = Arc::new(state);
        let (events, _) = broadcast::channel(AuthConfig::EVENT_CHANNEL_CAPACITY);
        let escalation = Escalation::new(store.clone(), state.clone(), events.clone());

        let manager = Self {
            shared: Arc::new(Shared {
                client,
                store,
                state,
                events,
                escalation,
            }),
        };

        let restoring = manager.clone();
        tokio::spawn(async move {
            restoring.restore().await;
        });

        manager
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.state.borrow().phase()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.shared.state.borrow().user.clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Receive session notifications emitted from now on
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Wait until startup restoration has finished
    pub async fn ready(&self) {
        let mut state = self.shared.state.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel
        let _ = state.wait_for(|state| !state.loading).await;
    }

    /// Authenticate with email and password.
    ///
    /// Returns false on any failure and leaves the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.ready().await;

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = match self.shared.client.login(&request).await {
            Ok(response) => SessionUser::from(response),
            Err(e) => {
                error!("Login failed: {}", e);
                return false;
            }
        };
        if user.token.is_empty() {
            error!("Login response carried an empty token");
            return false;
        }

        self.shared.store.set_token(&user.token);
        self.shared.store.set_user(&user);
        self.shared.escalation.rearm();
        self.shared.state.send_modify(|state| state.user = Some(user));
        let _ = self.shared.events.send(SessionEvent::SignedIn);

        info!("Signed in");
        true
    }

    /// Drop the session and its stored credentials. Idempotent.
    pub async fn logout(&self) {
        self.ready().await;

        self.shared.store.clear();
        let was_signed_in = self
            .shared
            .state
            .send_if_modified(|state| state.user.take().is_some());

        if was_signed_in {
            let _ = self.shared.events.send(SessionEvent::SignedOut);
            info!("Signed out");
        }
    }

    /// Create an account.
    ///
    /// Never touches the session: signing in afterwards takes an explicit
    /// [`login`](Self::login).
    pub async fn register(&self, payload: &RegisterRequest) -> ServerResult {
        match self.shared.client.register(payload).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Registration failed: {}", e);
                e.error_body()
                    .and_then(ServerResult::from_error_body)
                    .unwrap_or_else(ServerResult::unexpected)
            }
        }
    }

    /// Escalation policy bound to this session
    pub fn escalation(&self) -> &Escalation {
        &self.shared.escalation
    }

    /// Client for page-level data fetches; authorization failures escalate
    pub fn api(&self) -> WrappedClient {
        WrappedClient::new(self.shared.client.clone(), self.shared.escalation.clone())
    }

    async fn restore(&self) {
        let user = self.restored_user().await;

        if user.is_some() {
            self.shared.escalation.rearm();
        }
        // User and loading change together so nobody sees a half-restored session
        self.shared.state.send_modify(|state| {
            state.user = user;
            state.loading = false;
        });

        debug!("Session restoration finished: {:?}", self.phase());
    }

    async fn restored_user(&self) -> Option<SessionUser> {
        let store = &self.shared.store;

        let Some(token) = store.token() else {
            debug!("No stored token, starting anonymous");
            return None;
        };

        if let Some(user) = store.user() {
            debug!("Restored session from cached profile");
            return Some(user);
        }

        match self.shared.client.validate_token().await {
            Ok(response) if response.success => {
                // An escalation may have cleared the token while validation was in flight
                if store.token().as_ref() != Some(&token) {
                    warn!("Stored token changed during validation, starting anonymous");
                    return None;
                }
                let user = SessionUser::from_token(token);
                store.set_user(&user);
                debug!("Restored session from validated token");
                Some(user)
            }
            Ok(_) => {
                warn!("Stored token was rejected, clearing it");
                store.clear_token();
                None
            }
            Err(e) => {
                warn!("Token validation failed: {}", e);
                store.clear_token();
                None
            }
        }
    }
}
