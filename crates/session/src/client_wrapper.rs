//! Wrapped client that handles auth errors automatically

use crate::auth::Escalation;
use crate::services::with_auth_error_handling;
use solara_http::types::{CardResponse, Event, ServerResult};
use solara_http::{ApiClient, ClientError};
use tracing::debug;

/// Result of asking to attend an event
#[derive(Debug, Clone, PartialEq)]
pub enum AttendOutcome {
    /// The server accepted the sign-up
    Registered(ServerResult),
    /// The customer was already on the event's attendance list; nothing was sent
    AlreadyAttending,
}

/// Wrapper around ApiClient that routes authorization failures to the escalation policy
#[derive(Clone)]
pub struct WrappedClient {
    inner: ApiClient,
    escalation: Escalation,
}

impl WrappedClient {
    /// Create a new wrapped client
    pub fn new(client: ApiClient, escalation: Escalation) -> Self {
        Self {
            inner: client,
            escalation,
        }
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, ClientError> {
        with_auth_error_handling(&self.escalation, self.inner.list_events())
            .await
            .map(|envelope| envelope.data)
    }

    pub async fn get_event(&self, guid: &str) -> Result<Event, ClientError> {
        with_auth_error_handling(&self.escalation, self.inner.get_event(guid))
            .await
            .map(|envelope| envelope.data)
    }

    pub async fn add_attendance(
        &self,
        event_id: &str,
        client_id: i64,
    ) -> Result<ServerResult, ClientError> {
        with_auth_error_handling(
            &self.escalation,
            self.inner.add_attendance(event_id, client_id),
        )
        .await
    }

    /// Sign the customer up for an event unless they already are
    pub async fn attend(&self, event_id: &str, client_id: i64) -> Result<AttendOutcome, ClientError> {
        let event = self.get_event(event_id).await?;
        if event.is_attending(client_id) {
            debug!("Client {} already attends event {}", client_id, event_id);
            return Ok(AttendOutcome::AlreadyAttending);
        }

        self.add_attendance(event_id, client_id)
            .await
            .map(AttendOutcome::Registered)
    }

    pub async fn get_card(&self, card_id: &str) -> Result<CardResponse, ClientError> {
        with_auth_error_handling(&self.escalation, self.inner.get_card(card_id)).await
    }
}
