//! Event and attendance endpoints

use super::{ApiClient, ClientError};
use crate::types::{DataEnvelope, Event, ServerResult};
use reqwest::Method;

impl ApiClient {
    pub async fn list_events(&self) -> Result<DataEnvelope<Vec<Event>>, ClientError> {
        let req = self.request(Method::GET, &self.endpoints().events_list);
        self.execute(req).await
    }

    pub async fn get_event(&self, guid: &str) -> Result<DataEnvelope<Event>, ClientError> {
        let req = self
            .request(Method::GET, &self.endpoints().event_by_guid)
            .query(&[("id", guid)]);
        self.execute(req).await
    }

    /// Register the customer's attendance to an event
    pub async fn add_attendance(
        &self,
        event_id: &str,
        client_id: i64,
    ) -> Result<ServerResult, ClientError> {
        let client_id = client_id.to_string();
        let req = self
            .request(Method::POST, &self.endpoints().add_attendance)
            .query(&[("idEvento", event_id), ("idCliente", client_id.as_str())]);
        self.execute(req).await
    }
}
