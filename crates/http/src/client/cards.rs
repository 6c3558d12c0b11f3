//! Loyalty card endpoints

use super::{ApiClient, ClientError};
use crate::types::CardResponse;
use reqwest::Method;

impl ApiClient {
    pub async fn get_card(&self, card_id: &str) -> Result<CardResponse, ClientError> {
        let req = self
            .request(Method::GET, &self.endpoints().card_by_guid)
            .query(&[("id", card_id)]);
        self.execute(req).await
    }
}
