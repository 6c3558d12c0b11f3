//! Authentication endpoints

use super::{ApiClient, ClientError};
use crate::types::{
    LoginRequest, LoginResponse, RegisterRequest, ServerResult, ValidateTokenResponse,
};
use reqwest::Method;

impl ApiClient {
    /// Exchange credentials for a token and profile
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = self
            .request(Method::POST, &self.endpoints().login)
            .json(request);
        self.execute(req).await
    }

    /// Create a customer account; does not authenticate
    pub async fn register(&self, request: &RegisterRequest) -> Result<ServerResult, ClientError> {
        let req = self
            .request(Method::POST, &self.endpoints().register)
            .json(request);
        self.execute(req).await
    }

    /// Ask the server whether the stored token is still valid
    pub async fn validate_token(&self) -> Result<ValidateTokenResponse, ClientError> {
        let req = self.request(Method::GET, &self.endpoints().validate_token);
        self.execute(req).await
    }
}
