//! Solara API client

pub mod auth;
pub mod cards;
pub mod config;
pub mod error;
pub mod events;

use config::EndpointConfig;
use error::ClientError;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use solara_core::CredentialStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Timeout applied to every request unless the builder overrides it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Loyalty API client.
///
/// Reads the current token from its [`CredentialStore`] on every request and never
/// writes to it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    endpoints: Arc<EndpointConfig>,
    credentials: CredentialStore,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(
        base_url: impl Into<String>,
        credentials: CredentialStore,
    ) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(base_url)
            .credentials(credentials)
            .build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Store the request hook reads tokens from
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Create a request builder, attaching the stored bearer token when there is one
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);

        match self.credentials.token() {
            Some(token) => {
                debug!("Attaching bearer token to {}", path);
                request.header(header::AUTHORIZATION, token.bearer())
            }
            None => {
                debug!("Sending {} without credentials", path);
                request
            }
        }
    }

    /// Execute a request and classify the response.
    ///
    /// 401 becomes [`ClientError::Unauthorized`]; the caller decides how to escalate.
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("HTTP request failed: {}", e);
                return Err(e.into());
            }
        };
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(|e| {
                error!("Failed to read response body: {}", e);
                ClientError::from(e)
            })?;
            serde_json::from_slice(&body).map_err(|e| {
                error!("Response body did not match the expected shape: {}", e);
                ClientError::from(e)
            })
        } else if status == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the request credentials");
            Err(ClientError::Unauthorized)
        } else {
            let text = response.text().await.unwrap_or_default();
            let error = ClientError::from_status(status, text);
            error!("HTTP response error: {}", error);
            Err(error)
        }
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    endpoints: Option<EndpointConfig>,
    credentials: Option<CredentialStore>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Set the store bearer tokens are read from
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .default_headers(headers)
            .user_agent(concat!("solara-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            client,
            base_url,
            endpoints: Arc::new(self.endpoints.unwrap_or_default()),
            credentials: self.credentials.unwrap_or_default(),
        })
    }
}
