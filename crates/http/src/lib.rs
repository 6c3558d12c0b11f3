//! Solara HTTP gateway
//!
//! A single outbound client for the loyalty API. Every request is decorated with the
//! bearer token currently held by the [`CredentialStore`](solara_core::CredentialStore)
//! and every response is classified so that authorization failures surface as a
//! distinct [`ClientError::Unauthorized`].

pub mod client;
pub mod types;

pub use client::config::EndpointConfig;
pub use client::error::ClientError;
pub use client::{ApiClient, ApiClientBuilder, DEFAULT_TIMEOUT};
