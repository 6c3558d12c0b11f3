//! Endpoint paths
//!
//! Paths are deployment-specific; the defaults match the reference deployment and any
//! of them can be overridden from configuration.

use serde::{Deserialize, Serialize};

/// Paths of the loyalty API endpoints, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub login: String,
    pub register: String,
    pub validate_token: String,
    pub events_list: String,
    pub event_by_guid: String,
    pub add_attendance: String,
    pub card_by_guid: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login: "/api/auth/login".to_string(),
            register: "/api/auth/register".to_string(),
            validate_token: "/api/auth/validate-token".to_string(),
            events_list: "/api/eventos".to_string(),
            event_by_guid: "/api/eventos/by-guid".to_string(),
            add_attendance: "/api/asistencias".to_string(),
            card_by_guid: "/api/tarjetas/by-guid".to_string(),
        }
    }
}
