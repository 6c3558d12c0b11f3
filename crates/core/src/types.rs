//! Session data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential issued by the server at login.
///
/// Only ever replaced as a whole or deleted. `Debug` output is redacted so tokens do not
/// end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The authenticated identity.
///
/// Everything except the token is optional: restoring a session from a bare token only
/// knows `{token}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cedula: Option<String>,
    pub token: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "nacimiento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

impl SessionUser {
    /// Minimal user reconstructed from a token the server has validated
    pub fn from_token(token: Token) -> Self {
        Self {
            id: None,
            name: None,
            lastname: None,
            cedula: None,
            token,
            email: None,
            birth_date: None,
        }
    }

    /// "Name Lastname", whichever parts are known
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.name.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
