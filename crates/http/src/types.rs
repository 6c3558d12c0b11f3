//! Request and response types for the loyalty API

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use solara_core::{SessionUser, Token};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "idCliente")]
    pub client_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub cedula: Option<String>,
    pub token: Token,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "fechaNacimiento", default, deserialize_with = "lenient_date")]
    pub birth_date: Option<NaiveDate>,
}

impl From<LoginResponse> for SessionUser {
    fn from(response: LoginResponse) -> Self {
        Self {
            id: Some(response.client_id),
            name: response.name,
            lastname: response.lastname,
            cedula: response.cedula,
            token: response.token,
            email: response.email,
            birth_date: response.birth_date,
        }
    }
}

/// Customer registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub cedula: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: NaiveDate,
}

/// Generic `{success, message, ...}` result returned by business endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ServerResult {
    /// Message used when a call fails without a usable server response
    pub const UNEXPECTED_ERROR: &'static str = "unexpected error";

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn unexpected() -> Self {
        Self::failure(Self::UNEXPECTED_ERROR)
    }

    /// Result carried by a failed response body.
    ///
    /// Any JSON object is kept. `success` and `message` are lifted out only when they have
    /// the expected types; otherwise they stay in `extra` untouched.
    pub fn from_error_body(body: &JsonValue) -> Option<Self> {
        let object = body.as_object()?;
        if let Ok(result) = serde_json::from_value(body.clone()) {
            return Some(result);
        }

        let mut extra = object.clone();
        let success = match extra.get("success").and_then(JsonValue::as_bool) {
            Some(success) => {
                extra.remove("success");
                success
            }
            None => false,
        };
        let message = match extra.get("message") {
            Some(JsonValue::String(message)) => {
                let message = message.clone();
                extra.remove("message");
                Some(message)
            }
            _ => None,
        };

        Some(Self {
            success,
            message,
            extra,
        })
    }
}

/// Token validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    #[serde(default)]
    pub success: bool,
}

/// `{data: ...}` envelope used by the read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// A workshop or event customers can attend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "idEvento", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "nombreEvento", default)]
    pub name: Option<String>,
    #[serde(rename = "fechaEvento", default)]
    pub date: Option<String>,
    #[serde(rename = "horaEvento", default)]
    pub time: Option<String>,
    #[serde(rename = "lugarEvento", default)]
    pub location: Option<String>,
    #[serde(rename = "precioEvento", default)]
    pub price: Option<f64>,
    #[serde(rename = "descripcionEvento", default)]
    pub description: Option<String>,
    #[serde(rename = "asistenciaEventos", default, deserialize_with = "null_as_empty")]
    pub attendances: Vec<Attendance>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Event {
    /// Whether the customer is already signed up for this event
    pub fn is_attending(&self, client_id: i64) -> bool {
        self.attendances
            .iter()
            .any(|attendance| attendance.client_id == Some(client_id))
    }
}

/// One sign-up listed on an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(rename = "idCliente", default, deserialize_with = "lenient_id")]
    pub client_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Loyalty card balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, deserialize_with = "lenient_points")]
    pub puntos: u32,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Card lookup result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Card>,
}

// Event ids arrive as GUID strings from some deployments and integers from others
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number event id, got {other}"
        ))),
    }
}

// Dates may arrive as `YYYY-MM-DD` or as a full ISO datetime; anything else is dropped
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(JsonValue::as_str)
        .and_then(|raw| raw.get(..10))
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_i64(),
        Some(JsonValue::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_points<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let points = match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => return Ok(0),
        Some(JsonValue::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Some(JsonValue::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    points
        .map(|points| u32::try_from(points).unwrap_or(u32::MAX))
        .ok_or_else(|| serde::de::Error::custom("expected a non-negative point balance"))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
