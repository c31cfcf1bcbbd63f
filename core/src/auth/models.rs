use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::session::UserType;
use crate::storage::is_placeholder;

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_type: UserType,
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub profile_id: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub name: String,
    pub user_type: UserType,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

impl RegisterRequest {
    /// Copy of the request as it goes on the wire: specialization only for doctors.
    pub fn to_payload(&self) -> RegisterRequest {
        let specialization = match self.user_type {
            UserType::Doctor => self
                .specialization
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        };
        RegisterRequest {
            specialization,
            ..self.clone()
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("user_type", &self.user_type)
            .field("location", &self.location)
            .field("specialization", &self.specialization)
            .finish()
    }
}

/// A failed call to the authentication API.
///
/// `detail` is the server-supplied message from the error payload, when there was one.
/// `reason` is the diagnostic description for logs and is never shown to users.
#[derive(Debug, Clone, Error)]
#[error("auth api failure (status={status:?}): {reason}")]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub reason: String,
}

impl ApiFailure {
    pub fn rejected(status: u16, detail: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            detail,
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: None,
            reason: reason.into(),
        }
    }

    /// The server's `detail`, falling back to `fallback` when the payload had none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Int(v) => v.to_string(),
            WireId::Text(s) => s,
        }
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(WireId::into_string)
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<WireId>::deserialize(deserializer)?;
    Ok(raw
        .map(WireId::into_string)
        .filter(|id| !is_placeholder(id)))
}
