//! Client-side checks run before any request reaches the API.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::models::{LoginRequest, RegisterRequest};
use crate::session::UserType;

pub const MSG_LOGIN_REQUIRED: &str = "Please enter both email and password.";
pub const MSG_NAME_REQUIRED: &str = "Full Name is required.";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const MSG_PHONE_INVALID: &str = "Please enter a valid 10-digit phone number.";
pub const MSG_PASSWORD_WEAK: &str =
    "Password must be at least 8 characters long and include a number.";
pub const MSG_SPECIALIZATION_REQUIRED: &str = "Specialization is required for doctors.";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email regex"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"))
}

fn password_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{8,}$").expect("password regex"))
}

/// Field name -> message, ordered by field name so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.is_empty() || self.password.is_empty() {
            errors.add("credentials", MSG_LOGIN_REQUIRED);
        }
        errors.into_result()
    }
}

impl RegisterRequest {
    /// Reports every failing field at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", MSG_NAME_REQUIRED);
        }
        if !email_re().is_match(&self.email) {
            errors.add("email", MSG_EMAIL_INVALID);
        }
        if !phone_re().is_match(&self.phone) {
            errors.add("phone", MSG_PHONE_INVALID);
        }
        if !is_strong_password(&self.password) {
            errors.add("password", MSG_PASSWORD_WEAK);
        }
        if self.user_type == UserType::Doctor
            && self
                .specialization
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
        {
            errors.add("specialization", MSG_SPECIALIZATION_REQUIRED);
        }

        errors.into_result()
    }
}

fn is_strong_password(password: &str) -> bool {
    password_re().is_match(password)
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}
