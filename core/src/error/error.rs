use thiserror::Error;

use crate::auth::ValidationErrors;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("auth failed: {0}")]
    Auth(#[from] AuthError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },
    #[error("storage data corrupt: {0}")]
    Corrupt(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    /// The remote API refused the request or could not be reached. `message` is the
    /// server's `detail` when present, otherwise the command's generic fallback.
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("another session command is already in flight")]
    Busy,
}

impl AuthError {
    /// Text suitable for showing next to the login/register form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Storage(_) => "Could not save your session. Please try again.".to_string(),
            Self::Busy => "Please wait for the current request to finish.".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}
