//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `medport_core::api` instead of reaching into internal modules.

pub use crate::auth::{
    ApiFailure, AuthApi, LoginRequest, LoginResponse, RegisterRequest, ValidationErrors,
};
pub use crate::config::{
    load_default, ApiConfig, AppConfig, LoggingConfig, StorageConfig, StorageKind,
};
pub use crate::error::{AuthError, CliError, StorageError};
pub use crate::session::{
    select_screen, Navigator, Screen, ScreenGroup, SessionManager, SessionState, UserType,
};
pub use crate::storage::{MemoryStore, SecureStore, SESSION_KEYS};
