pub mod models;
pub mod r#trait;
pub mod validation;

pub use models::{ApiFailure, LoginRequest, LoginResponse, RegisterRequest};
pub use r#trait::AuthApi;
pub use validation::ValidationErrors;
