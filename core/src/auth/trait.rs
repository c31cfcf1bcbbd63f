use async_trait::async_trait;

use super::models::{ApiFailure, LoginRequest, LoginResponse, RegisterRequest};

/// Remote authentication endpoints (`POST /auth/login`, `POST /auth/register`).
#[async_trait]
pub trait AuthApi: Send + Sync {
    fn name(&self) -> &str;
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiFailure>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiFailure>;
}
