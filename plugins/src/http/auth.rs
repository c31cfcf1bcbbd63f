use async_trait::async_trait;
use medport_core::api as core_api;

use super::client::{ensure_success, parse_json_response, HttpClient};
use super::error::PortalHttpError;

/// `AuthApi` over `POST /auth/login` and `POST /auth/register`.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: HttpClient,
    url_login: String,
    url_register: String,
}

impl HttpAuthApi {
    pub fn new(client: HttpClient) -> Self {
        let url_login = client.url("auth/login");
        let url_register = client.url("auth/register");
        Self {
            client,
            url_login,
            url_register,
        }
    }
}

fn to_failure(err: PortalHttpError) -> core_api::ApiFailure {
    core_api::ApiFailure {
        status: err.status(),
        detail: err.detail().map(str::to_string),
        reason: err.to_string(),
    }
}

#[async_trait]
impl core_api::AuthApi for HttpAuthApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn login(
        &self,
        request: &core_api::LoginRequest,
    ) -> Result<core_api::LoginResponse, core_api::ApiFailure> {
        let url = &self.url_login;
        tracing::debug!(target: "medport.http", stage = "auth.http.login.in", url = %url);
        let req = self.client.post(url).json(request);
        let resp = self.client.send(req, url).await.map_err(to_failure)?;
        let status = resp.status();
        let body = parse_json_response::<core_api::LoginResponse>(resp)
            .await
            .map_err(to_failure)?;
        tracing::debug!(
            target: "medport.http",
            stage = "auth.http.login.out",
            status = %status
        );
        Ok(body)
    }

    async fn register(
        &self,
        request: &core_api::RegisterRequest,
    ) -> Result<(), core_api::ApiFailure> {
        let url = &self.url_register;
        tracing::debug!(
            target: "medport.http",
            stage = "auth.http.register.in",
            url = %url,
            user_type = %request.user_type
        );
        let req = self.client.post(url).json(request);
        let resp = self.client.send(req, url).await.map_err(to_failure)?;
        let status = resp.status();
        ensure_success(resp).await.map_err(to_failure)?;
        tracing::debug!(
            target: "medport.http",
            stage = "auth.http.register.out",
            status = %status
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_api::AuthApi;
    use mockito::{Matcher, Server};

    fn api(server: &Server) -> HttpAuthApi {
        HttpAuthApi::new(HttpClient::new(server.url(), 1_000).unwrap())
    }

    #[tokio::test]
    async fn test_login_parses_success() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "patient1@example.com",
                "password": "password123"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"t1","user_type":"patient","user_id":42,"profile_id":null}"#,
            )
            .create_async()
            .await;

        let resp = api(&server)
            .login(&core_api::LoginRequest::new("patient1@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(resp.access_token, "t1");
        assert_eq!(resp.user_id, "42");
        assert_eq!(resp.profile_id, None);
    }

    #[tokio::test]
    async fn test_login_rejected_carries_detail() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Invalid credentials"}"#)
            .create_async()
            .await;

        let failure = api(&server)
            .login(&core_api::LoginRequest::new("patient1@example.com", "bad"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.detail.as_deref(), Some("Invalid credentials"));
        assert!(failure.reason.contains("kind=status"));
    }

    #[tokio::test]
    async fn test_login_decode_error_has_no_detail() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let failure = api(&server)
            .login(&core_api::LoginRequest::new("a@b.co", "pw"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, Some(200));
        assert_eq!(failure.detail, None);
        assert_eq!(failure.message_or("Login failed"), "Login failed");
    }

    #[tokio::test]
    async fn test_register_accepts_empty_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/register")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "user_type": "doctor",
                "specialization": "Cardiology"
            })))
            .with_status(201)
            .create_async()
            .await;

        let req = core_api::RegisterRequest {
            email: "doc@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "password1".to_string(),
            name: "Dr. Sen".to_string(),
            user_type: core_api::UserType::Doctor,
            location: "Kolkata".to_string(),
            specialization: Some("Cardiology".to_string()),
        };
        api(&server).register(&req).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_conflict_detail() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/register")
            .with_status(400)
            .with_body(r#"{"detail":"Email already registered"}"#)
            .create_async()
            .await;

        let req = core_api::RegisterRequest {
            email: "p@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "password1".to_string(),
            name: "Pat".to_string(),
            user_type: core_api::UserType::Patient,
            location: "Pune".to_string(),
            specialization: None,
        };
        let failure = api(&server).register(&req).await.unwrap_err();
        assert_eq!(failure.message_or("Registration failed"), "Email already registered");
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport() {
        // nothing listens on port 9 in the test environment
        let client = HttpClient::new("http://127.0.0.1:9/api", 500).unwrap();
        let failure = HttpAuthApi::new(client)
            .login(&core_api::LoginRequest::new("a@b.co", "pw"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, None);
        assert_eq!(failure.detail, None);
    }
}
