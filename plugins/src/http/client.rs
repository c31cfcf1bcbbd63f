use serde::de::DeserializeOwned;

use super::error::PortalHttpError;

/// Shared reqwest client bound to the portal API base URL (which carries the `/api` prefix).
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url)
    }

    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.post(url)
    }

    /// Sends the request, mapping transport failures with the target URL attached.
    pub async fn send(
        &self,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, PortalHttpError> {
        req.send()
            .await
            .map_err(|err| PortalHttpError::from_reqwest(err, url.to_string()))
    }
}

pub(crate) async fn parse_json_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, PortalHttpError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| PortalHttpError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        return Err(PortalHttpError::status_error(status.as_u16(), url, &body));
    }

    serde_json::from_str::<T>(&body)
        .map_err(|err| PortalHttpError::decode_error(status.as_u16(), url, err, &body))
}

pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<(), PortalHttpError> {
    let status = resp.status();
    let url = resp.url().to_string();

    if status.is_success() {
        return Ok(());
    }

    let body = resp
        .text()
        .await
        .map_err(|err| PortalHttpError::from_reqwest(err, url.clone()))?;
    Err(PortalHttpError::status_error(status.as_u16(), url, &body))
}
