//! Bearer-token client for the role screens' endpoints (doctors, medicines,
//! insurance, schemes, prescription analysis). Never touches the session.

use std::sync::Arc;

use medport_core::api as core_api;
use medport_core::storage::TOKEN_KEY;
use serde::de::DeserializeOwned;

use super::client::{parse_json_response, HttpClient};
use super::error::PortalHttpError;
use super::models::{
    Doctor, GovernmentSchemes, InsuranceRecommendations, Medicine, MedicineDetails,
    PrescriptionAnalysis,
};

#[derive(Clone)]
pub struct PortalClient {
    client: HttpClient,
    store: Arc<dyn core_api::SecureStore>,
}

impl PortalClient {
    pub fn new(client: HttpClient, store: Arc<dyn core_api::SecureStore>) -> Self {
        Self { client, store }
    }

    /// Attaches the stored token, read fresh for every request.
    async fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.is_empty() => req.bearer_auth(token),
            Ok(_) => req,
            Err(err) => {
                tracing::warn!(
                    target: "medport.http",
                    stage = "portal.http.token",
                    error = %err,
                    "token read failed, sending unauthenticated request"
                );
                req
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalHttpError> {
        let url = self.client.url(path);
        tracing::debug!(target: "medport.http", stage = "portal.http.get.in", url = %url);
        let req = self.authorize(self.client.get(&url)).await;
        let resp = self.client.send(req, &url).await?;
        let status = resp.status();
        let value = parse_json_response(resp).await?;
        tracing::debug!(
            target: "medport.http",
            stage = "portal.http.get.out",
            url = %url,
            status = %status
        );
        Ok(value)
    }

    pub async fn available_doctors(&self) -> Result<Vec<Doctor>, PortalHttpError> {
        self.get_json("patients/doctors/available").await
    }

    pub async fn medicines(&self) -> Result<Vec<Medicine>, PortalHttpError> {
        self.get_json("pharmacy/medicines").await
    }

    pub async fn medicine_details(
        &self,
        medicine_id: i64,
    ) -> Result<MedicineDetails, PortalHttpError> {
        self.get_json(&format!("pharmacy/medicines/{medicine_id}"))
            .await
    }

    pub async fn insurance_recommendations(
        &self,
        user_id: &str,
    ) -> Result<InsuranceRecommendations, PortalHttpError> {
        self.get_json(&format!("patients/insurance-recommendations/{user_id}"))
            .await
    }

    pub async fn government_schemes(
        &self,
        user_id: &str,
    ) -> Result<GovernmentSchemes, PortalHttpError> {
        self.get_json(&format!("patients/government-schemes/{user_id}"))
            .await
    }

    /// Uploads a prescription photo as multipart field `file`.
    pub async fn analyze_prescription(
        &self,
        user_id: &str,
        image: Vec<u8>,
    ) -> Result<PrescriptionAnalysis, PortalHttpError> {
        let url = self.client.url("ai/prescription/analyze");
        tracing::debug!(
            target: "medport.http",
            stage = "portal.http.analyze.in",
            url = %url,
            image_bytes = image.len()
        );
        let part = reqwest::multipart::Part::bytes(image)
            .file_name("prescription.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| PortalHttpError::from_reqwest(err, url.clone()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self
            .client
            .post(&url)
            .query(&[("patient_id", user_id)])
            .multipart(form);
        let req = self.authorize(req).await;
        let resp = self.client.send(req, &url).await?;
        let status = resp.status();
        let analysis = parse_json_response(resp).await?;
        tracing::debug!(
            target: "medport.http",
            stage = "portal.http.analyze.out",
            status = %status
        );
        Ok(analysis)
    }
}
