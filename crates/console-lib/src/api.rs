//! HTTP client for the analysis platform's REST surface
//!
//! JSON over HTTP GET only; no request bodies, no auth, no retries. Any
//! non-2xx status is treated uniformly as failure.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::StoreError;
use crate::models::{
    AppPatch, CalibrationResult, ClusterPlacement, InterferenceResult, ProfilingResult,
};
use crate::store::PlacementVariant;

/// Request timeout applied to every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the platform API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StoreError::Transport)?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request and decode the JSON response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = self.base_url.join(path)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(StoreError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        response.json().await.map_err(StoreError::Decode)
    }

    /// Full app collection: mapping from app id to a partial app record.
    pub async fn apps(&self) -> Result<BTreeMap<String, AppPatch>, StoreError> {
        self.get("/api/apps").await
    }

    /// Detail record for one app.
    pub async fn app(&self, app_id: &str) -> Result<AppPatch, StoreError> {
        self.get(&format!("/api/apps/{}", app_id)).await
    }

    /// Calibration curve for one app.
    pub async fn calibration(&self, app_id: &str) -> Result<CalibrationResult, StoreError> {
        self.get(&format!("/api/apps/{}/calibration", app_id)).await
    }

    /// Profiling curves for one service of an app.
    pub async fn profiling(
        &self,
        app_id: &str,
        service: &str,
    ) -> Result<ProfilingResult, StoreError> {
        self.get(&format!(
            "/api/apps/{}/services/{}/profiling",
            app_id, service
        ))
        .await
    }

    /// Interference scores for one service of an app.
    pub async fn interference(
        &self,
        app_id: &str,
        service: &str,
    ) -> Result<InterferenceResult, StoreError> {
        self.get(&format!(
            "/api/apps/{}/services/{}/interference",
            app_id, service
        ))
        .await
    }

    /// Cluster placement snapshot, current or recommended.
    pub async fn placement(
        &self,
        variant: PlacementVariant,
    ) -> Result<ClusterPlacement, StoreError> {
        self.get(variant.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = ApiClient::new("not a url");
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_is_uniform_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/apps/app-1/calibration")
            .with_status(503)
            .with_body("backend unavailable")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.calibration("app-1").await.unwrap_err();

        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "backend unavailable");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/apps/app-1/calibration")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.calibration("app-1").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_apps_listing_decodes_into_patches() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/apps")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "app-1": {"name": "Redis", "type": "workload"},
                    "app-2": {"name": "Spark"}
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let listing = client.apps().await.unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing["app-1"].app_type.as_deref(), Some("workload"));
        assert!(listing["app-2"].app_type.is_none());
    }
}
