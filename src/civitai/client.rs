//! HTTP client for the Civitai REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::CivitaiConfig;
use super::models::{ModelRecord, VersionRecord};
use super::CivitaiError;
use crate::utils::describe_request_error;

/// Read access to model and version records.
///
/// `Ok(None)` means the platform answered successfully with an empty body.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn fetch_model(&self, model_id: u64) -> Result<Option<ModelRecord>, CivitaiError>;

    async fn fetch_version(&self, version_id: u64)
        -> Result<Option<VersionRecord>, CivitaiError>;
}

/// Civitai API client. Immutable after construction.
pub struct CivitaiClient {
    config: CivitaiConfig,
    client: Client,
}

impl CivitaiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CivitaiConfig) -> Result<Self, CivitaiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CivitaiError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// GET `{base}/{path}` and decode the body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CivitaiError> {
        let url = format!("{}/{}", self.config.base(), path.trim_start_matches('/'));
        debug!("Civitai GET {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let resp = request.send().await.map_err(|e| {
            warn!("Civitai request failed: {} (URL: {})", e, url);
            CivitaiError::Connection(describe_request_error(&e))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Civitai API error: HTTP {} (URL: {})", status, url);
            return Err(CivitaiError::Api {
                status: status.as_u16(),
                message: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    format!("{}: {}", status, body.trim())
                },
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CivitaiError::Connection(describe_request_error(&e)))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| CivitaiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ModelCatalog for CivitaiClient {
    async fn fetch_model(&self, model_id: u64) -> Result<Option<ModelRecord>, CivitaiError> {
        self.get_json(&format!("models/{}", model_id)).await
    }

    async fn fetch_version(
        &self,
        version_id: u64,
    ) -> Result<Option<VersionRecord>, CivitaiError> {
        self.get_json(&format!("model-versions/{}", version_id))
            .await
    }
}
