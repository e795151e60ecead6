//! Gallery Core - Remote Source Adapter
//!
//! Typed HTTP operations against the photo API's curated-list and
//! single-item endpoints. The pipelines depend on the [`PhotosApi`]
//! seam; [`PexelsClient`] is the reqwest-backed production adapter.

use std::time::Duration;

use async_trait::async_trait;

use crate::dto::{ErrorResponse, PhotoDto, PhotosResponseDto};
use crate::error::{GalleryError, GalleryResult};
use crate::model::ApiKey;

/// Transport configuration for the remote adapter.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL for all API requests.
    pub base_url: String,
    /// Total request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Socket read timeout.
    pub read_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pexels.com".into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Operations the photo API exposes, parameterized by a rotating
/// credential.
#[async_trait]
pub trait PhotosApi: Send + Sync {
    /// Fetch a page of the curated collection. `page` defaults to the
    /// first page when absent.
    async fn fetch_page(
        &self,
        api_key: &ApiKey,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> GalleryResult<PhotosResponseDto>;

    /// Fetch a single photo by id.
    async fn fetch_photo(&self, api_key: &ApiKey, id: i64) -> GalleryResult<PhotoDto>;
}

/// reqwest-backed implementation of [`PhotosApi`].
pub struct PexelsClient {
    client: reqwest::Client,
    base_url: String,
}

impl PexelsClient {
    pub fn new(config: RemoteConfig) -> GalleryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| GalleryError::Network(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Turn a successful response into `T`, or a failed one into the
    /// structured API error.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> GalleryResult<T> {
        let status = response.status();
        if status.is_success() {
            log::debug!("response: {}", status.as_u16());
            return response
                .json::<T>()
                .await
                .map_err(|e| GalleryError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(parse_error_body(status.as_u16(), &body))
    }
}

#[async_trait]
impl PhotosApi for PexelsClient {
    async fn fetch_page(
        &self,
        api_key: &ApiKey,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> GalleryResult<PhotosResponseDto> {
        let mut query: Vec<(&str, u32)> = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(per_page) = per_page {
            query.push(("per_page", per_page));
        }

        let response = self
            .client
            .get(format!("{}/v1/curated", self.base_url))
            .header(reqwest::header::AUTHORIZATION, api_key.value())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn fetch_photo(&self, api_key: &ApiKey, id: i64) -> GalleryResult<PhotoDto> {
        let response = self
            .client
            .get(format!("{}/v1/photos/{id}", self.base_url))
            .header(reqwest::header::AUTHORIZATION, api_key.value())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

/// Map a non-success response body to a typed API error.
///
/// Prefers the structured `{error, code, status}` shape; falls back to a
/// generic message when the body is not the expected JSON.
fn parse_error_body(status: u16, body: &str) -> GalleryError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed
            .error
            .or(parsed.code)
            .unwrap_or_else(|| "Unknown API Error".to_string()),
        Err(_) => "Failed to parse error response.".to_string(),
    };
    GalleryError::Api { status, message }
}
