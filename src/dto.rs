//! Gallery Core - Wire Formats
//!
//! Serde types matching the photo API's JSON bodies.

use serde::Deserialize;

/// Successful response body of `GET /v1/curated`.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotosResponseDto {
    /// Current page number (1-based).
    pub page: u32,
    #[serde(rename = "per_page")]
    pub per_page: u32,
    pub photos: Vec<PhotoDto>,
    #[serde(rename = "total_results")]
    pub total_results: i64,
    /// URL of the previous page, when one exists.
    #[serde(rename = "prev_page", default)]
    pub prev_page: Option<String>,
    /// URL of the next page. Absence means the collection is exhausted.
    #[serde(rename = "next_page", default)]
    pub next_page: Option<String>,
}

/// A single photo object as the API sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoDto {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: i64,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(rename = "photographer_url", default)]
    pub photographer_url: Option<String>,
    #[serde(rename = "photographer_id", default)]
    pub photographer_id: Option<i64>,
    /// Average color as a hex string, e.g. `#82773C`.
    #[serde(rename = "avg_color", default)]
    pub avg_color: Option<String>,
    #[serde(default)]
    pub src: Option<PhotoSourceDto>,
    #[serde(default)]
    pub liked: Option<bool>,
    /// Alternative text description for accessibility.
    #[serde(default)]
    pub alt: Option<String>,
}

/// Per-size source URLs of a photo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoSourceDto {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub large2x: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub portrait: Option<String>,
    #[serde(default)]
    pub landscape: Option<String>,
    #[serde(default)]
    pub tiny: Option<String>,
}

/// Error body the API sends on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
}
