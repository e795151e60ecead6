//! Gallery Core - Domain Models
//!
//! In-memory representations shared by the cache, the remote adapter
//! and the pipelines. Conversions into and out of these types are total:
//! malformed fields degrade to explicit defaults instead of failing.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The API authorization credential.
///
/// Wrapped in [`SecretString`] so the raw value never shows up in debug
/// output or logs.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into()))
    }

    /// The raw credential string, for the `Authorization` header.
    pub fn value(&self) -> &str {
        self.0.expose_secret()
    }

    /// A credential is usable only when it has visible characters.
    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Average color of a photo, packed as 0xAARRGGBB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvgColor(pub u32);

impl AvgColor {
    /// Sentinel used when the server sends no color or an unparsable one.
    pub const LIGHT_GRAY: AvgColor = AvgColor(0xFFCC_CCCC);

    /// Parse a `#RRGGBB` or `#AARRGGBB` hex string.
    ///
    /// Never fails: absent or malformed input maps to [`Self::LIGHT_GRAY`].
    pub fn parse(value: Option<&str>) -> AvgColor {
        let Some(value) = value else {
            return Self::LIGHT_GRAY;
        };
        let Some(hex) = value.strip_prefix('#') else {
            return Self::LIGHT_GRAY;
        };
        match hex.len() {
            6 => u32::from_str_radix(hex, 16)
                .map(|rgb| AvgColor(0xFF00_0000 | rgb))
                .unwrap_or(Self::LIGHT_GRAY),
            8 => u32::from_str_radix(hex, 16)
                .map(AvgColor)
                .unwrap_or(Self::LIGHT_GRAY),
            _ => Self::LIGHT_GRAY,
        }
    }

    /// Render back to the `#AARRGGBB` form used in the cache.
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.0)
    }
}

/// A single photo in the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    /// Unique identifier, stable across wire, cache and domain forms.
    pub id: i64,
    /// Wire-only media type; never persisted.
    pub kind: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// URL to view the photo on the web.
    pub url: Option<String>,
    pub photographer: Option<String>,
    pub photographer_url: Option<String>,
    pub photographer_id: Option<i64>,
    pub avg_color: AvgColor,
    pub thumbnail_url: Option<String>,
    pub tiny_thumbnail_url: Option<String>,
    pub large_image_url: Option<String>,
    /// Present only in the freshest network representation; never persisted.
    pub liked: Option<bool>,
    /// Accessibility description.
    pub alt: Option<String>,
}

/// One loaded page of photos plus its pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPage {
    pub photos: Vec<Photo>,
    pub total_results: i64,
    pub page: u32,
    pub per_page: u32,
    pub has_next_page: bool,
}

/// Result envelope for a single asynchronous value.
///
/// Callers that render UI from state snapshots need the in-flight,
/// completed and failed states to be first-class values.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FetchState::Loading)
    }

    /// Run `action` on the payload of a `Success`, pass everything through.
    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let FetchState::Success(ref value) = self {
            action(value);
        }
        self
    }

    /// Run `action` on the message of an `Error`, pass everything through.
    pub fn on_error(self, action: impl FnOnce(&str)) -> Self {
        if let FetchState::Error(ref message) = self {
            action(message);
        }
        self
    }
}

/// State machine for the credential-save flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveState {
    /// Nothing in flight; carries the currently stored value for editing.
    Idle(String),
    Loading,
    /// The value that was just persisted.
    Success(String),
    Error(String),
}
