//! Gallery Core - Error Types

use thiserror::Error;

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Gallery error types
#[derive(Error, Debug)]
pub enum GalleryError {
    // ═══════════════════════════════════════════════════════════════
    // CREDENTIAL ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("API key not found")]
    CredentialMissing,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ═══════════════════════════════════════════════════════════════
    // CRYPTO / STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Security failure: {0}")]
    Security(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    // ═══════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Network error: {0}")]
    Network(String),

    #[error("API Error: {message} (Status: {status})")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl GalleryError {
    /// True for errors the caller may resolve by retrying the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GalleryError::Network(_) | GalleryError::Api { .. })
    }

    /// True for errors that should be surfaced to the user as a
    /// credential problem rather than a transient failure.
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self,
            GalleryError::CredentialMissing | GalleryError::Api { status: 401 | 403, .. }
        )
    }
}

impl From<rusqlite::Error> for GalleryError {
    fn from(e: rusqlite::Error) -> Self {
        GalleryError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(e: serde_json::Error) -> Self {
        GalleryError::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for GalleryError {
    fn from(e: reqwest::Error) -> Self {
        GalleryError::Network(e.to_string())
    }
}
