//! Gallery Core - Photo Gallery Data Layer
//!
//! Offline-first data layer for a photo gallery client backed by the
//! Pexels curated-photos API. The crate owns four concerns:
//!
//! - **Credential storage**: the API key lives encrypted at rest
//!   ([`prefs`], [`crypto`]) and is mediated through [`settings`].
//! - **Remote access**: a thin typed adapter over the HTTP API
//!   ([`remote`], [`dto`]).
//! - **Local cache**: a SQLite mirror of every photo seen, with a
//!   reactive view ([`cache`]).
//! - **Coordination**: paginated list loading ([`paging`]) and
//!   cache-then-network single-photo reconciliation ([`detail`]),
//!   composed behind [`repo::GalleryRepo`].

pub mod cache;
pub mod crypto;
pub mod detail;
pub mod dto;
pub mod error;
pub mod mapper;
pub mod model;
pub mod paging;
pub mod prefs;
pub mod remote;
pub mod repo;
pub mod settings;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{PhotoCache, PhotoRow};
pub use detail::DetailPipeline;
pub use error::{GalleryError, GalleryResult};
pub use model::{ApiKey, AvgColor, FetchState, Photo, PhotoPage, SaveState};
pub use paging::{LoadedPage, PhotoPager, DEFAULT_PAGE_SIZE};
pub use remote::{PexelsClient, PhotosApi, RemoteConfig};
pub use repo::{GalleryConfig, GalleryRepo};
pub use settings::{CredentialForm, SettingsStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
