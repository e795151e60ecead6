//! Gallery Core - Repository Facade
//!
//! Composition root for the data layer. Wires the key container, secure
//! preferences, cache and remote adapter together and exposes the small
//! operation surface the UI layer consumes. No behavior lives in the
//! wiring itself.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::cache::{PhotoCache, PhotoRow};
use crate::detail::DetailPipeline;
use crate::error::GalleryResult;
use crate::model::{ApiKey, FetchState, Photo};
use crate::paging::{PhotoPager, DEFAULT_PAGE_SIZE};
use crate::prefs::SecurePreferences;
use crate::remote::{PexelsClient, PhotosApi, RemoteConfig};
use crate::settings::{CredentialForm, SettingsStore};

/// Where the repository keeps its state and how it reaches the API.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Root directory for the cache database, the secure preferences and
    /// the key container.
    pub data_dir: PathBuf,
    pub remote: RemoteConfig,
    pub page_size: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gallery-core");
        Self {
            data_dir,
            remote: RemoteConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// The data layer's single entry point.
pub struct GalleryRepo {
    api: Arc<dyn PhotosApi>,
    settings: Arc<SettingsStore>,
    cache: Arc<PhotoCache>,
    detail: DetailPipeline,
    page_size: u32,
}

impl GalleryRepo {
    /// Open the repository with the reqwest-backed remote adapter.
    pub fn open(config: GalleryConfig) -> GalleryResult<Self> {
        let prefs = Arc::new(SecurePreferences::open(&config.data_dir.join("settings"))?);
        let settings = Arc::new(SettingsStore::new(prefs));
        let cache = Arc::new(PhotoCache::open(&config.data_dir.join("photos.db"))?);
        let api: Arc<dyn PhotosApi> = Arc::new(PexelsClient::new(config.remote)?);
        Ok(Self::new(api, settings, cache, config.page_size))
    }

    /// Assemble from explicit collaborators (tests, embedders).
    pub fn new(
        api: Arc<dyn PhotosApi>,
        settings: Arc<SettingsStore>,
        cache: Arc<PhotoCache>,
        page_size: u32,
    ) -> Self {
        let detail = DetailPipeline::new(
            Arc::clone(&api),
            Arc::clone(&settings),
            Arc::clone(&cache),
        );
        Self {
            api,
            settings,
            cache,
            detail,
            page_size,
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // PHOTOS
    // ═══════════════════════════════════════════════════════════════

    /// A fresh pager over the curated collection.
    pub fn pager(&self) -> PhotoPager {
        PhotoPager::new(
            Arc::clone(&self.api),
            Arc::clone(&self.settings),
            Arc::clone(&self.cache),
            self.page_size,
        )
    }

    /// Reconciled detail stream for one photo.
    pub fn photo_detail(&self, photo_id: i64) -> mpsc::Receiver<FetchState<Photo>> {
        self.detail.photo_detail(photo_id)
    }

    /// Reactive view of the cached records, ordered by id descending.
    pub fn observe_photos(&self) -> watch::Receiver<Vec<PhotoRow>> {
        self.cache.observe_all()
    }

    // ═══════════════════════════════════════════════════════════════
    // SETTINGS
    // ═══════════════════════════════════════════════════════════════

    pub fn get_credential(&self) -> Option<ApiKey> {
        self.settings.get_credential()
    }

    pub fn save_credential(&self, value: &str) -> GalleryResult<()> {
        self.settings.save_credential(value)
    }

    pub fn observe_credential(&self) -> watch::Receiver<Option<ApiKey>> {
        self.settings.observe_credential()
    }

    pub fn has_valid_credential(&self) -> bool {
        self.settings.has_valid_credential()
    }

    pub fn clear_credential(&self) -> GalleryResult<()> {
        self.settings.clear_credential()
    }

    /// Drop every cached record.
    pub fn clear_cache(&self) -> GalleryResult<()> {
        self.cache.clear_all()
    }

    pub fn seed_initial_credential_if_needed(&self) -> GalleryResult<()> {
        self.settings.seed_initial_credential_if_needed()
    }

    /// Interactive save state machine for the settings screen.
    pub fn credential_form(&self) -> CredentialForm {
        CredentialForm::new(Arc::clone(&self.settings))
    }
}
