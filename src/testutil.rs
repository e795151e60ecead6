//! Shared test fakes and fixture builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::dto::{PhotoDto, PhotoSourceDto, PhotosResponseDto};
use crate::error::{GalleryError, GalleryResult};
use crate::model::ApiKey;
use crate::prefs::SecurePreferences;
use crate::remote::PhotosApi;
use crate::settings::SettingsStore;

/// Scripted [`PhotosApi`] double: responses are queued ahead of time and
/// every call is counted, so tests can assert zero-call invariants.
#[derive(Default)]
pub(crate) struct FakeApi {
    pages: Mutex<VecDeque<GalleryResult<PhotosResponseDto>>>,
    photos: Mutex<VecDeque<GalleryResult<PhotoDto>>>,
    page_calls: AtomicUsize,
    photo_calls: AtomicUsize,
    requested_pages: Mutex<Vec<Option<u32>>>,
    photo_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_page(&self, response: GalleryResult<PhotosResponseDto>) {
        self.pages.lock().push_back(response);
    }

    pub fn queue_photo(&self, response: GalleryResult<PhotoDto>) {
        self.photos.lock().push_back(response);
    }

    pub fn page_call_count(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn photo_call_count(&self) -> usize {
        self.photo_calls.load(Ordering::SeqCst)
    }

    /// The `page` argument of every `fetch_page` call, in order.
    pub fn requested_pages(&self) -> Vec<Option<u32>> {
        self.requested_pages.lock().clone()
    }

    /// Make every `fetch_photo` call block until the returned handle is
    /// notified, so a test can act while the fetch is in flight.
    pub fn gate_photo_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.photo_gate.lock() = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl PhotosApi for FakeApi {
    async fn fetch_page(
        &self,
        _api_key: &ApiKey,
        page: Option<u32>,
        _per_page: Option<u32>,
    ) -> GalleryResult<PhotosResponseDto> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pages.lock().push(page);
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GalleryError::Network("unexpected page call".into())))
    }

    async fn fetch_photo(&self, _api_key: &ApiKey, _id: i64) -> GalleryResult<PhotoDto> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.photo_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.photos
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GalleryError::Network("unexpected photo call".into())))
    }
}

/// A settings store in a fresh temp dir, optionally pre-loaded with a
/// credential. The temp dir must outlive the store.
pub(crate) fn settings_with_key(key: Option<&str>) -> (tempfile::TempDir, Arc<SettingsStore>) {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Arc::new(SecurePreferences::open(dir.path()).unwrap());
    let settings = Arc::new(SettingsStore::with_default(prefs, None));
    if let Some(key) = key {
        settings.save_credential(key).unwrap();
    }
    (dir, settings)
}

pub(crate) fn photo_dto(id: i64, photographer: &str) -> PhotoDto {
    PhotoDto {
        kind: Some("Photo".into()),
        id,
        width: Some(3756),
        height: Some(5627),
        url: Some(format!("https://www.pexels.com/photo/{id}/")),
        photographer: Some(photographer.into()),
        photographer_url: Some("https://www.pexels.com/@divinetechygirl".into()),
        photographer_id: Some(473730),
        avg_color: Some("#82773C".into()),
        src: Some(PhotoSourceDto {
            medium: Some(format!("https://images.pexels.com/{id}/m.jpg")),
            tiny: Some(format!("https://images.pexels.com/{id}/t.jpg")),
            large: Some(format!("https://images.pexels.com/{id}/l.jpg")),
            ..Default::default()
        }),
        liked: Some(false),
        alt: Some("Woman in black blazer".into()),
    }
}

pub(crate) fn page_dto(page: u32, ids: &[i64], has_next: bool) -> PhotosResponseDto {
    PhotosResponseDto {
        page,
        per_page: ids.len() as u32,
        photos: ids
            .iter()
            .map(|&id| photo_dto(id, "Christina Morillo"))
            .collect(),
        total_results: 8000,
        prev_page: (page > 1)
            .then(|| format!("https://api.pexels.com/v1/curated?page={}", page - 1)),
        next_page: has_next
            .then(|| format!("https://api.pexels.com/v1/curated?page={}", page + 1)),
    }
}
