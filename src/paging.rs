//! Gallery Core - Paginated Fetch Coordinator
//!
//! Drives page-by-page retrieval from the remote adapter, writes each
//! page into the local cache, and computes the next/previous page
//! cursors. Pages are 1-based; the server signals exhaustion through the
//! absence of a next-page indicator, not a numeric cursor.

use std::sync::Arc;

use crate::cache::{PhotoCache, PhotoRow};
use crate::error::{GalleryError, GalleryResult};
use crate::mapper;
use crate::model::Photo;
use crate::remote::PhotosApi;
use crate::settings::SettingsStore;

/// Default number of photos per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One successfully loaded page plus its cursors.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub photos: Vec<Photo>,
    /// `None` at page 1.
    pub prev_key: Option<u32>,
    /// `None` when the server signals no further page.
    pub next_key: Option<u32>,
    pub total_results: i64,
}

/// Per-request load state, for callers that render from snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Fetching,
    Loaded,
    Failed(String),
}

/// Caller-owned pager over the curated collection.
///
/// Holds no persistent state of its own: it is a stateless orchestrator
/// over the settings store, the remote adapter and the cache, plus the
/// in-memory snapshot of pages loaded so far (needed to recompute the
/// anchor page on refresh).
pub struct PhotoPager {
    api: Arc<dyn PhotosApi>,
    settings: Arc<SettingsStore>,
    cache: Arc<PhotoCache>,
    page_size: u32,
    pages: Vec<LoadedPage>,
    /// Absolute index of the last-viewed item across loaded pages.
    anchor: Option<usize>,
    state: LoadState,
}

impl PhotoPager {
    pub fn new(
        api: Arc<dyn PhotosApi>,
        settings: Arc<SettingsStore>,
        cache: Arc<PhotoCache>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            settings,
            cache,
            page_size,
            pages: Vec::new(),
            anchor: None,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn pages(&self) -> &[LoadedPage] {
        &self.pages
    }

    /// Record the last-viewed absolute item position, used to pick the
    /// anchor page on refresh.
    pub fn set_anchor(&mut self, position: usize) {
        self.anchor = Some(position);
    }

    /// Load one page. `key` of `None` means the first page.
    ///
    /// Credential resolution happens before anything else: with no usable
    /// credential the adapter is never invoked. A first-page load clears
    /// the cache before writing, so stale entries from a previous session
    /// cannot leak into positions 1..N. No partial page is ever emitted
    /// or written.
    pub async fn load_page(&self, key: Option<u32>) -> GalleryResult<LoadedPage> {
        let page = key.unwrap_or(1);

        let api_key = self
            .settings
            .get_credential()
            .filter(|k| !k.is_blank())
            .ok_or(GalleryError::CredentialMissing)?;

        let response = self
            .api
            .fetch_page(&api_key, Some(page), Some(self.page_size))
            .await?;
        let loaded = mapper::page_from_dto(response);

        if page == 1 {
            self.cache.clear_all()?;
        }
        let rows: Vec<PhotoRow> = loaded.photos.iter().map(mapper::row_from_photo).collect();
        self.cache.upsert_many(&rows)?;

        log::debug!("loaded page {page} ({} photos)", loaded.photos.len());
        Ok(LoadedPage {
            prev_key: if page == 1 { None } else { Some(page - 1) },
            next_key: if loaded.has_next_page {
                Some(page + 1)
            } else {
                None
            },
            total_results: loaded.total_results,
            photos: loaded.photos,
        })
    }

    /// Load the next page of the stream. Returns `Ok(None)` once the
    /// collection is exhausted. Failures are not auto-retried; the caller
    /// owns the retry affordance.
    pub async fn load_next(&mut self) -> GalleryResult<Option<&LoadedPage>> {
        let key = match self.pages.last() {
            None => None,
            Some(last) => match last.next_key {
                Some(next) => Some(next),
                None => return Ok(None),
            },
        };

        self.state = LoadState::Fetching;
        match self.load_page(key).await {
            Ok(page) => {
                self.state = LoadState::Loaded;
                self.pages.push(page);
                Ok(self.pages.last())
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// The page key to reload from after invalidation: the page closest
    /// to the anchor position, recomputed from its neighbors (`prev + 1`,
    /// else `next - 1`). Never unconditionally page 1.
    pub fn refresh_key(&self) -> Option<u32> {
        let anchor = self.anchor?;
        let page = self.closest_page_to_position(anchor)?;
        page.prev_key
            .map(|prev| prev + 1)
            .or_else(|| page.next_key.map(|next| next - 1))
    }

    /// Invalidate and reload from the recomputed anchor key. Abandons
    /// the previous snapshot wholesale, which is also how an in-flight
    /// load is superseded.
    pub async fn refresh(&mut self) -> GalleryResult<Option<&LoadedPage>> {
        let key = self.refresh_key();
        self.pages.clear();
        self.state = LoadState::Fetching;
        match self.load_page(key).await {
            Ok(page) => {
                self.state = LoadState::Loaded;
                self.pages.push(page);
                Ok(self.pages.last())
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn closest_page_to_position(&self, position: usize) -> Option<&LoadedPage> {
        let mut seen = 0usize;
        for page in &self.pages {
            seen += page.photos.len();
            if position < seen {
                return Some(page);
            }
        }
        self.pages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::sample_row;
    use crate::testutil::{page_dto, settings_with_key, FakeApi};

    fn pager(api: Arc<FakeApi>, with_key: bool) -> (tempfile::TempDir, PhotoPager) {
        let (dir, settings) = settings_with_key(with_key.then_some("testKey123"));
        let cache = Arc::new(PhotoCache::open_in_memory().unwrap());
        (dir, PhotoPager::new(api, settings, cache, 2))
    }

    #[tokio::test]
    async fn test_first_page_with_next_indicator() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        let (_dir, pager) = pager(Arc::clone(&api), true);

        let page = pager.load_page(None).await.unwrap();
        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, Some(2));
        assert_eq!(page.photos.len(), 2);
        assert_eq!(api.requested_pages(), vec![Some(1)]);
    }

    #[tokio::test]
    async fn test_first_page_without_next_indicator() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], false)));
        let (_dir, pager) = pager(api, true);

        let page = pager.load_page(None).await.unwrap();
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_middle_page_keys() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(3, &[5, 6], true)));
        let (_dir, pager) = pager(api, true);

        let page = pager.load_page(Some(3)).await.unwrap();
        assert_eq!(page.prev_key, Some(2));
        assert_eq!(page.next_key, Some(4));
    }

    #[tokio::test]
    async fn test_missing_credential_never_calls_adapter() {
        let api = Arc::new(FakeApi::new());
        let (_dir, pager) = pager(Arc::clone(&api), false);

        let result = pager.load_page(None).await;
        assert!(matches!(result, Err(GalleryError::CredentialMissing)));
        assert_eq!(api.page_call_count(), 0);
    }

    #[tokio::test]
    async fn test_first_page_clears_stale_cache() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        let (_dir, pager) = pager(api, true);

        // Stale entry from a previous session.
        pager.cache.upsert_many(&[sample_row(999)]).unwrap();

        pager.load_page(None).await.unwrap();
        let ids: Vec<i64> = pager.cache.get_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_later_page_keeps_earlier_cache_entries() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(2, &[3, 4], true)));
        let (_dir, pager) = pager(api, true);

        pager.cache.upsert_many(&[sample_row(1)]).unwrap();

        pager.load_page(Some(2)).await.unwrap();
        assert_eq!(pager.cache.count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_network_failure_writes_nothing() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Err(GalleryError::Api {
            status: 500,
            message: "boom".into(),
        }));
        let (_dir, pager) = pager(api, true);
        pager.cache.upsert_many(&[sample_row(1)]).unwrap();

        assert!(pager.load_page(Some(2)).await.is_err());
        // Existing cache untouched, no partial page written.
        assert_eq!(pager.cache.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_next_walks_the_stream() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        api.queue_page(Ok(page_dto(2, &[3, 4], false)));
        let (_dir, mut pager) = pager(Arc::clone(&api), true);

        assert!(pager.load_next().await.unwrap().is_some());
        assert_eq!(*pager.state(), LoadState::Loaded);
        assert!(pager.load_next().await.unwrap().is_some());
        // Exhausted: no further calls are made.
        assert!(pager.load_next().await.unwrap().is_none());
        assert_eq!(api.page_call_count(), 2);
        assert_eq!(api.requested_pages(), vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_load_next_failure_sets_state() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Err(GalleryError::Network("offline".into())));
        let (_dir, mut pager) = pager(api, true);

        assert!(pager.load_next().await.is_err());
        assert!(matches!(pager.state(), LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_refresh_key_from_anchor_prev_plus_one() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        api.queue_page(Ok(page_dto(2, &[3, 4], true)));
        let (_dir, mut pager) = pager(api, true);
        pager.load_next().await.unwrap();
        pager.load_next().await.unwrap();

        // Anchor inside page 2: refresh at prev_key + 1 = 2.
        pager.set_anchor(2);
        assert_eq!(pager.refresh_key(), Some(2));
    }

    #[tokio::test]
    async fn test_refresh_key_from_anchor_next_minus_one() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        let (_dir, mut pager) = pager(api, true);
        pager.load_next().await.unwrap();

        // Page 1 has no prev_key; fall back to next_key - 1 = 1.
        pager.set_anchor(0);
        assert_eq!(pager.refresh_key(), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_reloads_at_anchor_page() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        api.queue_page(Ok(page_dto(2, &[3, 4], true)));
        api.queue_page(Ok(page_dto(2, &[3, 4], true)));
        let (_dir, mut pager) = pager(Arc::clone(&api), true);
        pager.load_next().await.unwrap();
        pager.load_next().await.unwrap();
        pager.set_anchor(3);

        pager.refresh().await.unwrap();
        // The refresh request went to page 2, not back to page 1.
        assert_eq!(api.requested_pages(), vec![Some(1), Some(2), Some(2)]);
        assert_eq!(pager.pages().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_anchor_starts_at_first_page() {
        let api = Arc::new(FakeApi::new());
        api.queue_page(Ok(page_dto(1, &[1, 2], true)));
        let (_dir, mut pager) = pager(Arc::clone(&api), true);

        pager.refresh().await.unwrap();
        assert_eq!(api.requested_pages(), vec![Some(1)]);
    }
}
