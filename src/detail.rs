//! Gallery Core - Detail Reconciliation Pipeline
//!
//! Single-photo fetch with cache-first, network-refresh semantics. The
//! caller gets an ordered stream of [`FetchState`] emissions: something
//! to show fast (the cached record), converging to the authoritative
//! network result, with exactly one terminal emission on every branch.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::cache::PhotoCache;
use crate::error::GalleryError;
use crate::mapper;
use crate::model::{FetchState, Photo};
use crate::remote::PhotosApi;
use crate::settings::SettingsStore;

/// Terminal message when neither a credential nor cached data exists.
const NO_KEY_NO_CACHE: &str = "API key not found and no cached data available.";

/// Fallback when a failure carries no message of its own.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Cache-then-network reconciliation for single photos.
pub struct DetailPipeline {
    api: Arc<dyn PhotosApi>,
    settings: Arc<SettingsStore>,
    cache: Arc<PhotoCache>,
}

impl DetailPipeline {
    pub fn new(
        api: Arc<dyn PhotosApi>,
        settings: Arc<SettingsStore>,
        cache: Arc<PhotoCache>,
    ) -> Self {
        Self {
            api,
            settings,
            cache,
        }
    }

    /// Start one reconciliation for `photo_id`.
    ///
    /// Emission order, depending on what is available:
    /// cache + network ok: `Loading, Success(cached), Success(fresh)`;
    /// cache + network down: `Loading, Success(cached)`;
    /// no cache + network ok: `Loading, Success(fresh)`;
    /// no cache + network down: `Loading, Error(..)`.
    ///
    /// Dropping the receiver cancels the invocation cooperatively; a
    /// cancelled run never writes to the cache. Starting a new invocation
    /// and dropping the old receiver is how a caller supersedes an
    /// in-flight load.
    pub fn photo_detail(&self, photo_id: i64) -> mpsc::Receiver<FetchState<Photo>> {
        let (tx, rx) = mpsc::channel(4);
        let api = Arc::clone(&self.api);
        let settings = Arc::clone(&self.settings);
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            run(api, settings, cache, photo_id, tx).await;
        });

        rx
    }
}

async fn run(
    api: Arc<dyn PhotosApi>,
    settings: Arc<SettingsStore>,
    cache: Arc<PhotoCache>,
    photo_id: i64,
    tx: mpsc::Sender<FetchState<Photo>>,
) {
    if tx.send(FetchState::Loading).await.is_err() {
        return;
    }

    // One cache read, held for the whole invocation.
    let cached: Option<Photo> = match cache.get_by_id(photo_id) {
        Ok(row) => row.map(mapper::photo_from_row),
        Err(e) => {
            log::warn!("cache read for photo {photo_id} failed: {e}");
            None
        }
    };

    // Emit cached data first, if available.
    if let Some(photo) = cached.clone() {
        if tx.send(FetchState::Success(photo)).await.is_err() {
            return;
        }
    }

    // Refresh from the network for the latest data.
    let Some(api_key) = settings.get_credential().filter(|k| !k.is_blank()) else {
        // The cached emission above already covered the cache-present
        // branch; only the empty-handed case needs a terminal error.
        if cached.is_none() {
            let _ = tx.send(FetchState::Error(NO_KEY_NO_CACHE.into())).await;
        }
        return;
    };

    let fresh = match api.fetch_photo(&api_key, photo_id).await {
        Ok(dto) => mapper::photo_from_dto(dto),
        Err(e) => {
            // Network failure is invisible when the cache covered it.
            if cached.is_none() {
                let _ = tx.send(FetchState::Error(failure_message(&e))).await;
            }
            return;
        }
    };

    // A receiver dropped while the fetch was in flight must not have
    // its result written behind its back.
    if tx.is_closed() {
        return;
    }

    // Persist, then emit the reconciled record as read back from the
    // store, falling back to the freshly normalized one so the terminal
    // emission is never skipped.
    if let Err(e) = cache.upsert_many(&[mapper::row_from_photo(&fresh)]) {
        if cached.is_none() {
            let _ = tx.send(FetchState::Error(failure_message(&e))).await;
        }
        return;
    }
    let reconciled = match cache.get_by_id(photo_id) {
        Ok(Some(row)) => mapper::photo_from_row(row),
        _ => fresh,
    };
    let _ = tx.send(FetchState::Success(reconciled)).await;
}

fn failure_message(e: &GalleryError) -> String {
    match e {
        GalleryError::Network(m) if m.trim().is_empty() => UNKNOWN_ERROR.into(),
        other => other.to_string(),
    }
}
