//! Gallery Core - Settings Access
//!
//! Mediates every credential read and write through the secure
//! preference store. Read-path failures degrade to "absent"; write-path
//! failures surface typed, so a silent save failure cannot happen.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{GalleryError, GalleryResult};
use crate::model::{ApiKey, SaveState};
use crate::prefs::SecurePreferences;

/// Build-time default credential, baked in when the crate is compiled
/// with `GALLERY_DEFAULT_API_KEY` set.
const BUILD_DEFAULT_API_KEY: Option<&str> = option_env!("GALLERY_DEFAULT_API_KEY");

/// Credential settings over [`SecurePreferences`].
pub struct SettingsStore {
    prefs: Arc<SecurePreferences>,
    default_credential: Option<String>,
}

impl SettingsStore {
    /// Settings with the build-time default credential for seeding.
    pub fn new(prefs: Arc<SecurePreferences>) -> Self {
        Self::with_default(prefs, BUILD_DEFAULT_API_KEY.map(str::to_owned))
    }

    /// Settings with an explicit seed credential (tests, embedders).
    pub fn with_default(prefs: Arc<SecurePreferences>, default_credential: Option<String>) -> Self {
        Self {
            prefs,
            default_credential,
        }
    }

    /// The stored credential, or `None` when nothing is stored or the
    /// store cannot be decrypted.
    pub fn get_credential(&self) -> Option<ApiKey> {
        self.prefs.get_api_key()
    }

    /// Reactive view of the credential.
    pub fn observe_credential(&self) -> watch::Receiver<Option<ApiKey>> {
        self.prefs.observe_api_key()
    }

    /// True iff a non-blank credential is currently retrievable.
    pub fn has_valid_credential(&self) -> bool {
        self.get_credential().is_some_and(|key| !key.is_blank())
    }

    /// Encrypt and persist a credential. Blank input is rejected before
    /// anything is written.
    pub fn save_credential(&self, value: &str) -> GalleryResult<()> {
        if value.trim().is_empty() {
            return Err(GalleryError::InvalidArgument(
                "API key cannot be blank".into(),
            ));
        }
        self.prefs.save_api_key(value)
    }

    /// Remove the stored credential.
    pub fn clear_credential(&self) -> GalleryResult<()> {
        self.prefs.clear_api_key()
    }

    /// Seed the build-time default credential exactly once.
    ///
    /// Idempotent: the persisted flag guards the whole block, so repeated
    /// app starts neither re-seed nor overwrite a user-provided value.
    /// The flag is set even when no default is configured, to keep later
    /// starts from re-running the check.
    pub fn seed_initial_credential_if_needed(&self) -> GalleryResult<()> {
        if self.prefs.initial_seed_complete() {
            return Ok(());
        }
        if let Some(default) = self.default_credential.as_deref() {
            if !default.trim().is_empty() {
                log::info!("seeding default API credential");
                self.save_credential(default)?;
            }
        }
        self.prefs.set_initial_seed_complete()
    }

    /// Reactive view of the seed flag, consumed by app startup.
    pub fn is_initial_seed_complete(&self) -> watch::Receiver<bool> {
        self.prefs.observe_initial_seed_complete()
    }

    /// Low-level flag setter, exposed for startup wiring.
    pub fn set_initial_seed_complete(&self) -> GalleryResult<()> {
        self.prefs.set_initial_seed_complete()
    }
}

/// Plausibility check for a credential the user typed in: 30 to 80
/// alphanumeric characters.
pub fn is_valid_api_key_format(value: &str) -> bool {
    (30..=80).contains(&value.len()) && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Drives the credential-save state machine for an interactive caller.
///
/// Emits `Idle -> Loading -> {Success | Error}` over a replay-latest
/// channel that the caller renders snapshots from.
pub struct CredentialForm {
    settings: Arc<SettingsStore>,
    state: watch::Sender<SaveState>,
}

impl CredentialForm {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        let current = settings
            .get_credential()
            .map(|key| key.value().to_string())
            .unwrap_or_default();
        let (state, _) = watch::channel(SaveState::Idle(current));
        Self { settings, state }
    }

    pub fn state(&self) -> watch::Receiver<SaveState> {
        self.state.subscribe()
    }

    /// Validate and save. Invalid input short-circuits to `Error` with
    /// no store write.
    pub fn save(&self, value: &str) {
        if value.trim().is_empty() {
            self.state
                .send_replace(SaveState::Error("API key cannot be blank".into()));
            return;
        }
        if !is_valid_api_key_format(value) {
            self.state.send_replace(SaveState::Error(
                "API key must be 30-80 alphanumeric characters".into(),
            ));
            return;
        }

        self.state.send_replace(SaveState::Loading);
        match self.settings.save_credential(value) {
            Ok(()) => {
                self.state.send_replace(SaveState::Success(value.into()));
            }
            Err(e) => {
                self.state.send_replace(SaveState::Error(e.to_string()));
            }
        }
    }

    /// Back to `Idle`, reloading whatever is stored.
    pub fn reset(&self) {
        let current = self
            .settings
            .get_credential()
            .map(|key| key.value().to_string())
            .unwrap_or_default();
        self.state.send_replace(SaveState::Idle(current));
    }
}
