//! Gallery Core - Secure Preferences
//!
//! Dedicated secure-preferences namespace holding the encrypted API
//! credential (ciphertext + IV, both base64) and the one-time
//! "initial seed complete" flag. Values are encrypted through the
//! [`KeyStore`](crate::crypto::KeyStore) before they touch disk; the
//! plaintext credential never does.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::crypto::{EncryptedData, KeyStore};
use crate::error::{GalleryError, GalleryResult};
use crate::model::ApiKey;

/// Alias of the credential key inside the key container.
const API_KEY_ALIAS: &str = "api_key_encryption_key";

/// File name of the preference document.
const PREFS_FILE: &str = "secure_settings.json";

/// Subdirectory of the key container.
const KEYS_DIR: &str = "keys";

/// On-disk shape of the preference document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsDocument {
    /// Base64 of the AES-GCM ciphertext.
    #[serde(default)]
    encrypted_api_key: Option<String>,
    /// Base64 of the IV that produced it.
    #[serde(default)]
    api_key_iv: Option<String>,
    #[serde(default)]
    initial_seed_complete: bool,
}

/// Encrypted preference store with replay-latest observation.
pub struct SecurePreferences {
    path: PathBuf,
    keystore: KeyStore,
    state: Mutex<PrefsDocument>,
    api_key: watch::Sender<Option<ApiKey>>,
    seed_complete: watch::Sender<bool>,
}

impl SecurePreferences {
    /// Open the preference namespace rooted at `dir`.
    ///
    /// An unreadable or corrupted document degrades to empty preferences
    /// instead of failing, so a damaged store behaves like a fresh one.
    pub fn open(dir: &Path) -> GalleryResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(PREFS_FILE);
        let keystore = KeyStore::new(&dir.join(KEYS_DIR));

        let doc = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("corrupted preference document, starting empty: {e}");
                PrefsDocument::default()
            }),
            Err(_) => PrefsDocument::default(),
        };

        let initial_key = Self::decrypt_from(&keystore, &doc);
        let (api_key, _) = watch::channel(initial_key);
        let (seed_complete, _) = watch::channel(doc.initial_seed_complete);

        Ok(Self {
            path,
            keystore,
            state: Mutex::new(doc),
            api_key,
            seed_complete,
        })
    }

    /// Current decrypted credential, or `None` when nothing is stored or
    /// decryption fails. Decryption failure is deliberately swallowed:
    /// a corrupted store must behave like "no credential configured".
    pub fn get_api_key(&self) -> Option<ApiKey> {
        let doc = self.state.lock().clone();
        Self::decrypt_from(&self.keystore, &doc)
    }

    /// Reactive view of the credential.
    pub fn observe_api_key(&self) -> watch::Receiver<Option<ApiKey>> {
        self.api_key.subscribe()
    }

    /// Encrypt and persist the credential.
    ///
    /// Crypto failures surface as the security kind, disk failures as the
    /// storage kind; neither is swallowed on the write path.
    pub fn save_api_key(&self, value: &str) -> GalleryResult<()> {
        let encrypted = self.keystore.encrypt(value, API_KEY_ALIAS)?;

        let mut doc = self.state.lock();
        doc.encrypted_api_key = Some(BASE64.encode(&encrypted.ciphertext));
        doc.api_key_iv = Some(BASE64.encode(&encrypted.iv));
        self.write_document(&doc)?;
        drop(doc);

        self.api_key.send_replace(Some(ApiKey::new(value)));
        Ok(())
    }

    /// Remove the stored credential.
    pub fn clear_api_key(&self) -> GalleryResult<()> {
        let mut doc = self.state.lock();
        doc.encrypted_api_key = None;
        doc.api_key_iv = None;
        self.write_document(&doc)?;
        drop(doc);

        self.api_key.send_replace(None);
        Ok(())
    }

    /// Current value of the one-time seed flag.
    pub fn initial_seed_complete(&self) -> bool {
        self.state.lock().initial_seed_complete
    }

    /// Reactive view of the seed flag.
    pub fn observe_initial_seed_complete(&self) -> watch::Receiver<bool> {
        self.seed_complete.subscribe()
    }

    /// Set the seed flag. Monotonic: nothing ever resets it.
    pub fn set_initial_seed_complete(&self) -> GalleryResult<()> {
        let mut doc = self.state.lock();
        doc.initial_seed_complete = true;
        self.write_document(&doc)?;
        drop(doc);

        self.seed_complete.send_replace(true);
        Ok(())
    }

    fn decrypt_from(keystore: &KeyStore, doc: &PrefsDocument) -> Option<ApiKey> {
        let ciphertext_b64 = doc.encrypted_api_key.as_deref()?;
        let iv_b64 = doc.api_key_iv.as_deref()?;

        let encrypted = EncryptedData {
            ciphertext: BASE64.decode(ciphertext_b64).ok()?,
            iv: BASE64.decode(iv_b64).ok()?,
        };
        match keystore.decrypt(&encrypted, API_KEY_ALIAS) {
            Ok(value) => Some(ApiKey::new(value)),
            Err(e) => {
                log::warn!("credential decryption failed, treating as absent: {e}");
                None
            }
        }
    }

    /// Atomic write: temp file then rename.
    fn write_document(&self, doc: &PrefsDocument) -> GalleryResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| GalleryError::Storage(std::io::Error::other(e)))?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_get() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();

        assert!(prefs.get_api_key().is_none());
        prefs.save_api_key("pexels-key-123").unwrap();
        assert_eq!(prefs.get_api_key().unwrap().value(), "pexels-key-123");
    }

    #[test]
    fn test_value_not_plaintext_on_disk() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();
        prefs.save_api_key("super-secret-credential").unwrap();

        let raw = fs::read_to_string(dir.path().join(PREFS_FILE)).unwrap();
        assert!(!raw.contains("super-secret-credential"));
        assert!(raw.contains("encrypted_api_key"));
        assert!(raw.contains("api_key_iv"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        SecurePreferences::open(dir.path())
            .unwrap()
            .save_api_key("persisted")
            .unwrap();

        let reopened = SecurePreferences::open(dir.path()).unwrap();
        assert_eq!(reopened.get_api_key().unwrap().value(), "persisted");
    }

    #[test]
    fn test_corrupted_document_degrades_to_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PREFS_FILE), b"not json at all").unwrap();

        let prefs = SecurePreferences::open(dir.path()).unwrap();
        assert!(prefs.get_api_key().is_none());
        assert!(!prefs.initial_seed_complete());
    }

    #[test]
    fn test_corrupted_ciphertext_reads_as_absent() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();
        prefs.save_api_key("value").unwrap();

        // Tamper with the stored ciphertext.
        let path = dir.path().join(PREFS_FILE);
        let mut doc: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        doc["encrypted_api_key"] = serde_json::Value::String(BASE64.encode(b"garbage garbage"));
        fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let reopened = SecurePreferences::open(dir.path()).unwrap();
        assert!(reopened.get_api_key().is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();
        prefs.save_api_key("value").unwrap();
        prefs.clear_api_key().unwrap();

        assert!(prefs.get_api_key().is_none());
    }

    #[test]
    fn test_seed_flag_roundtrip() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();
        assert!(!prefs.initial_seed_complete());

        prefs.set_initial_seed_complete().unwrap();
        assert!(prefs.initial_seed_complete());

        let reopened = SecurePreferences::open(dir.path()).unwrap();
        assert!(reopened.initial_seed_complete());
    }

    #[test]
    fn test_observation_replays_and_updates() {
        let dir = tempdir().unwrap();
        let prefs = SecurePreferences::open(dir.path()).unwrap();

        let mut rx = prefs.observe_api_key();
        assert!(rx.borrow_and_update().is_none());

        prefs.save_api_key("observed").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().value(), "observed");
    }
}
