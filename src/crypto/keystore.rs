//! Gallery Core - Key Container
//!
//! Per-alias symmetric keys, created lazily on first encrypt and reused
//! afterwards. Keys live in their own directory, are used only for
//! encrypt/decrypt, and never leave this module in plaintext form
//! except through [`SecretKey::expose`].

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, Secret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::aead::{decrypt_aes_gcm, encrypt_aes_gcm, EncryptedData};
use crate::error::{GalleryError, GalleryResult};

/// Key length for AES-256
pub const KEY_LEN: usize = 32;

/// Nonce length for AES-GCM
pub const NONCE_LEN: usize = 12;

/// Secure key wrapper with automatic zeroization
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    inner: Secret<[u8; KEY_LEN]>,
}

impl SecretKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            inner: Secret::new(bytes),
        }
    }

    /// Expose the key bytes (use with caution)
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        self.inner.expose_secret()
    }

    /// Generate a random key
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }
}

/// Generate a random nonce for AES-GCM
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    use rand::RngCore;
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Key container with per-alias get-or-create semantics.
pub struct KeyStore {
    /// Container directory, one `<alias>.key` file per alias.
    root: PathBuf,
}

impl KeyStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn key_path(&self, alias: &str) -> PathBuf {
        self.root.join(format!("{alias}.key"))
    }

    /// Load the key for `alias`, creating a fresh random one if the alias
    /// has never been used.
    fn get_or_create_key(&self, alias: &str) -> GalleryResult<SecretKey> {
        let path = self.key_path(alias);
        if path.exists() {
            return self.load_key(&path);
        }

        let key = SecretKey::generate();
        fs::create_dir_all(&self.root)
            .map_err(|e| GalleryError::Security(format!("Key container unavailable: {e}")))?;
        fs::write(&path, key.expose())
            .map_err(|e| GalleryError::Security(format!("Key container write failed: {e}")))?;
        log::debug!("created key for alias '{alias}'");
        Ok(key)
    }

    /// Load the key for `alias`, failing if it was never created.
    fn existing_key(&self, alias: &str) -> GalleryResult<SecretKey> {
        let path = self.key_path(alias);
        if !path.exists() {
            return Err(GalleryError::Security(format!(
                "No key in container for alias '{alias}'"
            )));
        }
        self.load_key(&path)
    }

    fn load_key(&self, path: &Path) -> GalleryResult<SecretKey> {
        let mut bytes = fs::read(path)
            .map_err(|e| GalleryError::Security(format!("Key container read failed: {e}")))?;
        if bytes.len() != KEY_LEN {
            bytes.zeroize();
            return Err(GalleryError::Security("Corrupted key entry in container".into()));
        }
        let mut raw = [0u8; KEY_LEN];
        raw.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(SecretKey::new(raw))
    }

    /// Encrypt a string value under the key for `alias`.
    ///
    /// Randomized: the same plaintext produces a different ciphertext and
    /// IV on every invocation.
    pub fn encrypt(&self, plaintext: &str, alias: &str) -> GalleryResult<EncryptedData> {
        let key = self.get_or_create_key(alias)?;
        encrypt_aes_gcm(&key, plaintext.as_bytes())
    }

    /// Decrypt a value previously produced by [`encrypt`](Self::encrypt)
    /// for the same alias.
    pub fn decrypt(&self, encrypted: &EncryptedData, alias: &str) -> GalleryResult<String> {
        let key = self.existing_key(alias)?;
        let plaintext = decrypt_aes_gcm(&key, encrypted)?;
        String::from_utf8(plaintext)
            .map_err(|_| GalleryError::Security("Decrypted value is not valid UTF-8".into()))
    }
}
