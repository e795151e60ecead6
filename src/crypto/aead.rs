//! Gallery Core - AEAD Encryption
//!
//! AES-256-GCM with a fresh random nonce on every call. Encrypting the
//! same plaintext twice never yields the same ciphertext or IV.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::keystore::{SecretKey, NONCE_LEN};
use crate::error::{GalleryError, GalleryResult};

/// Ciphertext plus the IV that produced it.
///
/// The two halves are persisted as separate base64 entries, so there is
/// no packed on-disk framing here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// 12-byte AES-GCM nonce.
    pub iv: Vec<u8>,
    /// Ciphertext with authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// Encrypt data with AES-256-GCM.
pub fn encrypt_aes_gcm(key: &SecretKey, plaintext: &[u8]) -> GalleryResult<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.expose())
        .map_err(|e| GalleryError::Security(format!("Encryption failed: {e}")))?;

    let nonce_bytes = super::keystore::generate_nonce();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| GalleryError::Security(format!("Encryption failed: {e}")))?;

    Ok(EncryptedData {
        iv: nonce_bytes.to_vec(),
        ciphertext,
    })
}

/// Decrypt data with AES-256-GCM.
///
/// A tampered or mismatched (ciphertext, IV) pair fails authentication
/// and returns a security error, never garbage plaintext.
pub fn decrypt_aes_gcm(key: &SecretKey, encrypted: &EncryptedData) -> GalleryResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.expose())
        .map_err(|e| GalleryError::Security(format!("Decryption failed: {e}")))?;

    if encrypted.iv.len() != NONCE_LEN {
        return Err(GalleryError::Security("Decryption failed: invalid IV length".into()));
    }

    let nonce = Nonce::from_slice(&encrypted.iv);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_slice())
        .map_err(|_| GalleryError::Security("Decryption failed: authentication failed".into()))
}
