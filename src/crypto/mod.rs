//! Gallery Core - Cryptographic Core
//!
//! AES-256-GCM encryption for the stored API credential, keyed by a
//! per-alias secret key held in the local key container.

pub mod aead;
pub mod keystore;

pub use aead::*;
pub use keystore::*;
