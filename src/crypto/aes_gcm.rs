// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-256-GCM Sealing
//!
//! Thin wrappers over `aes-gcm` used both for the proposal ciphertext and for
//! wrapping the per-proposal content key.
//!
//! **Output Format**:
//! ```text
//! [ciphertext (plaintext length) | tag (16 bytes)]
//! ```
//!
//! The 12-byte nonce is carried separately by the envelope.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::CryptoError;

/// AES-GCM nonce size
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag size
pub const TAG_LEN: usize = 16;

/// Fresh random nonce from the OS RNG
pub fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Fresh random 256-bit key from the OS RNG
pub fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

/// Encrypt `plaintext` under `key`, authenticating `aad`
pub fn seal(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::key_derivation("aes_gcm_init", e))?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::key_derivation("aes_gcm_encrypt", e))
}

/// Decrypt and authenticate `ciphertext` (ciphertext || tag)
///
/// `operation` names the failing step in [`CryptoError::AuthenticationFailed`].
pub fn open(
    key: &[u8; 32],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
    operation: &'static str,
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::MalformedEncoding(format!(
            "ciphertext too short: expected at least {} bytes, got {}",
            TAG_LEN,
            ciphertext.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::key_derivation("aes_gcm_init", e))?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailed(operation))
}
