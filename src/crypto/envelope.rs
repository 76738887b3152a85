// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-Recipient Proposal Envelope
//!
//! Encrypts one canonical transaction for every owner of an account:
//!
//! 1. Encode the transaction canonically
//! 2. Encrypt it once with a random AES-256-GCM content key
//! 3. For each recipient, X25519 + HKDF-SHA256 with the sender's session key
//!    gives a key-wrapping key, which AES-256-GCM-wraps the content key
//!
//! **Wire Format** (version 1, all integers big-endian):
//! ```text
//! [version (1) | suite (1) | sender_pub (32) | content_nonce (12) | count (2)
//!  | count x (recipient_pub (32) | wrap_nonce (12) | wrapped_key (48))
//!  | ciphertext+tag (rest, >= 16)]
//! ```
//!
//! The content ciphertext authenticates `version || suite || sender_pub` as
//! AAD; each wrapped key authenticates `version || suite || recipient_pub`.

use std::collections::HashSet;

use tracing::{debug, info};

use super::aes_gcm::{self as aead, NONCE_LEN, TAG_LEN};
use super::ecdh::derive_wrapping_key;
use super::keys::{default_backend, KeyBackend, KeyPairHandle, PublicKeyHandle};
use super::CryptoError;
use crate::transaction::{self, CanonicalTransaction};
use crate::version::{ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM, ENVELOPE_VERSION};

/// Size of a wrapped content key: 32-byte key + 16-byte tag
pub const WRAPPED_KEY_LEN: usize = 32 + TAG_LEN;

/// Size of one recipient entry on the wire
pub const RECIPIENT_ENTRY_LEN: usize = 32 + NONCE_LEN + WRAPPED_KEY_LEN;

/// Size of the fixed header before the recipient entries
pub const HEADER_LEN: usize = 1 + 1 + 32 + NONCE_LEN + 2;

/// Content key wrapped for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    pub recipient: PublicKeyHandle,
    pub nonce: [u8; NONCE_LEN],
    pub wrapped_key: [u8; WRAPPED_KEY_LEN],
}

/// Encrypted proposal addressed to a set of recipients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub sender: PublicKeyHandle,
    pub nonce: [u8; NONCE_LEN],
    pub entries: Vec<WrappedKey>,
    pub ciphertext: Vec<u8>,
}

fn content_aad(sender: &PublicKeyHandle) -> Vec<u8> {
    let mut aad = Vec::with_capacity(34);
    aad.push(ENVELOPE_VERSION);
    aad.push(ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM);
    aad.extend_from_slice(sender.as_bytes());
    aad
}

fn wrap_aad(recipient: &PublicKeyHandle) -> Vec<u8> {
    content_aad(recipient)
}

impl EncryptedEnvelope {
    /// Public keys this envelope is addressed to, in wire order
    pub fn recipients(&self) -> impl Iterator<Item = &PublicKeyHandle> {
        self.entries.iter().map(|entry| &entry.recipient)
    }

    /// Serialize to the version 1 wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_LEN + self.entries.len() * RECIPIENT_ENTRY_LEN + self.ciphertext.len(),
        );
        out.push(ENVELOPE_VERSION);
        out.push(ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM);
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            out.extend_from_slice(entry.recipient.as_bytes());
            out.extend_from_slice(&entry.nonce);
            out.extend_from_slice(&entry.wrapped_key);
        }
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the wire format
    ///
    /// Fails with `MalformedEncoding` on an unknown version or suite, a zero
    /// recipient count, truncation, or a ciphertext shorter than one tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::MalformedEncoding(format!(
                "envelope too short: expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != ENVELOPE_VERSION {
            return Err(CryptoError::MalformedEncoding(format!(
                "unsupported envelope version {}",
                bytes[0]
            )));
        }
        if bytes[1] != ENVELOPE_SUITE_X25519_HKDF_SHA256_A256GCM {
            return Err(CryptoError::MalformedEncoding(format!(
                "unsupported envelope suite {}",
                bytes[1]
            )));
        }

        let sender = PublicKeyHandle::from(take_array::<32>(&bytes[2..34]));
        let nonce = take_array::<NONCE_LEN>(&bytes[34..34 + NONCE_LEN]);
        let count = u16::from_be_bytes([bytes[HEADER_LEN - 2], bytes[HEADER_LEN - 1]]) as usize;
        if count == 0 {
            return Err(CryptoError::MalformedEncoding(
                "envelope has no recipients".to_string(),
            ));
        }

        let body_start = HEADER_LEN + count * RECIPIENT_ENTRY_LEN;
        if bytes.len() < body_start + TAG_LEN {
            return Err(CryptoError::MalformedEncoding(format!(
                "envelope truncated: {} recipients need at least {} bytes, got {}",
                count,
                body_start + TAG_LEN,
                bytes.len()
            )));
        }

        let entries = bytes[HEADER_LEN..body_start]
            .chunks_exact(RECIPIENT_ENTRY_LEN)
            .map(|chunk| WrappedKey {
                recipient: PublicKeyHandle::from(take_array::<32>(&chunk[..32])),
                nonce: take_array::<NONCE_LEN>(&chunk[32..32 + NONCE_LEN]),
                wrapped_key: take_array::<WRAPPED_KEY_LEN>(&chunk[32 + NONCE_LEN..]),
            })
            .collect();

        Ok(EncryptedEnvelope {
            sender,
            nonce,
            entries,
            ciphertext: bytes[body_start..].to_vec(),
        })
    }
}

/// Copy a slice whose length the caller has already checked
fn take_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

/// Encrypt `tx` so every key in `recipients` can decrypt it
///
/// Duplicate recipient keys are addressed once, in first-seen order.
pub fn encrypt_for_recipients(
    tx: &CanonicalTransaction,
    sender: &KeyPairHandle,
    recipients: &[PublicKeyHandle],
) -> Result<EncryptedEnvelope, CryptoError> {
    encrypt_for_recipients_with(tx, sender, recipients, default_backend())
}

/// [`encrypt_for_recipients`] with an explicit key backend
pub fn encrypt_for_recipients_with(
    tx: &CanonicalTransaction,
    sender: &KeyPairHandle,
    recipients: &[PublicKeyHandle],
    backend: &dyn KeyBackend,
) -> Result<EncryptedEnvelope, CryptoError> {
    let mut seen = HashSet::new();
    let recipients: Vec<PublicKeyHandle> = recipients
        .iter()
        .copied()
        .filter(|key| seen.insert(*key))
        .collect();
    if recipients.is_empty() {
        return Err(CryptoError::EmptyRecipientSet);
    }
    if recipients.len() > u16::MAX as usize {
        return Err(CryptoError::MalformedEncoding(format!(
            "too many recipients: {} (max {})",
            recipients.len(),
            u16::MAX
        )));
    }

    let plaintext = transaction::encode(tx);
    let content_key = aead::random_key();
    let nonce = aead::random_nonce();
    let sender_public = sender.public_key();
    let ciphertext = aead::seal(&content_key, &nonce, &plaintext, &content_aad(&sender_public))?;

    let mut entries = Vec::with_capacity(recipients.len());
    for recipient in &recipients {
        let wrapping_key = derive_wrapping_key(sender, recipient, true, backend)?;
        let wrap_nonce = aead::random_nonce();
        let wrapped = aead::seal(&wrapping_key, &wrap_nonce, &content_key, &wrap_aad(recipient))?;
        entries.push(WrappedKey {
            recipient: *recipient,
            nonce: wrap_nonce,
            wrapped_key: take_array::<WRAPPED_KEY_LEN>(&wrapped),
        });
    }

    info!(
        "🔐 Proposal sealed for {} recipients ({} plaintext bytes)",
        entries.len(),
        plaintext.len()
    );

    Ok(EncryptedEnvelope {
        sender: sender_public,
        nonce,
        entries,
        ciphertext,
    })
}

/// Decrypt an envelope with the caller's session key
///
/// # Errors
///
/// - `NoMatchingRecipient`: no entry is addressed to `recipient`'s public key
/// - `AuthenticationFailed`: the wrapped key or the ciphertext fails its tag check
/// - `MalformedEncoding` / `InvalidOperation` / `InvalidAddress`: the
///   plaintext is not a canonical transaction
pub fn decrypt_as_recipient(
    envelope: &EncryptedEnvelope,
    recipient: &KeyPairHandle,
) -> Result<CanonicalTransaction, CryptoError> {
    decrypt_as_recipient_with(envelope, recipient, default_backend())
}

/// [`decrypt_as_recipient`] with an explicit key backend
pub fn decrypt_as_recipient_with(
    envelope: &EncryptedEnvelope,
    recipient: &KeyPairHandle,
    backend: &dyn KeyBackend,
) -> Result<CanonicalTransaction, CryptoError> {
    let own_public = recipient.public_key();
    let entry = envelope
        .entries
        .iter()
        .find(|entry| entry.recipient == own_public)
        .ok_or_else(|| CryptoError::NoMatchingRecipient(own_public.to_hex()))?;

    debug!(
        "Opening proposal from sender {} as recipient {}",
        envelope.sender.to_hex(),
        own_public.to_hex()
    );

    let wrapping_key = derive_wrapping_key(recipient, &envelope.sender, false, backend)?;
    let content_key = aead::open(
        &wrapping_key,
        &entry.nonce,
        &entry.wrapped_key,
        &wrap_aad(&own_public),
        "key_unwrap",
    )?;
    let content_key: [u8; 32] = content_key.as_slice().try_into().map_err(|_| {
        CryptoError::MalformedEncoding(format!(
            "unwrapped content key is {} bytes, expected 32",
            content_key.len()
        ))
    })?;

    let plaintext = aead::open(
        &content_key,
        &envelope.nonce,
        &envelope.ciphertext,
        &content_aad(&envelope.sender),
        "content_decrypt",
    )?;

    transaction::decode(&plaintext)
}

/// Parse wire bytes and decrypt in one step
pub fn decrypt_bytes_as_recipient(
    bytes: &[u8],
    recipient: &KeyPairHandle,
) -> Result<CanonicalTransaction, CryptoError> {
    let envelope = EncryptedEnvelope::from_bytes(bytes)?;
    decrypt_as_recipient(&envelope, recipient)
}
