// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proposal Encryption Module
//!
//! Cryptographic primitives for private multisig proposals:
//!
//! - **Keys**: X25519 key import/export behind a swappable curve backend
//! - **ECDH**: static-static X25519 + HKDF-SHA256 key-wrapping keys
//! - **AES-GCM**: AES-256-GCM for proposal content and wrapped content keys
//! - **Envelope**: one ciphertext, one wrapped content key per recipient
//!
//! ## Security Considerations
//!
//! - Confidentiality and integrity of a proposal rest on AES-256-GCM alone
//! - A fresh content key and nonce are drawn for every proposal
//! - Wrapping nonces are random per recipient entry
//! - Private scalars are zeroized when their handle drops
//!
//! ## Protocol Flow
//!
//! 1. Author encodes the proposal canonically
//! 2. Author encrypts it under a random content key
//! 3. For each owner's registered key, author derives a wrapping key with
//!    X25519 + HKDF and wraps the content key
//! 4. Envelope bytes go to chain storage
//! 5. An owner finds the entry for their key, unwraps, decrypts and decodes

pub mod aes_gcm;
pub mod ecdh;
pub mod envelope;
pub mod error;
pub mod keys;

pub use ecdh::derive_wrapping_key;
pub use envelope::{
    decrypt_as_recipient, decrypt_bytes_as_recipient, encrypt_for_recipients, EncryptedEnvelope,
    WrappedKey,
};
pub use error::CryptoError;
pub use keys::{
    default_backend, export_public, import_private, import_private_with, import_public,
    DalekBackend, KeyBackend, KeyPairHandle, PublicKeyHandle, SoftwareBackend,
};
