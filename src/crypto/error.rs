// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! One error type for every session, codec and envelope operation. All
//! variants are deterministic validation failures: nothing in this crate is
//! retried, and no failure is downgraded to a default value.
//!
//! ## Error Variants
//!
//! - **InvalidKeyLength**: raw key material was not exactly 32 bytes
//! - **InvalidContext**: a registration context is malformed or does not
//!   reproduce the registered public key
//! - **MalformedEncoding**: bytes are not a canonical transaction or envelope
//! - **InvalidOperation**: operation field is neither `0` (call) nor `1` (delegate call)
//! - **InvalidAddress**: an address field is not 20 bytes
//! - **NoMatchingRecipient**: the envelope holds no wrapped key for the caller
//! - **AuthenticationFailed**: an AES-GCM tag did not verify
//! - **NonExportableKey**: a key handle refused export during serialization
//! - **InvalidSessionEncoding**: a persisted session blob could not be restored
//!
//! ## Usage Example
//!
//! ```rust
//! use private_proposals::crypto::CryptoError;
//!
//! fn check_key(raw: &[u8]) -> Result<(), CryptoError> {
//!     if raw.len() != 32 {
//!         return Err(CryptoError::InvalidKeyLength {
//!             expected: 32,
//!             actual: raw.len(),
//!         });
//!     }
//!     Ok(())
//! }
//! # assert!(check_key(&[0u8; 31]).is_err());
//! ```

use thiserror::Error;

/// Error type for all session, codec and envelope operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Raw key material had the wrong size
    #[error("Invalid key length: expected {expected} bytes, got {actual} bytes")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Registration context is malformed, or re-derivation from it does not
    /// match the registered public key (tampered or stale registry record)
    #[error("Invalid registration context: {0}")]
    InvalidContext(String),

    /// Input is not a canonical encoding of the expected structure
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Operation field decoded to something other than call (0) or delegate call (1)
    #[error("Invalid operation: expected 0 or 1, got {0}")]
    InvalidOperation(String),

    /// An address field was not exactly 20 bytes
    #[error("Invalid address in field '{field}': expected 20 bytes, got {actual} bytes")]
    InvalidAddress { field: &'static str, actual: usize },

    /// The envelope carries no wrapped key addressed to the caller's public key
    #[error("No wrapped key in envelope matches recipient {0}")]
    NoMatchingRecipient(String),

    /// AES-GCM authentication failed (tampered data or wrong key)
    #[error("Authentication failed during {0}")]
    AuthenticationFailed(&'static str),

    /// A key handle was created non-exportable and cannot be serialized
    #[error("Key '{0}' is not exportable")]
    NonExportableKey(&'static str),

    /// Persisted session blob is malformed
    #[error("Invalid session encoding: {0}")]
    InvalidSessionEncoding(String),

    /// Encryption was requested for an empty recipient set
    #[error("Recipient set is empty")]
    EmptyRecipientSet,

    /// X25519 agreement with this public key is not contributory (low-order point)
    #[error("Invalid public key {0}: key agreement is not contributory")]
    InvalidPublicKey(String),

    /// The signing collaborator failed or returned an unusable signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// HKDF expansion or key construction failed
    #[error("Key derivation failed during {operation}: {reason}")]
    KeyDerivation {
        operation: &'static str,
        reason: String,
    },

    /// Registry configuration is missing or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CryptoError {
    pub(crate) fn key_derivation(operation: &'static str, reason: impl ToString) -> Self {
        CryptoError::KeyDerivation {
            operation,
            reason: reason.to_string(),
        }
    }
}

impl From<hkdf::InvalidLength> for CryptoError {
    fn from(err: hkdf::InvalidLength) -> Self {
        CryptoError::key_derivation("hkdf_expand", err)
    }
}
