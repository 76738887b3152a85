// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! X25519 Key Import/Export
//!
//! Bridges raw 32-byte X25519 scalars and public points to the handles used
//! for key agreement. Public-key derivation and Diffie-Hellman go through a
//! [`KeyBackend`], so the session and envelope code never touch a specific
//! curve implementation:
//!
//! - [`DalekBackend`]: `x25519-dalek` static secrets (default)
//! - [`SoftwareBackend`]: plain Montgomery-ladder scalar multiplication from
//!   `curve25519-dalek`, for platforms whose key API cannot derive a public
//!   key from a private scalar
//!
//! Both backends clamp scalars per RFC 7748 and produce identical bytes.

use curve25519_dalek::{constants::X25519_BASEPOINT, montgomery::MontgomeryPoint};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::CryptoError;

/// Size of X25519 private scalars and public keys
pub const X25519_KEY_LEN: usize = 32;

/// Curve operations needed by the session and envelope layers
pub trait KeyBackend: Send + Sync {
    /// Compute the public point for a private scalar
    fn public_from_private(&self, private: &[u8; 32]) -> [u8; 32];

    /// Compute the raw X25519 shared secret
    fn diffie_hellman(&self, private: &[u8; 32], public: &[u8; 32]) -> [u8; 32];
}

/// Backend built on `x25519-dalek`
#[derive(Debug, Default, Clone, Copy)]
pub struct DalekBackend;

impl KeyBackend for DalekBackend {
    fn public_from_private(&self, private: &[u8; 32]) -> [u8; 32] {
        let secret = StaticSecret::from(*private);
        PublicKey::from(&secret).to_bytes()
    }

    fn diffie_hellman(&self, private: &[u8; 32], public: &[u8; 32]) -> [u8; 32] {
        let secret = StaticSecret::from(*private);
        secret.diffie_hellman(&PublicKey::from(*public)).to_bytes()
    }
}

/// Fallback backend doing the scalar multiplication directly
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareBackend;

impl KeyBackend for SoftwareBackend {
    fn public_from_private(&self, private: &[u8; 32]) -> [u8; 32] {
        X25519_BASEPOINT.mul_clamped(*private).to_bytes()
    }

    fn diffie_hellman(&self, private: &[u8; 32], public: &[u8; 32]) -> [u8; 32] {
        MontgomeryPoint(*public).mul_clamped(*private).to_bytes()
    }
}

/// Backend used when callers do not pick one
pub fn default_backend() -> &'static dyn KeyBackend {
    static BACKEND: DalekBackend = DalekBackend;
    &BACKEND
}

/// An X25519 public key supplied by a recipient or read from chain storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyHandle([u8; 32]);

impl PublicKeyHandle {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex with `0x` prefix, as stored in the registry
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for PublicKeyHandle {
    fn from(bytes: [u8; 32]) -> Self {
        PublicKeyHandle(bytes)
    }
}

/// An X25519 key pair usable for agreement
///
/// The private half is zeroized on drop. `exportable` mirrors the
/// extractable flag of platform key APIs: a non-exportable pair still works
/// for agreement but refuses [`KeyPairHandle::export_private`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPairHandle {
    private: [u8; 32],
    #[zeroize(skip)]
    public: PublicKeyHandle,
    #[zeroize(skip)]
    exportable: bool,
}

impl KeyPairHandle {
    pub fn public_key(&self) -> PublicKeyHandle {
        self.public
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    /// Same key pair with the export capability removed
    pub fn into_non_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Raw private scalar, for serialization only
    pub fn export_private(&self) -> Result<[u8; 32], CryptoError> {
        if !self.exportable {
            return Err(CryptoError::NonExportableKey("encryption_private_key"));
        }
        Ok(self.private)
    }

    /// Raw X25519 shared secret with `peer`
    ///
    /// Rejects all-zero outputs, which only occur for low-order peer points.
    pub fn agree(
        &self,
        peer: &PublicKeyHandle,
        backend: &dyn KeyBackend,
    ) -> Result<[u8; 32], CryptoError> {
        let shared = backend.diffie_hellman(&self.private, peer.as_bytes());
        if shared.iter().all(|b| *b == 0) {
            return Err(CryptoError::InvalidPublicKey(peer.to_hex()));
        }
        Ok(shared)
    }
}

impl std::fmt::Debug for KeyPairHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairHandle")
            .field("public", &self.public.to_hex())
            .field("exportable", &self.exportable)
            .finish_non_exhaustive()
    }
}

fn to_key_array(raw: &[u8]) -> Result<[u8; 32], CryptoError> {
    raw.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: X25519_KEY_LEN,
        actual: raw.len(),
    })
}

/// Import a raw private scalar with the default backend
pub fn import_private(raw: &[u8]) -> Result<KeyPairHandle, CryptoError> {
    import_private_with(raw, default_backend())
}

/// Import a raw private scalar, deriving its public key with `backend`
pub fn import_private_with(
    raw: &[u8],
    backend: &dyn KeyBackend,
) -> Result<KeyPairHandle, CryptoError> {
    let private = to_key_array(raw)?;
    let public = PublicKeyHandle(backend.public_from_private(&private));
    Ok(KeyPairHandle {
        private,
        public,
        exportable: true,
    })
}

/// Import a bare 32-byte public key
pub fn import_public(raw: &[u8]) -> Result<PublicKeyHandle, CryptoError> {
    Ok(PublicKeyHandle(to_key_array(raw)?))
}

/// Raw bytes of a public key; inverse of [`import_public`]
pub fn export_public(handle: &PublicKeyHandle) -> [u8; 32] {
    handle.0
}
