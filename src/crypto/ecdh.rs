// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDH Key-Wrapping Key Derivation
//!
//! Static-static X25519 between the proposal author's session key and each
//! recipient's registered key, expanded with HKDF-SHA256 into the AES-256 key
//! that wraps the proposal's content key for that recipient.

use hkdf::Hkdf;
use sha2::Sha256;

use super::keys::{KeyBackend, KeyPairHandle, PublicKeyHandle};
use super::CryptoError;

/// HKDF info label for key-wrapping keys
const KEY_WRAP_INFO: &[u8] = b"private-proposals/key-wrap/v1";

/// Derive the key-wrapping key shared by `own` and `peer`
///
/// The HKDF salt is `sender_public || recipient_public` so both sides get the
/// same key regardless of who calls. `own_is_sender` tells which half of the
/// salt `own` occupies.
///
/// # Example
///
/// ```ignore
/// let kek = derive_wrapping_key(&sender_pair, &recipient_pub, true, backend)?;
/// // recipient side:
/// let kek2 = derive_wrapping_key(&recipient_pair, &sender_pub, false, backend)?;
/// assert_eq!(kek, kek2);
/// ```
pub fn derive_wrapping_key(
    own: &KeyPairHandle,
    peer: &PublicKeyHandle,
    own_is_sender: bool,
    backend: &dyn KeyBackend,
) -> Result<[u8; 32], CryptoError> {
    let shared = own.agree(peer, backend)?;

    let (sender, recipient) = if own_is_sender {
        (own.public_key(), *peer)
    } else {
        (*peer, own.public_key())
    };
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(sender.as_bytes());
    salt[32..].copy_from_slice(recipient.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(Some(&salt), &shared);
    let mut derived_key = [0u8; 32];
    hkdf.expand(KEY_WRAP_INFO, &mut derived_key)?;

    Ok(derived_key)
}
