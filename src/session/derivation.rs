// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Key Derivation
//!
//! Both session keys come from HKDF-SHA256 with the wallet signature as input
//! keying material and the registration context as salt. Distinct `info`
//! labels keep the encryption key and the relaying key independent.

use ethers::signers::{LocalWallet, Signer};
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroize;

use crate::crypto::{import_private, CryptoError, KeyPairHandle};

pub const CONTEXT_LEN: usize = 32;

const ENCRYPTION_KEY_INFO: &[u8] = b"private-proposals/encryption-key/v1";
const RELAYER_KEY_INFO: &[u8] = b"private-proposals/relayer-key/v1";

/// Fresh random registration context
///
/// Never all-zero: a zero context marks "no registration" on chain.
pub fn random_context() -> [u8; CONTEXT_LEN] {
    let mut context = [0u8; CONTEXT_LEN];
    loop {
        OsRng.fill_bytes(&mut context);
        if context.iter().any(|b| *b != 0) {
            return context;
        }
    }
}

fn expand(seed: &[u8], context: &[u8; CONTEXT_LEN], info: &[u8]) -> Result<[u8; 32], CryptoError> {
    if seed.is_empty() {
        return Err(CryptoError::key_derivation("hkdf", "empty seed"));
    }
    let hk = Hkdf::<Sha256>::new(Some(context), seed);
    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm)?;
    Ok(okm)
}

/// X25519 encryption key for `(seed, context)`
pub fn derive_encryption_key(
    seed: &[u8],
    context: &[u8; CONTEXT_LEN],
) -> Result<KeyPairHandle, CryptoError> {
    let mut okm = expand(seed, context, ENCRYPTION_KEY_INFO)?;
    let handle = import_private(&okm);
    okm.zeroize();

    let handle = handle?;
    debug!("Derived encryption key {}", handle.public_key().to_hex());
    Ok(handle)
}

/// secp256k1 relaying wallet for `(seed, context)`, bound to `chain_id`
///
/// HKDF output outside the curve order is skipped by appending a counter
/// byte to the label; the first valid scalar wins.
pub fn derive_relayer_wallet(
    seed: &[u8],
    context: &[u8; CONTEXT_LEN],
    chain_id: u64,
) -> Result<LocalWallet, CryptoError> {
    for counter in 0u8..=u8::MAX {
        let mut info = RELAYER_KEY_INFO.to_vec();
        info.push(counter);

        let mut okm = expand(seed, context, &info)?;
        let wallet = LocalWallet::from_bytes(&okm);
        okm.zeroize();

        if let Ok(wallet) = wallet {
            debug!("Derived relayer address {:?} (counter {})", wallet.address(), counter);
            return Ok(wallet.with_chain_id(chain_id));
        }
    }

    Err(CryptoError::key_derivation(
        "relayer_key",
        "no valid secp256k1 scalar in 256 attempts",
    ))
}
