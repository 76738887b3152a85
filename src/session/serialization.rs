// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Serialization
//!
//! A session is stored as a versioned JSON record, base64url-encoded without
//! padding. The record carries both private keys, so the string must be
//! treated as a secret by whoever persists it.
//!
//! Restoring checks that the stored encryption key still derives the stored
//! public key and that a pending registration still verifies; any mismatch
//! is reported as `InvalidSessionEncoding`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{PendingRegistration, RegistrationCommitment, Session};
use crate::config::RegistryConfig;
use crate::crypto::{import_private, CryptoError};
use crate::version::SESSION_ENCODING_VERSION;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SessionRecord {
    version: u8,
    owner: Address,
    config: RegistryConfig,
    encryption_key: String,
    relayer_key: String,
    context: String,
    public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending_signature: Option<String>,
}

fn invalid(reason: impl ToString) -> CryptoError {
    CryptoError::InvalidSessionEncoding(reason.to_string())
}

fn decode_hex32(field: &str, value: &str) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let raw = Zeroizing::new(
        hex::decode(value.trim_start_matches("0x"))
            .map_err(|e| invalid(format!("{}: {}", field, e)))?,
    );
    let array: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| invalid(format!("{}: expected 32 bytes, got {}", field, raw.len())))?;
    Ok(Zeroizing::new(array))
}

/// Encode a session to an opaque string
///
/// # Errors
///
/// `NonExportableKey` when the session's encryption key cannot be exported.
pub fn serialize_session(session: &Session) -> Result<String, CryptoError> {
    let encryption_key = Zeroizing::new(session.encryption.export_private()?);
    let relayer_key = Zeroizing::new(session.relayer.signer().to_bytes().to_vec());

    let record = SessionRecord {
        version: SESSION_ENCODING_VERSION,
        owner: session.owner,
        config: session.config.clone(),
        encryption_key: hex::encode(encryption_key.as_slice()),
        relayer_key: hex::encode(relayer_key.as_slice()),
        context: hex::encode(session.commitment.context),
        public_key: hex::encode(session.commitment.public_key.as_bytes()),
        pending_signature: session
            .pending
            .as_ref()
            .map(|pending| hex::encode(pending.signature.to_vec())),
    };

    let json = Zeroizing::new(
        serde_json::to_vec(&record).map_err(|e| invalid(format!("json encoding: {}", e)))?,
    );
    debug!("Serialized session for {:?}", session.owner);
    Ok(URL_SAFE_NO_PAD.encode(json.as_slice()))
}

/// Restore a session produced by [`serialize_session`]
///
/// The restored session has the same public key, relayer address and
/// commitment as the one that was serialized.
pub fn deserialize_session(encoded: &str) -> Result<Session, CryptoError> {
    let json = Zeroizing::new(
        URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| invalid(format!("base64: {}", e)))?,
    );
    let record: SessionRecord =
        serde_json::from_slice(&json).map_err(|e| invalid(format!("json: {}", e)))?;

    if record.version != SESSION_ENCODING_VERSION {
        return Err(invalid(format!(
            "unsupported version {} (expected {})",
            record.version, SESSION_ENCODING_VERSION
        )));
    }
    record
        .config
        .validate()
        .map_err(|e| invalid(format!("config: {}", e)))?;

    let context = decode_hex32("context", &record.context)?;
    let public_key = decode_hex32("publicKey", &record.public_key)?;
    let commitment = RegistrationCommitment::from_raw(context.as_slice(), public_key.as_slice())
        .map_err(|e| invalid(format!("commitment: {}", e)))?;

    let encryption_key = decode_hex32("encryptionKey", &record.encryption_key)?;
    let encryption = import_private(encryption_key.as_slice())
        .map_err(|e| invalid(format!("encryptionKey: {}", e)))?;
    if encryption.public_key() != commitment.public_key {
        return Err(invalid("encryption key does not match the stored public key"));
    }

    let relayer_key = decode_hex32("relayerKey", &record.relayer_key)?;
    let relayer = LocalWallet::from_bytes(relayer_key.as_slice())
        .map_err(|e| invalid(format!("relayerKey: {}", e)))?
        .with_chain_id(record.config.chain_id);

    let pending = match record.pending_signature {
        Some(signature_hex) => {
            let raw = hex::decode(signature_hex.trim_start_matches("0x"))
                .map_err(|e| invalid(format!("pendingSignature: {}", e)))?;
            let signature = Signature::try_from(raw.as_slice())
                .map_err(|e| invalid(format!("pendingSignature: {}", e)))?;
            let pending = PendingRegistration {
                owner: record.owner,
                commitment,
                relayer: relayer.address(),
                signature,
            };
            pending
                .verify(&record.config)
                .map_err(|e| invalid(format!("pending registration: {}", e)))?;
            Some(pending)
        }
        None => None,
    };

    debug!("Restored session for {:?}", record.owner);
    Ok(Session {
        owner: record.owner,
        config: record.config,
        encryption,
        relayer,
        commitment,
        pending,
    })
}
