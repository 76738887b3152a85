// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Request Signing
//!
//! The wallet signs an EIP-712 message whose domain names the registry
//! contract and chain id. The resulting signature bytes are the seed every
//! session key is derived from, so a wallet gets unrelated keys on every
//! `(registry, chain)` deployment.
//!
//! ## Typed Data
//!
//! ```text
//! domain:  { name, version, chainId, verifyingContract = registry }
//! SessionRequest(address owner, string purpose)
//! Registration(address owner, bytes32 context, bytes32 publicKey)
//! ```
//!
//! `SessionRequest` is signed by the owner wallet and never leaves the
//! process. `Registration` is signed by the session's relaying key and is
//! handed to the relaying collaborator.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::{Eip712, TypedData};
use ethers::types::{Address, Signature, H256};
use serde_json::json;

use super::RegistrationCommitment;
use crate::config::RegistryConfig;
use crate::crypto::CryptoError;

/// Fixed purpose string shown to the user by their wallet
pub const SESSION_REQUEST_PURPOSE: &str =
    "Unlock private proposals. Only sign this message on an app you trust.";

/// Wallet able to sign the session request
///
/// Any deterministic signer works (RFC 6979 ECDSA wallets are); a signer
/// that produces a different signature each time cannot recreate sessions.
#[async_trait]
pub trait SessionSigner: Send + Sync {
    /// Address of the owner the session belongs to
    fn owner_address(&self) -> Address;

    /// Sign an EIP-712 payload
    async fn sign_session_request(&self, request: &TypedData) -> Result<Signature, CryptoError>;
}

#[async_trait]
impl SessionSigner for LocalWallet {
    fn owner_address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_session_request(&self, request: &TypedData) -> Result<Signature, CryptoError> {
        Signer::sign_typed_data(self, request)
            .await
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }
}

fn domain_json(config: &RegistryConfig) -> serde_json::Value {
    json!({
        "name": config.domain_name,
        "version": config.domain_version,
        "chainId": config.chain_id,
        "verifyingContract": config.registry_address,
    })
}

fn domain_types() -> serde_json::Value {
    json!([
        { "name": "name", "type": "string" },
        { "name": "version", "type": "string" },
        { "name": "chainId", "type": "uint256" },
        { "name": "verifyingContract", "type": "address" },
    ])
}

fn to_typed_data(value: serde_json::Value) -> Result<TypedData, CryptoError> {
    serde_json::from_value(value).map_err(|e| CryptoError::Signing(format!("typed data: {}", e)))
}

/// Session request the owner wallet signs to obtain the derivation seed
pub fn session_request(config: &RegistryConfig, owner: Address) -> Result<TypedData, CryptoError> {
    to_typed_data(json!({
        "types": {
            "EIP712Domain": domain_types(),
            "SessionRequest": [
                { "name": "owner", "type": "address" },
                { "name": "purpose", "type": "string" },
            ],
        },
        "primaryType": "SessionRequest",
        "domain": domain_json(config),
        "message": {
            "owner": owner,
            "purpose": SESSION_REQUEST_PURPOSE,
        },
    }))
}

/// Registration message the relaying key signs for a fresh commitment
pub fn registration_request(
    config: &RegistryConfig,
    owner: Address,
    commitment: &RegistrationCommitment,
) -> Result<TypedData, CryptoError> {
    to_typed_data(json!({
        "types": {
            "EIP712Domain": domain_types(),
            "Registration": [
                { "name": "owner", "type": "address" },
                { "name": "context", "type": "bytes32" },
                { "name": "publicKey", "type": "bytes32" },
            ],
        },
        "primaryType": "Registration",
        "domain": domain_json(config),
        "message": {
            "owner": owner,
            "context": format!("0x{}", hex::encode(commitment.context)),
            "publicKey": commitment.public_key.to_hex(),
        },
    }))
}

/// EIP-712 digest of a typed-data payload
pub fn typed_data_digest(payload: &TypedData) -> Result<H256, CryptoError> {
    payload
        .encode_eip712()
        .map(H256::from)
        .map_err(|e| CryptoError::Signing(format!("eip712 encoding: {}", e)))
}

/// Recover the address that signed `payload`
pub fn recover_signer(payload: &TypedData, signature: &Signature) -> Result<Address, CryptoError> {
    let digest = typed_data_digest(payload)?;
    signature
        .recover(digest)
        .map_err(|e| CryptoError::Signing(format!("signature recovery: {}", e)))
}
