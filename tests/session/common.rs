// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for session tests

use async_trait::async_trait;
use ethers::signers::LocalWallet;
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Signature};
use private_proposals::{CryptoError, RegistryConfig, SessionSigner};
use std::str::FromStr;

pub const REGISTRY: &str = "0x4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67";
pub const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const CAROL_KEY: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub fn wallet(key: &str) -> LocalWallet {
    key.parse().unwrap()
}

pub fn config(chain_id: u64) -> RegistryConfig {
    RegistryConfig::new(chain_id, Address::from_str(REGISTRY).unwrap()).unwrap()
}

/// Wallet that declines every signing request
pub struct RejectingSigner;

#[async_trait]
impl SessionSigner for RejectingSigner {
    fn owner_address(&self) -> Address {
        Address::from_low_u64_be(0x0bad)
    }

    async fn sign_session_request(&self, _request: &TypedData) -> Result<Signature, CryptoError> {
        Err(CryptoError::Signing("user rejected the request".to_string()))
    }
}
