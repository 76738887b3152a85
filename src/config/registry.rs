// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::debug;

use crate::crypto::CryptoError;

/// EIP-712 domain name used when the environment does not override it
pub const DEFAULT_DOMAIN_NAME: &str = "PrivateProposals";

/// EIP-712 domain version used when the environment does not override it
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

/// Deployment the session keys are scoped to
///
/// The chain id and registry address form the EIP-712 domain of the session
/// request, so one wallet derives different keys per deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    pub chain_id: u64,
    pub registry_address: Address,
    pub domain_name: String,
    pub domain_version: String,
}

impl RegistryConfig {
    pub fn new(chain_id: u64, registry_address: Address) -> Result<Self, CryptoError> {
        let config = RegistryConfig {
            chain_id,
            registry_address,
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            domain_version: DEFAULT_DOMAIN_VERSION.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `PROPOSAL_*` environment variables (and `.env` if present)
    ///
    /// - `PROPOSAL_CHAIN_ID` (required)
    /// - `PROPOSAL_REGISTRY_ADDRESS` (required)
    /// - `PROPOSAL_DOMAIN_NAME` (default `PrivateProposals`)
    /// - `PROPOSAL_DOMAIN_VERSION` (default `1`)
    pub fn from_env() -> Result<Self, CryptoError> {
        dotenv::dotenv().ok();

        let chain_id = env::var("PROPOSAL_CHAIN_ID")
            .map_err(|_| CryptoError::Config("PROPOSAL_CHAIN_ID not set".to_string()))?;
        let chain_id = chain_id.trim().parse::<u64>().map_err(|e| {
            CryptoError::Config(format!("PROPOSAL_CHAIN_ID is not a number: {}", e))
        })?;

        let registry = env::var("PROPOSAL_REGISTRY_ADDRESS")
            .map_err(|_| CryptoError::Config("PROPOSAL_REGISTRY_ADDRESS not set".to_string()))?;
        let registry_address = Address::from_str(registry.trim()).map_err(|e| {
            CryptoError::Config(format!("PROPOSAL_REGISTRY_ADDRESS is invalid: {}", e))
        })?;

        let config = RegistryConfig {
            chain_id,
            registry_address,
            domain_name: env::var("PROPOSAL_DOMAIN_NAME")
                .unwrap_or_else(|_| DEFAULT_DOMAIN_NAME.to_string()),
            domain_version: env::var("PROPOSAL_DOMAIN_VERSION")
                .unwrap_or_else(|_| DEFAULT_DOMAIN_VERSION.to_string()),
        };
        config.validate()?;

        debug!(
            "Registry config loaded: chain {} registry {:?}",
            config.chain_id, config.registry_address
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.chain_id == 0 {
            return Err(CryptoError::Config("chain id must be non-zero".to_string()));
        }
        if self.registry_address == Address::zero() {
            return Err(CryptoError::Config(
                "registry address must not be the zero address".to_string(),
            ));
        }
        if self.domain_name.is_empty() || self.domain_version.is_empty() {
            return Err(CryptoError::Config(
                "EIP-712 domain name and version must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Same registry on a different chain
    pub fn with_chain_id(&self, chain_id: u64) -> Result<Self, CryptoError> {
        let config = RegistryConfig {
            chain_id,
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }
}
