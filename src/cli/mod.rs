// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod proposal;
pub mod session;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use ethers::types::Address;
use std::str::FromStr;

use crate::config::RegistryConfig;

/// Private proposals CLI
#[derive(Parser, Debug)]
#[command(name = "proposal-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Offline tools for private multisig proposals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive a new session and print its pending registration
    SessionCreate(session::CreateArgs),

    /// Re-derive a registered session from its context and public key
    SessionRecreate(session::RecreateArgs),

    /// Show the public parts of a stored session
    SessionShow(session::ShowArgs),

    /// Encrypt a proposal for a set of registered keys
    Encrypt(proposal::EncryptArgs),

    /// Decrypt a proposal envelope with a stored session
    Decrypt(proposal::DecryptArgs),

    /// Print version and supported features
    Version,
}

/// Registry deployment selection shared by session commands
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Chain ID the registry lives on (falls back to PROPOSAL_CHAIN_ID)
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Registry contract address (falls back to PROPOSAL_REGISTRY_ADDRESS)
    #[arg(long)]
    pub registry: Option<String>,
}

impl RegistryArgs {
    pub fn resolve(&self) -> Result<RegistryConfig> {
        match (self.chain_id, &self.registry) {
            (Some(chain_id), Some(registry)) => {
                let registry = Address::from_str(registry)
                    .map_err(|e| anyhow!("Invalid registry address {}: {}", registry, e))?;
                Ok(RegistryConfig::new(chain_id, registry)?)
            }
            (None, None) => {
                RegistryConfig::from_env().context("Failed to load registry config from env")
            }
            _ => Err(anyhow!("--chain-id and --registry must be given together")),
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::SessionCreate(args) => session::create(args).await,
        Commands::SessionRecreate(args) => session::recreate(args).await,
        Commands::SessionShow(args) => session::show(args),
        Commands::Encrypt(args) => proposal::encrypt(args),
        Commands::Decrypt(args) => proposal::decrypt(args),
        Commands::Version => {
            println!("{}", serde_json::to_string_pretty(&crate::version::get_version_info())?);
            Ok(())
        }
    }
}
