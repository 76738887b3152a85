// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use ethers::signers::LocalWallet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::RegistryArgs;
use crate::session::{deserialize_session, RegistrationCommitment, Session};

/// Arguments for session-create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Owner private key (can also be set via PROPOSAL_OWNER_KEY env var)
    #[arg(long, env = "PROPOSAL_OWNER_KEY", hide_env_values = true)]
    pub private_key: String,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Write the serialized session here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for session-recreate command
#[derive(Args, Debug)]
pub struct RecreateArgs {
    /// Owner private key (can also be set via PROPOSAL_OWNER_KEY env var)
    #[arg(long, env = "PROPOSAL_OWNER_KEY", hide_env_values = true)]
    pub private_key: String,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Registered context (32 bytes hex)
    #[arg(long)]
    pub context: String,

    /// Registered public encryption key (32 bytes hex)
    #[arg(long)]
    pub public_key: String,

    /// Write the serialized session here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for session-show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// File holding a serialized session
    #[arg(long)]
    pub session_file: PathBuf,
}

pub(crate) fn parse_wallet(private_key: &str) -> Result<LocalWallet> {
    private_key
        .trim()
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| anyhow!("Invalid private key: {}", e))
}

pub(crate) fn decode_hex(label: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim().trim_start_matches("0x"))
        .with_context(|| format!("{} is not valid hex", label))
}

pub(crate) fn load_session(path: &Path) -> Result<Session> {
    let encoded = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    Ok(deserialize_session(&encoded)?)
}

fn summary(session: &Session) -> serde_json::Value {
    let pending = session.pending_registration().map(|pending| {
        serde_json::json!({
            "owner": pending.owner,
            "relayer": pending.relayer,
            "context": pending.commitment.context_hex(),
            "publicKey": pending.commitment.public_key.to_hex(),
            "signature": format!("0x{}", hex::encode(pending.signature.to_vec())),
        })
    });
    serde_json::json!({
        "owner": session.owner(),
        "chainId": session.chain_id(),
        "registry": session.config().registry_address,
        "context": session.commitment().context_hex(),
        "publicKey": session.public_key().to_hex(),
        "relayer": session.relayer_address(),
        "pendingRegistration": pending,
    })
}

fn emit(session: &Session, out: Option<&Path>) -> Result<()> {
    let encoded = session.serialize()?;
    match out {
        Some(path) => {
            fs::write(path, &encoded)
                .with_context(|| format!("Failed to write session to {}", path.display()))?;
            info!("💾 Session written to {}", path.display());
        }
        None => println!("{}", encoded),
    }
    eprintln!("{}", serde_json::to_string_pretty(&summary(session))?);
    Ok(())
}

pub async fn create(args: CreateArgs) -> Result<()> {
    let config = args.registry.resolve()?;
    let wallet = parse_wallet(&args.private_key)?;

    info!("Creating session on chain {}", config.chain_id);
    let session = Session::create(&wallet, &config)
        .await
        .context("Session creation failed")?;

    emit(&session, args.out.as_deref())
}

pub async fn recreate(args: RecreateArgs) -> Result<()> {
    let config = args.registry.resolve()?;
    let wallet = parse_wallet(&args.private_key)?;
    let known = RegistrationCommitment::from_raw(
        &decode_hex("context", &args.context)?,
        &decode_hex("public key", &args.public_key)?,
    )?;

    info!("Recreating session on chain {}", config.chain_id);
    let session = Session::recreate(&wallet, &config, &known)
        .await
        .context("Session recreation failed")?;

    emit(&session, args.out.as_deref())
}

pub fn show(args: ShowArgs) -> Result<()> {
    let session = load_session(&args.session_file)?;
    println!("{}", serde_json::to_string_pretty(&summary(&session))?);
    Ok(())
}
