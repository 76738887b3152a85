// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::session::{decode_hex, load_session};
use crate::crypto::{import_public, EncryptedEnvelope, PublicKeyHandle};
use crate::transaction::CanonicalTransaction;

/// Arguments for encrypt command
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// File holding the author's serialized session
    #[arg(long)]
    pub session_file: PathBuf,

    /// Proposal as JSON (camelCase CanonicalTransaction)
    #[arg(long)]
    pub tx: PathBuf,

    /// Comma-separated recipient public keys (32 bytes hex each)
    #[arg(long, value_delimiter = ',', required = true)]
    pub recipients: Vec<String>,

    /// Do not address the author's own key
    #[arg(long)]
    pub exclude_self: bool,

    /// Write the hex envelope here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for decrypt command
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// File holding the reader's serialized session
    #[arg(long)]
    pub session_file: PathBuf,

    /// File holding a hex-encoded envelope
    #[arg(long)]
    pub envelope: PathBuf,
}

fn parse_recipients(values: &[String]) -> Result<Vec<PublicKeyHandle>> {
    values
        .iter()
        .map(|value| Ok(import_public(&decode_hex("recipient", value)?)?))
        .collect()
}

pub fn encrypt(args: EncryptArgs) -> Result<()> {
    let session = load_session(&args.session_file)?;
    let json = fs::read_to_string(&args.tx)
        .with_context(|| format!("Failed to read proposal {}", args.tx.display()))?;
    let tx: CanonicalTransaction =
        serde_json::from_str(&json).context("Proposal is not a valid transaction")?;

    let mut recipients = parse_recipients(&args.recipients)?;
    if !args.exclude_self {
        recipients.push(session.public_key());
    }

    let envelope = session.encrypt_proposal(&tx, &recipients)?;
    let encoded = format!("0x{}", hex::encode(envelope.to_bytes()));

    match &args.out {
        Some(path) => {
            fs::write(path, &encoded)
                .with_context(|| format!("Failed to write envelope to {}", path.display()))?;
            info!("💾 Envelope written to {}", path.display());
        }
        None => println!("{}", encoded),
    }
    Ok(())
}

pub fn decrypt(args: DecryptArgs) -> Result<()> {
    let session = load_session(&args.session_file)?;
    let encoded = fs::read_to_string(&args.envelope)
        .with_context(|| format!("Failed to read envelope {}", args.envelope.display()))?;
    let envelope = EncryptedEnvelope::from_bytes(&decode_hex("envelope", &encoded)?)?;

    info!(
        "Envelope from {} addressed to {} recipients",
        envelope.sender.to_hex(),
        envelope.entries.len()
    );
    let tx = session.decrypt_proposal(&envelope)?;
    println!("{}", serde_json::to_string_pretty(&tx)?);
    Ok(())
}
