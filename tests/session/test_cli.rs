// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end run of the CLI commands against temp files

use super::common::{ALICE_KEY, BOB_KEY, CAROL_KEY, REGISTRY};
use ethers::types::{Address, Bytes, U256};
use private_proposals::cli::proposal::{self, DecryptArgs, EncryptArgs};
use private_proposals::cli::session::{self, CreateArgs, RecreateArgs, ShowArgs};
use private_proposals::cli::RegistryArgs;
use private_proposals::crypto::decrypt_bytes_as_recipient;
use private_proposals::{deserialize_session, CanonicalTransaction, CryptoError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn registry_args() -> RegistryArgs {
    RegistryArgs {
        chain_id: Some(84532),
        registry: Some(REGISTRY.to_string()),
    }
}

async fn create_session(dir: &Path, name: &str, key: &str) -> std::path::PathBuf {
    let out = dir.join(name);
    session::create(CreateArgs {
        private_key: format!("0x{}", key),
        registry: registry_args(),
        out: Some(out.clone()),
    })
    .await
    .unwrap();
    out
}

#[tokio::test]
async fn test_create_show_encrypt_decrypt() {
    let dir = TempDir::new().unwrap();
    let alice_file = create_session(dir.path(), "alice.session", ALICE_KEY).await;
    let bob_file = create_session(dir.path(), "bob.session", BOB_KEY).await;
    let carol_file = create_session(dir.path(), "carol.session", CAROL_KEY).await;

    session::show(ShowArgs {
        session_file: alice_file.clone(),
    })
    .unwrap();

    let bob = deserialize_session(&fs::read_to_string(&bob_file).unwrap()).unwrap();
    let carol = deserialize_session(&fs::read_to_string(&carol_file).unwrap()).unwrap();

    let tx = CanonicalTransaction::call(
        Address::from_low_u64_be(0x5afe),
        U256::from(42u64),
        Bytes::from(vec![0x01, 0x02]),
    );
    let tx_file = dir.path().join("tx.json");
    fs::write(&tx_file, serde_json::to_string(&tx).unwrap()).unwrap();

    let envelope_file = dir.path().join("proposal.hex");
    proposal::encrypt(EncryptArgs {
        session_file: alice_file.clone(),
        tx: tx_file,
        recipients: vec![bob.public_key().to_hex()],
        exclude_self: false,
        out: Some(envelope_file.clone()),
    })
    .unwrap();

    let encoded = fs::read_to_string(&envelope_file).unwrap();
    let bytes = hex::decode(encoded.trim_start_matches("0x")).unwrap();
    assert_eq!(
        decrypt_bytes_as_recipient(&bytes, bob.encryption_key()).unwrap(),
        tx
    );
    assert!(matches!(
        decrypt_bytes_as_recipient(&bytes, carol.encryption_key()),
        Err(CryptoError::NoMatchingRecipient(_))
    ));

    // Author key is addressed unless --exclude-self
    proposal::decrypt(DecryptArgs {
        session_file: alice_file,
        envelope: envelope_file.clone(),
    })
    .unwrap();
    assert!(proposal::decrypt(DecryptArgs {
        session_file: carol_file,
        envelope: envelope_file,
    })
    .is_err());
}

#[tokio::test]
async fn test_recreate_command_matches_created_session() {
    let dir = TempDir::new().unwrap();
    let created_file = create_session(dir.path(), "created.session", ALICE_KEY).await;
    let created = deserialize_session(&fs::read_to_string(&created_file).unwrap()).unwrap();

    let recreated_file = dir.path().join("recreated.session");
    session::recreate(RecreateArgs {
        private_key: ALICE_KEY.to_string(),
        registry: registry_args(),
        context: created.commitment().context_hex(),
        public_key: created.public_key().to_hex(),
        out: Some(recreated_file.clone()),
    })
    .await
    .unwrap();

    let recreated = deserialize_session(&fs::read_to_string(&recreated_file).unwrap()).unwrap();
    assert_eq!(recreated.public_key(), created.public_key());
    assert_eq!(recreated.relayer_address(), created.relayer_address());
}

#[tokio::test]
async fn test_bad_private_key_rejected() {
    let dir = TempDir::new().unwrap();
    let result = session::create(CreateArgs {
        private_key: "not-a-key".to_string(),
        registry: registry_args(),
        out: Some(dir.path().join("x.session")),
    })
    .await;
    assert!(result.is_err());
}
