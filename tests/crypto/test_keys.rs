// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for X25519 key import/export and agreement

use private_proposals::crypto::{
    export_public, import_private, import_private_with, import_public, CryptoError, DalekBackend,
    SoftwareBackend,
};

// RFC 7748 section 6.1
const ALICE_PRIVATE: &str = "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a";
const ALICE_PUBLIC: &str = "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a";
const BOB_PRIVATE: &str = "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb";
const BOB_PUBLIC: &str = "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f";
const SHARED: &str = "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742";

fn bytes(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).unwrap()
}

#[test]
fn test_import_private_matches_rfc7748() {
    let alice = import_private(&bytes(ALICE_PRIVATE)).unwrap();
    let bob = import_private(&bytes(BOB_PRIVATE)).unwrap();

    assert_eq!(alice.public_key().as_bytes().to_vec(), bytes(ALICE_PUBLIC));
    assert_eq!(bob.public_key().as_bytes().to_vec(), bytes(BOB_PUBLIC));
}

#[test]
fn test_agreement_matches_rfc7748_on_both_backends() {
    let bob_public = import_public(&bytes(BOB_PUBLIC)).unwrap();

    let dalek = import_private_with(&bytes(ALICE_PRIVATE), &DalekBackend).unwrap();
    let software = import_private_with(&bytes(ALICE_PRIVATE), &SoftwareBackend).unwrap();

    assert_eq!(
        dalek.agree(&bob_public, &DalekBackend).unwrap().to_vec(),
        bytes(SHARED)
    );
    assert_eq!(
        software.agree(&bob_public, &SoftwareBackend).unwrap().to_vec(),
        bytes(SHARED)
    );
}

#[test]
fn test_public_key_export_round_trip() {
    let raw: [u8; 32] = bytes(BOB_PUBLIC).try_into().unwrap();
    let handle = import_public(&raw).unwrap();
    assert_eq!(export_public(&handle), raw);
}

#[test]
fn test_private_key_export_round_trip() {
    let pair = import_private(&bytes(ALICE_PRIVATE)).unwrap();
    let exported = pair.export_private().unwrap();

    let again = import_private(&exported).unwrap();
    assert_eq!(again.public_key(), pair.public_key());
}

#[test]
fn test_non_exportable_key_refuses_export_but_still_agrees() {
    let pair = import_private(&bytes(ALICE_PRIVATE))
        .unwrap()
        .into_non_exportable();
    let bob_public = import_public(&bytes(BOB_PUBLIC)).unwrap();

    assert!(!pair.is_exportable());
    assert!(matches!(
        pair.export_private(),
        Err(CryptoError::NonExportableKey(_))
    ));
    assert_eq!(
        pair.agree(&bob_public, &DalekBackend).unwrap().to_vec(),
        bytes(SHARED)
    );
}

#[test]
fn test_wrong_lengths_rejected() {
    assert!(matches!(
        import_public(&[1u8; 31]),
        Err(CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 31
        })
    ));
    assert!(matches!(
        import_private(&[1u8; 33]),
        Err(CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 33
        })
    ));
}

#[test]
fn test_low_order_peer_rejected() {
    let pair = import_private(&bytes(ALICE_PRIVATE)).unwrap();
    let zero_point = import_public(&[0u8; 32]).unwrap();

    // The identity point yields an all-zero shared secret
    assert!(matches!(
        pair.agree(&zero_point, &DalekBackend),
        Err(CryptoError::InvalidPublicKey(_))
    ));
}
