// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the canonical transaction codec

use ethers::types::{Address, Bytes, U256};
use proptest::prelude::*;
use private_proposals::transaction::{decode, encode, CanonicalTransaction, Operation};
use private_proposals::CryptoError;
use rlp::RlpStream;

fn sample_tx() -> CanonicalTransaction {
    CanonicalTransaction {
        to: Address::from_low_u64_be(0xdead),
        value: U256::from(10u64).pow(U256::from(18u64)),
        data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01]),
        operation: Operation::DelegateCall,
        safe_tx_gas: U256::from(50_000u64),
        base_gas: U256::zero(),
        gas_price: U256::from(1u64),
        gas_token: Address::zero(),
        refund_receiver: Address::from_low_u64_be(0xbeef),
    }
}

/// Canonical field bytes of `sample_tx`, for building hand-made lists
fn sample_fields() -> Vec<Vec<u8>> {
    let tx = sample_tx();
    vec![
        tx.to.as_bytes().to_vec(),
        vec![0x0d, 0xe0, 0xb6, 0xb3, 0xa7, 0x64, 0x00, 0x00],
        tx.data.to_vec(),
        vec![0x01],
        vec![0xc3, 0x50],
        vec![],
        vec![0x01],
        tx.gas_token.as_bytes().to_vec(),
        tx.refund_receiver.as_bytes().to_vec(),
    ]
}

fn raw_list(items: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(items.len());
    for item in items {
        stream.append(item);
    }
    stream.out().to_vec()
}

#[test]
fn test_hand_built_list_matches_encoder() {
    assert_eq!(raw_list(&sample_fields()), encode(&sample_tx()));
}

#[test]
fn test_decode_round_trip() {
    let tx = sample_tx();
    assert_eq!(decode(&encode(&tx)).unwrap(), tx);
}

#[test]
fn test_encoding_is_deterministic() {
    assert_eq!(encode(&sample_tx()), encode(&sample_tx()));
}

#[test]
fn test_leading_zero_integer_rejected() {
    let mut fields = sample_fields();
    fields[4] = vec![0x00, 0xc3, 0x50];

    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::MalformedEncoding(_))
    ));
}

#[test]
fn test_explicit_zero_byte_rejected() {
    // Zero must be the empty string, not [0x00]
    let mut fields = sample_fields();
    fields[5] = vec![0x00];

    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::MalformedEncoding(_))
    ));
}

#[test]
fn test_wrong_field_count_rejected() {
    let mut fields = sample_fields();
    fields.pop();
    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::MalformedEncoding(_))
    ));

    let mut fields = sample_fields();
    fields.push(vec![0x01]);
    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::MalformedEncoding(_))
    ));
}

#[test]
fn test_short_address_rejected() {
    let mut fields = sample_fields();
    fields[0] = vec![0x11; 19];

    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::InvalidAddress { field: "to", actual: 19 })
    ));
}

#[test]
fn test_unknown_operation_rejected() {
    let mut fields = sample_fields();
    fields[3] = vec![0x02];

    assert!(matches!(
        decode(&raw_list(&fields)),
        Err(CryptoError::InvalidOperation(_))
    ));
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut bytes = encode(&sample_tx());
    bytes.push(0x80);

    assert!(matches!(
        decode(&bytes),
        Err(CryptoError::MalformedEncoding(_))
    ));
}

#[test]
fn test_non_list_rejected() {
    assert!(matches!(
        decode(&[0x83, 0x01, 0x02, 0x03]),
        Err(CryptoError::MalformedEncoding(_))
    ));
    assert!(decode(&[]).is_err());
}

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

fn arb_u256() -> impl Strategy<Value = U256> {
    prop_oneof![
        Just(U256::zero()),
        any::<u64>().prop_map(U256::from),
        any::<[u8; 32]>().prop_map(|b| U256::from_big_endian(&b)),
    ]
}

fn arb_tx() -> impl Strategy<Value = CanonicalTransaction> {
    let head = (
        arb_address(),
        arb_u256(),
        prop::collection::vec(any::<u8>(), 0..300),
    );
    let gas = (arb_u256(), arb_u256(), arb_u256());
    let refund = (arb_address(), arb_address());

    (head, any::<bool>(), gas, refund).prop_map(|(head, delegate, gas, refund)| {
        let (to, value, data) = head;
        let (safe_tx_gas, base_gas, gas_price) = gas;
        let (gas_token, refund_receiver) = refund;
        CanonicalTransaction {
            to,
            value,
            data: Bytes::from(data),
            operation: if delegate {
                Operation::DelegateCall
            } else {
                Operation::Call
            },
            safe_tx_gas,
            base_gas,
            gas_price,
            gas_token,
            refund_receiver,
        }
    })
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(tx in arb_tx()) {
        prop_assert_eq!(decode(&encode(&tx)).unwrap(), tx);
    }

    #[test]
    fn prop_distinct_transactions_encode_differently(a in arb_tx(), b in arb_tx()) {
        prop_assume!(a != b);
        prop_assert_ne!(encode(&a), encode(&b));
    }
}
