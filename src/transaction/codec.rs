// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Canonical Transaction Encoding
//!
//! **Format**: one RLP list of nine byte strings, in field order
//! ```text
//! [to, value, data, operation, safeTxGas, baseGas, gasPrice, gasToken, refundReceiver]
//! ```
//!
//! - Integers: minimal big-endian bytes, zero is the empty string
//! - Addresses: raw 20 bytes
//! - Data: raw bytes
//!
//! Decoding only accepts the canonical form: any input that would not be
//! produced by [`encode`] for the decoded value is rejected.

use ethers::types::{Address, Bytes, U256};
use rlp::{Encodable, Rlp, RlpStream};

use super::{CanonicalTransaction, Operation};
use crate::crypto::CryptoError;

/// Number of fields in the canonical list
pub const FIELD_COUNT: usize = 9;

/// Byte string appended verbatim as an RLP string item
struct RawBytes<'a>(&'a [u8]);

impl Encodable for RawBytes<'_> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.0);
    }
}

fn minimal_be(value: &U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let first = buf.iter().position(|b| *b != 0).unwrap_or(buf.len());
    buf[first..].to_vec()
}

/// Encode `tx` to its canonical bytes
pub fn encode(tx: &CanonicalTransaction) -> Vec<u8> {
    let value = minimal_be(&tx.value);
    let operation = minimal_be(&U256::from(u8::from(tx.operation)));
    let safe_tx_gas = minimal_be(&tx.safe_tx_gas);
    let base_gas = minimal_be(&tx.base_gas);
    let gas_price = minimal_be(&tx.gas_price);

    let mut stream = RlpStream::new_list(FIELD_COUNT);
    stream
        .append(&RawBytes(tx.to.as_bytes()))
        .append(&RawBytes(&value))
        .append(&RawBytes(tx.data.as_ref()))
        .append(&RawBytes(&operation))
        .append(&RawBytes(&safe_tx_gas))
        .append(&RawBytes(&base_gas))
        .append(&RawBytes(&gas_price))
        .append(&RawBytes(tx.gas_token.as_bytes()))
        .append(&RawBytes(tx.refund_receiver.as_bytes()));
    stream.out().to_vec()
}

fn malformed(reason: impl ToString) -> CryptoError {
    CryptoError::MalformedEncoding(reason.to_string())
}

fn decode_uint(field: &'static str, bytes: &[u8]) -> Result<U256, CryptoError> {
    if bytes.len() > 32 {
        return Err(malformed(format!(
            "field '{}' is {} bytes, integers are at most 32",
            field,
            bytes.len()
        )));
    }
    if bytes.first() == Some(&0) {
        return Err(malformed(format!("field '{}' has a leading zero byte", field)));
    }
    Ok(U256::from_big_endian(bytes))
}

fn decode_address(field: &'static str, bytes: &[u8]) -> Result<Address, CryptoError> {
    if bytes.len() != Address::len_bytes() {
        return Err(CryptoError::InvalidAddress {
            field,
            actual: bytes.len(),
        });
    }
    Ok(Address::from_slice(bytes))
}

fn decode_operation(bytes: &[u8]) -> Result<Operation, CryptoError> {
    let raw = decode_uint("operation", bytes)?;
    if raw > U256::one() {
        return Err(CryptoError::InvalidOperation(raw.to_string()));
    }
    Operation::try_from(raw.low_u64() as u8)
}

/// Decode canonical bytes back into a transaction
///
/// # Errors
///
/// - `MalformedEncoding`: not a single 9-item list of strings, trailing
///   bytes, non-minimal integers or any other non-canonical form
/// - `InvalidAddress`: `to`, `gasToken` or `refundReceiver` is not 20 bytes
/// - `InvalidOperation`: operation is not 0 or 1
pub fn decode(bytes: &[u8]) -> Result<CanonicalTransaction, CryptoError> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(malformed("expected an RLP list"));
    }

    let count = rlp.item_count().map_err(malformed)?;
    if count != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, got {}",
            FIELD_COUNT, count
        )));
    }

    let mut fields: Vec<&[u8]> = Vec::with_capacity(FIELD_COUNT);
    for index in 0..FIELD_COUNT {
        let item = rlp.at(index).map_err(malformed)?;
        if !item.is_data() {
            return Err(malformed(format!("field {} is a list, expected a string", index)));
        }
        fields.push(item.data().map_err(malformed)?);
    }

    let tx = CanonicalTransaction {
        to: decode_address("to", fields[0])?,
        value: decode_uint("value", fields[1])?,
        data: Bytes::from(fields[2].to_vec()),
        operation: decode_operation(fields[3])?,
        safe_tx_gas: decode_uint("safeTxGas", fields[4])?,
        base_gas: decode_uint("baseGas", fields[5])?,
        gas_price: decode_uint("gasPrice", fields[6])?,
        gas_token: decode_address("gasToken", fields[7])?,
        refund_receiver: decode_address("refundReceiver", fields[8])?,
    };

    // Catches long-form headers, padded lengths and trailing bytes
    if encode(&tx) != bytes {
        return Err(malformed("input is not in canonical form"));
    }

    Ok(tx)
}
