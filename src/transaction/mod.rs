// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multisig Transaction Proposals
//!
//! A proposal is the 9-field transaction a Safe-style account executes once
//! enough owners approve it. The field order here is the order of the
//! canonical encoding in [`codec`].

pub mod codec;

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::crypto::CryptoError;

pub use codec::{decode, encode};

/// How the account executes the proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for Operation {
    type Error = CryptoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(CryptoError::InvalidOperation(other.to_string())),
        }
    }
}

/// Transaction proposal in canonical field order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
}

impl CanonicalTransaction {
    /// Plain call with no gas refund settings
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        CanonicalTransaction {
            to,
            value,
            data,
            operation: Operation::Call,
            safe_tx_gas: U256::zero(),
            base_gas: U256::zero(),
            gas_price: U256::zero(),
            gas_token: Address::zero(),
            refund_receiver: Address::zero(),
        }
    }
}
