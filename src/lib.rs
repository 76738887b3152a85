// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod crypto;
pub mod session;
pub mod transaction;
pub mod version;

pub use config::RegistryConfig;
pub use crypto::{
    decrypt_as_recipient, encrypt_for_recipients, export_public, import_private, import_public,
    CryptoError, EncryptedEnvelope, KeyPairHandle, PublicKeyHandle,
};
pub use session::{
    deserialize_session, serialize_session, signin_to_session, PendingRegistration,
    RegistrationCommitment, Session, SessionSigner,
};
pub use transaction::{CanonicalTransaction, Operation};
