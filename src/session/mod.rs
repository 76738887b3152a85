// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proposal Sessions
//!
//! A session holds the two keys an owner needs to take part in private
//! proposals: an X25519 encryption key other owners wrap content keys to,
//! and a secp256k1 relaying key that submits the registration on the owner's
//! behalf. Both are derived from one wallet signature, so the same wallet
//! can recreate them later from the registered context alone.
//!
//! ## Lifecycle
//!
//! 1. [`Session::create`]: fresh random context, keys derived, registration
//!    signed by the relaying key and left pending
//! 2. The relaying collaborator publishes the pending registration
//! 3. [`Session::confirm_registration`] once the commitment is observed
//! 4. [`Session::recreate`] on later visits, from the on-chain commitment

pub mod derivation;
pub mod serialization;
pub mod signer;

use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::config::RegistryConfig;
use crate::crypto::{
    decrypt_as_recipient, encrypt_for_recipients, import_public, CryptoError, EncryptedEnvelope,
    KeyPairHandle, PublicKeyHandle,
};
use crate::transaction::CanonicalTransaction;

pub use derivation::{derive_encryption_key, derive_relayer_wallet, random_context, CONTEXT_LEN};
pub use serialization::{deserialize_session, serialize_session};
pub use signer::{SessionSigner, SESSION_REQUEST_PURPOSE};

/// What the registry stores per owner: the derivation context and the
/// public encryption key derived under it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationCommitment {
    pub context: [u8; CONTEXT_LEN],
    pub public_key: PublicKeyHandle,
}

impl RegistrationCommitment {
    /// Build from raw registry values
    ///
    /// # Errors
    ///
    /// - `InvalidContext`: context is not 32 bytes, or is all-zero
    /// - `InvalidKeyLength`: public key is not 32 bytes
    pub fn from_raw(context: &[u8], public_key: &[u8]) -> Result<Self, CryptoError> {
        let context: [u8; CONTEXT_LEN] = context.try_into().map_err(|_| {
            CryptoError::InvalidContext(format!(
                "context must be {} bytes, got {}",
                CONTEXT_LEN,
                context.len()
            ))
        })?;
        if is_zero_context(&context) {
            return Err(CryptoError::InvalidContext(
                "context is zero: owner has no registration".to_string(),
            ));
        }
        Ok(RegistrationCommitment {
            context,
            public_key: import_public(public_key)?,
        })
    }

    pub fn context_hex(&self) -> String {
        format!("0x{}", hex::encode(self.context))
    }
}

fn is_zero_context(context: &[u8; CONTEXT_LEN]) -> bool {
    context.iter().all(|b| *b == 0)
}

/// Registration signed by the session's relaying key, not yet observed on chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRegistration {
    pub owner: Address,
    pub commitment: RegistrationCommitment,
    pub relayer: Address,
    pub signature: Signature,
}

impl PendingRegistration {
    /// Check the signature recovers to the relaying address
    pub fn verify(&self, config: &RegistryConfig) -> Result<(), CryptoError> {
        let request = signer::registration_request(config, self.owner, &self.commitment)?;
        let recovered = signer::recover_signer(&request, &self.signature)?;
        if recovered != self.relayer {
            return Err(CryptoError::Signing(format!(
                "registration signed by {:?}, expected relayer {:?}",
                recovered, self.relayer
            )));
        }
        Ok(())
    }
}

/// Live session for one owner on one registry deployment
#[derive(Clone)]
pub struct Session {
    owner: Address,
    config: RegistryConfig,
    encryption: KeyPairHandle,
    relayer: LocalWallet,
    commitment: RegistrationCommitment,
    pending: Option<PendingRegistration>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner)
            .field("chain_id", &self.config.chain_id)
            .field("public_key", &self.commitment.public_key.to_hex())
            .field("relayer", &self.relayer.address())
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

async fn request_seed<S: SessionSigner + ?Sized>(
    signer: &S,
    config: &RegistryConfig,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    config.validate()?;
    let request = signer::session_request(config, signer.owner_address())?;
    let signature = signer.sign_session_request(&request).await?;
    Ok(Zeroizing::new(signature.to_vec()))
}

impl Session {
    /// Start a new session with a fresh random context
    ///
    /// The resulting session carries a [`PendingRegistration`] for the
    /// relaying collaborator to publish.
    pub async fn create<S: SessionSigner + ?Sized>(
        signer: &S,
        config: &RegistryConfig,
    ) -> Result<Self, CryptoError> {
        let owner = signer.owner_address();
        let seed = request_seed(signer, config).await?;
        let context = random_context();

        let encryption = derive_encryption_key(&seed, &context)?;
        let relayer = derive_relayer_wallet(&seed, &context, config.chain_id)?;
        let commitment = RegistrationCommitment {
            context,
            public_key: encryption.public_key(),
        };

        let request = signer::registration_request(config, owner, &commitment)?;
        let signature = relayer
            .sign_typed_data(&request)
            .await
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let pending = PendingRegistration {
            owner,
            commitment,
            relayer: relayer.address(),
            signature,
        };

        info!(
            "🔑 Session created for {:?} on chain {} (key {}, relayer {:?})",
            owner,
            config.chain_id,
            commitment.public_key.to_hex(),
            relayer.address()
        );

        Ok(Session {
            owner,
            config: config.clone(),
            encryption,
            relayer,
            commitment,
            pending: Some(pending),
        })
    }

    /// Re-derive a registered session from its on-chain commitment
    ///
    /// # Errors
    ///
    /// - `InvalidContext`: the context is zero, or the wallet derives a
    ///   different public key than the one registered
    pub async fn recreate<S: SessionSigner + ?Sized>(
        signer: &S,
        config: &RegistryConfig,
        known: &RegistrationCommitment,
    ) -> Result<Self, CryptoError> {
        if is_zero_context(&known.context) {
            return Err(CryptoError::InvalidContext(
                "context is zero: owner has no registration".to_string(),
            ));
        }

        let owner = signer.owner_address();
        let seed = request_seed(signer, config).await?;
        let encryption = derive_encryption_key(&seed, &known.context)?;

        if encryption.public_key() != known.public_key {
            warn!(
                "Re-derived key {} for {:?} does not match registered key {}",
                encryption.public_key().to_hex(),
                owner,
                known.public_key.to_hex()
            );
            return Err(CryptoError::InvalidContext(
                "re-derived public key does not match the registered key".to_string(),
            ));
        }

        let relayer = derive_relayer_wallet(&seed, &known.context, config.chain_id)?;
        info!(
            "🔑 Session recreated for {:?} on chain {}",
            owner, config.chain_id
        );

        Ok(Session {
            owner,
            config: config.clone(),
            encryption,
            relayer,
            commitment: *known,
            pending: None,
        })
    }

    /// [`Session::recreate`] from raw registry values
    pub async fn recreate_from_raw<S: SessionSigner + ?Sized>(
        signer: &S,
        config: &RegistryConfig,
        context: &[u8],
        public_key: &[u8],
    ) -> Result<Self, CryptoError> {
        let known = RegistrationCommitment::from_raw(context, public_key)?;
        Self::recreate(signer, config, &known).await
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn commitment(&self) -> &RegistrationCommitment {
        &self.commitment
    }

    pub fn public_key(&self) -> PublicKeyHandle {
        self.commitment.public_key
    }

    pub fn encryption_key(&self) -> &KeyPairHandle {
        &self.encryption
    }

    pub fn relayer(&self) -> &LocalWallet {
        &self.relayer
    }

    pub fn relayer_address(&self) -> Address {
        self.relayer.address()
    }

    pub fn pending_registration(&self) -> Option<&PendingRegistration> {
        self.pending.as_ref()
    }

    /// Session without its pending registration, once the registry shows `observed`
    ///
    /// `self` is left as it was; on mismatch no new session is produced.
    pub fn confirm_registration(
        &self,
        observed: &RegistrationCommitment,
    ) -> Result<Session, CryptoError> {
        if *observed != self.commitment {
            return Err(CryptoError::InvalidContext(format!(
                "observed commitment {} does not match session commitment {}",
                observed.context_hex(),
                self.commitment.context_hex()
            )));
        }
        if self.pending.is_some() {
            info!("✅ Registration confirmed for {:?}", self.owner);
        }
        Ok(Session {
            pending: None,
            ..self.clone()
        })
    }

    /// Same session with its encryption key marked non-exportable
    pub fn into_non_exportable(self) -> Self {
        Session {
            encryption: self.encryption.into_non_exportable(),
            ..self
        }
    }

    /// Encrypt a proposal for `recipients`
    ///
    /// The session's own key is not added implicitly; include it in
    /// `recipients` to be able to read the proposal back.
    pub fn encrypt_proposal(
        &self,
        tx: &CanonicalTransaction,
        recipients: &[PublicKeyHandle],
    ) -> Result<EncryptedEnvelope, CryptoError> {
        encrypt_for_recipients(tx, &self.encryption, recipients)
    }

    pub fn decrypt_proposal(
        &self,
        envelope: &EncryptedEnvelope,
    ) -> Result<CanonicalTransaction, CryptoError> {
        decrypt_as_recipient(envelope, &self.encryption)
    }

    pub fn serialize(&self) -> Result<String, CryptoError> {
        serialize_session(self)
    }
}

/// Create a session, or recreate it when the owner already has a commitment
pub async fn signin_to_session<S: SessionSigner + ?Sized>(
    signer: &S,
    config: &RegistryConfig,
    known: Option<&RegistrationCommitment>,
) -> Result<Session, CryptoError> {
    match known {
        Some(commitment) => Session::recreate(signer, config, commitment).await,
        None => Session::create(signer, config).await,
    }
}
