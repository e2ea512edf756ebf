//! # Transaction Authorizations
//!
//! What an account hands to the ledger client so the client can sign a
//! transaction on its behalf.
//!
//! Only the proposer supplies a sequence number, so the two shapes are
//! separate types: `ProposerAuth` carries one, `SigningAuth` (payer or
//! authorizer) cannot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{Address, SignerError};
use super::key_material::PrivateKey;
use crate::ports::outbound::MessageSigner;

/// Signature attached to a transaction envelope or payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSignature {
    /// Signing account.
    pub address: Address,
    /// Key index used.
    pub key_id: u32,
    /// Lowercase hex of the raw signature.
    pub signature: String,
}

/// Payer / authorizer capability: address, key id and a signing closure.
#[derive(Clone)]
pub struct SigningAuth {
    address: Address,
    key_id: u32,
    key: PrivateKey,
    signer: Arc<dyn MessageSigner>,
}

impl SigningAuth {
    pub(crate) fn new(
        address: Address,
        key_id: u32,
        key: PrivateKey,
        signer: Arc<dyn MessageSigner>,
    ) -> Self {
        Self {
            address,
            key_id,
            key,
            signer,
        }
    }

    /// Account this capability signs for.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Key index on that account.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Sign a message with the account's key.
    pub fn sign(&self, message: &[u8]) -> Result<CompositeSignature, SignerError> {
        let signature = self.signer.sign(&self.key, message)?;
        Ok(CompositeSignature {
            address: self.address.clone(),
            key_id: self.key_id,
            signature: hex::encode(signature),
        })
    }
}

impl std::fmt::Debug for SigningAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningAuth")
            .field("address", &self.address)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Proposer capability: a signing capability plus the sequence number it
/// consumed.
#[derive(Clone, Debug)]
pub struct ProposerAuth {
    auth: SigningAuth,
    sequence_number: u64,
}

impl ProposerAuth {
    pub(crate) fn new(auth: SigningAuth, sequence_number: u64) -> Self {
        Self {
            auth,
            sequence_number,
        }
    }

    /// Proposing account.
    pub fn address(&self) -> &Address {
        self.auth.address()
    }

    /// Key index on the proposing account.
    pub fn key_id(&self) -> u32 {
        self.auth.key_id()
    }

    /// Sequence number this transaction consumes.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Sign a message with the proposer's key.
    pub fn sign(&self, message: &[u8]) -> Result<CompositeSignature, SignerError> {
        self.auth.sign(message)
    }
}

/// Authorization produced for a given role.
#[derive(Clone, Debug)]
pub enum Authorization {
    /// Carries a sequence number.
    Proposer(ProposerAuth),
    /// Fee payer.
    Payer(SigningAuth),
    /// Grants access to account state.
    Authorizer(SigningAuth),
}

impl Authorization {
    /// Sequence number, present only for the proposer.
    pub fn sequence_number(&self) -> Option<u64> {
        match self {
            Authorization::Proposer(auth) => Some(auth.sequence_number()),
            Authorization::Payer(_) | Authorization::Authorizer(_) => None,
        }
    }

    /// Account this authorization signs for.
    pub fn address(&self) -> &Address {
        match self {
            Authorization::Proposer(auth) => auth.address(),
            Authorization::Payer(auth) | Authorization::Authorizer(auth) => auth.address(),
        }
    }

    /// Sign a message with the underlying key.
    pub fn sign(&self, message: &[u8]) -> Result<CompositeSignature, SignerError> {
        match self {
            Authorization::Proposer(auth) => auth.sign(message),
            Authorization::Payer(auth) | Authorization::Authorizer(auth) => auth.sign(message),
        }
    }
}
