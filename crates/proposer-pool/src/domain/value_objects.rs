//! # Domain Value Objects
//!
//! Transaction status, key algorithm identifiers and authorization roles.

use serde::{Deserialize, Serialize};

/// Transaction status as reported by the ledger.
///
/// ```text
/// Unknown → Pending → Finalized → Executed → Sealed
///              │
///              └──→ Expired
/// ```
///
/// Discriminants match the ledger's numeric status codes, so the derived
/// ordering is the ledger's ordering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TxStatus {
    /// Not yet seen by the ledger.
    #[default]
    Unknown = 0,
    /// Awaiting finalization.
    Pending = 1,
    /// Finalized, awaiting execution.
    Finalized = 2,
    /// Executed, awaiting sealing.
    Executed = 3,
    /// Result committed to the chain.
    Sealed = 4,
    /// Dropped by the ledger; no further change is possible.
    Expired = 5,
}

impl TxStatus {
    /// True once the proposer of this transaction may be reused.
    ///
    /// Expired counts as settled: the ledger will never move it again.
    pub fn is_settled(self) -> bool {
        self >= TxStatus::Sealed
    }
}

/// Signature algorithm identifiers understood by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// ECDSA over NIST P-256.
    EcdsaP256,
    /// ECDSA over secp256k1.
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    /// Ledger wire identifier.
    pub fn id(self) -> u8 {
        match self {
            SignatureAlgorithm::EcdsaP256 => 2,
            SignatureAlgorithm::EcdsaSecp256k1 => 3,
        }
    }
}

/// Hash algorithm identifiers understood by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA2-256.
    Sha2_256,
    /// SHA3-256.
    Sha3_256,
}

impl HashAlgorithm {
    /// Ledger wire identifier.
    pub fn id(self) -> u8 {
        match self {
            HashAlgorithm::Sha2_256 => 1,
            HashAlgorithm::Sha3_256 => 3,
        }
    }
}

/// Key weight that alone satisfies an account's signing threshold.
pub const FULL_KEY_WEIGHT: u32 = 1000;

/// Role an account plays in a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthRole {
    /// Supplies the sequence number.
    Proposer,
    /// Pays the fees.
    Payer,
    /// Grants access to its own state.
    Authorizer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering_matches_codes() {
        assert!(TxStatus::Unknown < TxStatus::Pending);
        assert!(TxStatus::Executed < TxStatus::Sealed);
        assert!(TxStatus::Sealed < TxStatus::Expired);
        assert_eq!(TxStatus::Sealed as u8, 4);
    }

    #[test]
    fn test_settled_states() {
        assert!(!TxStatus::Unknown.is_settled());
        assert!(!TxStatus::Pending.is_settled());
        assert!(!TxStatus::Finalized.is_settled());
        assert!(!TxStatus::Executed.is_settled());
        assert!(TxStatus::Sealed.is_settled());
        assert!(TxStatus::Expired.is_settled());
    }

    #[test]
    fn test_algorithm_ids() {
        assert_eq!(SignatureAlgorithm::EcdsaP256.id(), 2);
        assert_eq!(HashAlgorithm::Sha3_256.id(), 3);
    }
}
