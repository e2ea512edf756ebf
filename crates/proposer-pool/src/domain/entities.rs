//! # Domain Entities
//!
//! Ledger-facing request/response shapes and the persisted pool record.

use serde::{Deserialize, Serialize};

use super::authorization::{ProposerAuth, SigningAuth};
use super::errors::Address;
use super::key_material::KeyPair;
use super::value_objects::TxStatus;

/// A typed transaction argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionArgument {
    /// Argument value.
    pub value: serde_json::Value,
    /// Ledger type name (e.g. `String`, `UInt64`, `Address`).
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TransactionArgument {
    /// Create an argument of an arbitrary ledger type.
    pub fn new(value: impl Into<serde_json::Value>, type_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    /// `String` argument.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(value.into(), "String")
    }

    /// `UInt64` argument (encoded as a decimal string, as the ledger expects).
    pub fn uint64(value: u64) -> Self {
        Self::new(value.to_string(), "UInt64")
    }

    /// `Address` argument.
    pub fn address(value: impl Into<String>) -> Self {
        Self::new(value.into(), "Address")
    }
}

/// Everything a ledger client needs to build and sign one transaction.
#[derive(Clone, Debug)]
pub struct TransactionRequest {
    /// Transaction script.
    pub code: String,
    /// Script arguments.
    pub arguments: Vec<TransactionArgument>,
    /// Proposer, with the sequence number it consumes.
    pub proposer: ProposerAuth,
    /// Fee payer.
    pub payer: SigningAuth,
    /// Accounts granting access to their state.
    pub authorizers: Vec<SigningAuth>,
    /// Compute limit for execution.
    pub compute_limit: u64,
}

/// Event emitted by an executed transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Fully qualified event type, e.g. `flow.AccountCreated`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: serde_json::Value,
}

impl LedgerEvent {
    /// Create an event.
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// Status snapshot of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Current status.
    pub status: TxStatus,
    /// Events emitted so far (complete once sealed).
    pub events: Vec<LedgerEvent>,
}

impl TransactionResult {
    /// First event of the given type.
    pub fn find_event(&self, event_type: &str) -> Option<&LedgerEvent> {
        self.events.iter().find(|e| e.event_type == event_type)
    }
}

/// One key registered on a ledger account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKey {
    /// Index within the account's key list.
    pub index: u32,
    /// Public key hex.
    pub public_key: String,
    /// Next sequence number the ledger expects for this key.
    pub sequence_number: u64,
    /// Signing weight.
    pub weight: u32,
    /// Revoked keys cannot sign.
    pub revoked: bool,
}

/// On-chain account state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account address.
    pub address: Address,
    /// Registered keys.
    pub keys: Vec<AccountKey>,
}

impl AccountInfo {
    /// Key with the given index.
    pub fn key(&self, key_id: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == key_id)
    }
}

/// One pool account as written to durable storage.
///
/// The JSON shape is `{address, keyPair: {public, private}, keyId, seqNum}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAccount {
    /// Account address.
    pub address: Address,
    /// Key material.
    pub key_pair: KeyPair,
    /// Key index.
    pub key_id: u32,
    /// Next sequence number to hand out.
    pub seq_num: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key_material::PrivateKey;

    #[test]
    fn test_persisted_account_json_shape() {
        let record = PersistedAccount {
            address: "0x01cf0e2f2f715450".to_string(),
            key_pair: KeyPair::new("abcd", PrivateKey::new(vec![0x12, 0x34])),
            key_id: 0,
            seq_num: 5,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["address"], "0x01cf0e2f2f715450");
        assert_eq!(json["keyPair"]["public"], "abcd");
        assert_eq!(json["keyPair"]["private"], "1234");
        assert_eq!(json["keyId"], 0);
        assert_eq!(json["seqNum"], 5);
    }

    #[test]
    fn test_find_event() {
        let result = TransactionResult {
            status: TxStatus::Sealed,
            events: vec![
                LedgerEvent::new("flow.AccountKeyAdded", serde_json::json!({})),
                LedgerEvent::new("flow.AccountCreated", serde_json::json!({"address": "0x02"})),
            ],
        };
        let event = result.find_event("flow.AccountCreated").unwrap();
        assert_eq!(event.data["address"], "0x02");
        assert!(result.find_event("flow.Missing").is_none());
    }

    #[test]
    fn test_account_info_key_lookup() {
        let info = AccountInfo {
            address: "0x01".to_string(),
            keys: vec![AccountKey {
                index: 1,
                public_key: "aa".to_string(),
                sequence_number: 12,
                weight: 1000,
                revoked: false,
            }],
        };
        assert_eq!(info.key(1).map(|k| k.sequence_number), Some(12));
        assert!(info.key(0).is_none());
    }

    #[test]
    fn test_argument_constructors() {
        assert_eq!(TransactionArgument::string("hi").type_name, "String");
        assert_eq!(TransactionArgument::uint64(7).value, "7");
        assert_eq!(TransactionArgument::address("0x01").type_name, "Address");
    }
}
