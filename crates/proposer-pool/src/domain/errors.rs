//! # Domain Errors
//!
//! Error types for the proposer pool.
//!
//! Each outbound port has its own error enum; `PoolError` is what the
//! `AccountManager` surfaces to callers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Opaque ledger account address (e.g. `0xf8d6e0586b0a20c7`).
pub type Address = String;

/// Ledger transaction identifier.
pub type TxId = String;

/// Errors raised by a `LedgerClient`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Transport or access-node failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The ledger does not know this transaction.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TxId),

    /// The ledger does not know this account.
    #[error("Account not found: {0}")]
    AccountNotFound(Address),

    /// Submission was rejected before inclusion.
    #[error("Transaction rejected: {reason}")]
    Rejected {
        /// Reason reported by the ledger.
        reason: String,
    },
}

/// Errors raised by signing and key handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// Key material is not valid hex.
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Private key bytes are not a valid scalar for the curve.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Public key bytes are not a valid curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// The signing primitive failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Errors raised by a `PoolStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("Pool store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pool file is not valid JSON for the expected shape.
    #[error("Pool store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another process holds the pool directory.
    #[error("Pool directory already in use (lock {path:?}, holder pid {pid:?})")]
    AlreadyLocked {
        /// PID found in the lock file, if readable.
        pid: Option<u32>,
        /// Path of the lock file.
        path: PathBuf,
    },
}

/// Errors surfaced by the `AccountManager`.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A ledger call failed. Never retried by the pool.
    #[error(transparent)]
    Network(#[from] LedgerError),

    /// The account-creation transaction settled without an account-created event.
    #[error("Account creation failed: transaction {tx_id} emitted no account-created event")]
    AccountCreationFailed {
        /// Creation transaction id.
        tx_id: TxId,
    },

    /// A settlement wait exceeded the configured timeout.
    #[error("Settlement timeout: transaction {tx_id} not sealed after {timeout:?}")]
    SettlementTimeout {
        /// Transaction that did not settle.
        tx_id: TxId,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// Persisting or loading the pool failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The ledger accepted the transaction but the pool could not be saved.
    ///
    /// The proposer keeps `tx_id` as its pending transaction in memory.
    #[error("Transaction {tx_id} submitted but pool not saved: {source}")]
    PersistFailed {
        /// Accepted transaction id.
        tx_id: TxId,
        /// Store failure.
        #[source]
        source: StoreError,
    },

    /// Key material could not be used.
    #[error(transparent)]
    Signing(#[from] SignerError),
}
