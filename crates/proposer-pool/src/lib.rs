//! # Proposer Pool
//!
//! Rotating pool of ledger accounts used as transaction proposers, so one
//! application can keep many transactions in flight without sequence-number
//! collisions.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A ledger rejects a transaction whose proposer sequence number is already
//! used. The pool gives every in-flight transaction its own proposer:
//! - A pool account with an unsettled transaction is never reused
//! - When every account is busy, the main account mints a new one
//! - The main account pays for and authorizes everything
//! - The pool is saved after every change and reloaded without network calls
//!
//! ## Transaction Status
//!
//! | Status | Releases proposer |
//! |--------|-------------------|
//! | Unknown, Pending, Finalized, Executed | no |
//! | Sealed | yes |
//! | Expired | yes |
//!
//! ## Module Structure
//!
//! ```text
//! proposer-pool/
//! ├── domain/          # Account, authorizations, config, errors
//! ├── ports/           # ProposerPoolApi, LedgerClient, MessageSigner, PoolStore
//! ├── adapters/        # P-256 signer, RLP key encoder, JSON/in-memory stores
//! └── service.rs       # AccountManager, SharedAccountManager
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryPoolStore, JsonFilePoolStore, P256Signer, PoolLock, RlpKeyEncoder};
pub use domain::{
    Account, AccountInfo, AccountKey, Address, AuthRole, Authorization, CompositeSignature,
    HashAlgorithm, KeyPair, LedgerError, LedgerEvent, PersistedAccount, PoolConfig, PoolError,
    PrivateKey, ProposerAuth, SignatureAlgorithm, SignerError, SigningAuth, StoreError,
    TransactionArgument, TransactionRequest, TransactionResult, TxId, TxStatus,
    ACCOUNT_CREATED_EVENT, CREATE_ACCOUNT_TRANSACTION, FULL_KEY_WEIGHT,
};
pub use ports::{
    KeyGenerator, LedgerClient, MessageSigner, MockLedgerClient, PoolStore, ProposerPoolApi,
    PublicKeyEncoder, SubmittedTransaction,
};
pub use service::{AccountManager, SharedAccountManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
