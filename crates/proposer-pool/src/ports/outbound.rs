//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the proposer pool needs from its host: a ledger client, a
//! signing primitive, a key generator, a public-key encoder and a pool store.
//!
//! Default adapters for everything except the ledger live in `adapters/`.
//! `MockLedgerClient` below is a scriptable in-memory ledger for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    AccountInfo, Address, CompositeSignature, HashAlgorithm, KeyPair, LedgerError, LedgerEvent,
    PersistedAccount, PrivateKey, SignatureAlgorithm, SignerError, StoreError, TransactionArgument,
    TransactionRequest, TransactionResult, TxId, TxStatus, ACCOUNT_CREATED_EVENT,
    CREATE_ACCOUNT_TRANSACTION,
};

/// Access to the ledger network.
///
/// Implementations perform network I/O; every method is a suspension point.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign and submit a transaction, returning its id.
    async fn submit_transaction(&self, request: TransactionRequest) -> Result<TxId, LedgerError>;

    /// Current status and events of a transaction.
    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError>;

    /// Resolve once the transaction is sealed (or expired).
    ///
    /// May never resolve; callers bound it with a timeout.
    async fn wait_until_sealed(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError>;

    /// On-chain account state, including per-key sequence numbers.
    async fn account_info(&self, address: &Address) -> Result<AccountInfo, LedgerError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn submit_transaction(&self, request: TransactionRequest) -> Result<TxId, LedgerError> {
        (**self).submit_transaction(request).await
    }

    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError> {
        (**self).transaction_status(tx_id).await
    }

    async fn wait_until_sealed(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError> {
        (**self).wait_until_sealed(tx_id).await
    }

    async fn account_info(&self, address: &Address) -> Result<AccountInfo, LedgerError> {
        (**self).account_info(address).await
    }
}

/// Signing primitive: `sign(private_key, message) -> signature`.
pub trait MessageSigner: Send + Sync {
    /// Sign `message` with `key`, returning the raw signature bytes.
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Source of fresh account key pairs.
pub trait KeyGenerator: Send + Sync {
    /// Generate a new key pair.
    fn generate(&self) -> Result<KeyPair, SignerError>;
}

/// Encodes a public key plus algorithm metadata for account creation.
pub trait PublicKeyEncoder: Send + Sync {
    /// Encode `public_key` for the ledger's account-creation argument.
    fn encode(
        &self,
        public_key: &[u8],
        sign_algo: SignatureAlgorithm,
        hash_algo: HashAlgorithm,
        weight: u32,
    ) -> Vec<u8>;
}

/// Durable storage for the pool (main account excluded).
///
/// `save` replaces the whole pool; a failed save leaves the previous
/// contents intact.
pub trait PoolStore: Send + Sync {
    /// Load the saved pool, in creation order. Empty when nothing was saved.
    fn load(&self) -> Result<Vec<PersistedAccount>, StoreError>;

    /// Overwrite the saved pool.
    fn save(&self, accounts: &[PersistedAccount]) -> Result<(), StoreError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A transaction accepted by `MockLedgerClient`.
#[derive(Clone, Debug)]
pub struct SubmittedTransaction {
    /// Assigned id.
    pub tx_id: TxId,
    /// Script.
    pub code: String,
    /// Arguments.
    pub arguments: Vec<TransactionArgument>,
    /// Proposer address.
    pub proposer: Address,
    /// Proposer key index.
    pub proposer_key_id: u32,
    /// Sequence number consumed by the proposer.
    pub sequence_number: u64,
    /// Payer address.
    pub payer: Address,
    /// Authorizer addresses.
    pub authorizers: Vec<Address>,
    /// Compute limit.
    pub compute_limit: u64,
    /// Payer signature over the transaction id.
    pub envelope_signature: CompositeSignature,
}

#[derive(Default)]
struct MockLedgerState {
    next_tx: u64,
    next_account: u64,
    transactions: HashMap<TxId, TransactionResult>,
    submitted: Vec<SubmittedTransaction>,
    accounts: HashMap<Address, AccountInfo>,
    omit_account_created: bool,
    never_seal: bool,
    failing: bool,
    status_queries: usize,
}

/// In-memory ledger for tests.
///
/// Submitted transactions start `Pending`. `wait_until_sealed` seals them
/// immediately unless `set_never_seal(true)`. A submission whose code is
/// `CREATE_ACCOUNT_TRANSACTION` emits a `flow.AccountCreated` event carrying a
/// fresh address unless `set_emit_account_created(false)`.
#[derive(Default)]
pub struct MockLedgerClient {
    state: Mutex<MockLedgerState>,
}

impl MockLedgerClient {
    /// Create an empty mock ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register on-chain account state returned by `account_info`.
    pub fn register_account(&self, info: AccountInfo) {
        self.state.lock().accounts.insert(info.address.clone(), info);
    }

    /// Force a transaction's status.
    pub fn set_status(&self, tx_id: &TxId, status: TxStatus) {
        self.state
            .lock()
            .transactions
            .entry(tx_id.clone())
            .or_default()
            .status = status;
    }

    /// Toggle the account-created event on creation transactions.
    pub fn set_emit_account_created(&self, emit: bool) {
        self.state.lock().omit_account_created = !emit;
    }

    /// Make `wait_until_sealed` hang forever.
    pub fn set_never_seal(&self, never: bool) {
        self.state.lock().never_seal = never;
    }

    /// Make every call fail with a network error.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// All accepted transactions, in submission order.
    pub fn submitted(&self) -> Vec<SubmittedTransaction> {
        self.state.lock().submitted.clone()
    }

    /// Number of accepted account-creation transactions.
    pub fn creation_count(&self) -> usize {
        self.state
            .lock()
            .submitted
            .iter()
            .filter(|tx| tx.code == CREATE_ACCOUNT_TRANSACTION)
            .count()
    }

    /// Number of `transaction_status` calls served.
    pub fn status_queries(&self) -> usize {
        self.state.lock().status_queries
    }

    fn check_available(state: &MockLedgerState) -> Result<(), LedgerError> {
        if state.failing {
            return Err(LedgerError::Network("Mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn submit_transaction(&self, request: TransactionRequest) -> Result<TxId, LedgerError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;

        state.next_tx += 1;
        let tx_id = format!("{:064x}", state.next_tx);

        // Exercise both signing closures the way a real client would.
        request
            .proposer
            .sign(tx_id.as_bytes())
            .map_err(|e| LedgerError::Rejected {
                reason: e.to_string(),
            })?;
        let envelope_signature =
            request
                .payer
                .sign(tx_id.as_bytes())
                .map_err(|e| LedgerError::Rejected {
                    reason: e.to_string(),
                })?;

        let mut events = Vec::new();
        if request.code == CREATE_ACCOUNT_TRANSACTION && !state.omit_account_created {
            state.next_account += 1;
            let address = format!("0x{:016x}", 0x1000 + state.next_account);
            events.push(LedgerEvent::new(
                ACCOUNT_CREATED_EVENT,
                serde_json::json!({ "address": address }),
            ));
        }

        state.transactions.insert(
            tx_id.clone(),
            TransactionResult {
                status: TxStatus::Pending,
                events,
            },
        );
        state.submitted.push(SubmittedTransaction {
            tx_id: tx_id.clone(),
            code: request.code,
            arguments: request.arguments,
            proposer: request.proposer.address().clone(),
            proposer_key_id: request.proposer.key_id(),
            sequence_number: request.proposer.sequence_number(),
            payer: request.payer.address().clone(),
            authorizers: request
                .authorizers
                .iter()
                .map(|a| a.address().clone())
                .collect(),
            compute_limit: request.compute_limit,
            envelope_signature,
        });

        Ok(tx_id)
    }

    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        state.status_queries += 1;

        state
            .transactions
            .get(tx_id)
            .cloned()
            .ok_or_else(|| LedgerError::TransactionNotFound(tx_id.clone()))
    }

    async fn wait_until_sealed(&self, tx_id: &TxId) -> Result<TransactionResult, LedgerError> {
        let never_seal = {
            let state = self.state.lock();
            Self::check_available(&state)?;
            state.never_seal
        };
        if never_seal {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock();
        let result = state
            .transactions
            .get_mut(tx_id)
            .ok_or_else(|| LedgerError::TransactionNotFound(tx_id.clone()))?;
        if !result.status.is_settled() {
            result.status = TxStatus::Sealed;
        }
        Ok(result.clone())
    }

    async fn account_info(&self, address: &Address) -> Result<AccountInfo, LedgerError> {
        let state = self.state.lock();
        Self::check_available(&state)?;

        state
            .accounts
            .get(address)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(address.clone()))
    }
}
