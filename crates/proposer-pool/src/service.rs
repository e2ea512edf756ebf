//! # Account Manager Service
//!
//! Owns the main account and the proposer pool, and implements
//! `ProposerPoolApi`.
//!
//! ## Selection
//!
//! ```text
//! mutate ──► select_account ──► pool[0..n].is_available? ──► first free
//!                  │
//!                  └─ none free ──► settle main account ──► create_new_account
//! ```
//!
//! The main account is payer and sole authorizer of every transaction and
//! proposer of account-creation transactions. It is never part of the pool.
//!
//! ## Concurrency
//!
//! Every operation takes `&mut self`. Tasks that share one pool go through
//! `SharedAccountManager`, which serializes them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::adapters::{P256Signer, RlpKeyEncoder};
use crate::domain::{
    Account, Address, HashAlgorithm, KeyPair, PoolConfig, PoolError, SignatureAlgorithm,
    StoreError, TransactionArgument, TransactionRequest, TransactionResult, TxId, DEFAULT_KEY_ID,
    FULL_KEY_WEIGHT,
};
use crate::ports::{
    KeyGenerator, LedgerClient, MessageSigner, PoolStore, ProposerPoolApi, PublicKeyEncoder,
};

/// Rotating proposer pool backed by one funding account.
///
/// # Example
///
/// ```rust,ignore
/// let store = Arc::new(JsonFilePoolStore::open("./pool")?);
/// let mut manager = AccountManager::new(ledger, main_account, PoolConfig::from_env())
///     .with_store(store);
/// manager.load_pool()?;
///
/// let tx_id = manager.mutate(CODE, vec![TransactionArgument::uint64(1)]).await?;
/// ```
pub struct AccountManager<L: LedgerClient> {
    ledger: L,
    main_account: Account,
    pool: Vec<Account>,
    config: PoolConfig,
    store: Option<Arc<dyn PoolStore>>,
    signer: Arc<dyn MessageSigner>,
    key_generator: Arc<dyn KeyGenerator>,
    key_encoder: Arc<dyn PublicKeyEncoder>,
    pending_creation: Option<PendingCreation>,
}

/// Account-creation transaction whose outcome has not been observed yet.
struct PendingCreation {
    tx_id: TxId,
    key_pair: KeyPair,
}

impl<L: LedgerClient> AccountManager<L> {
    /// Create a manager with an empty pool, no persistence and the P-256 /
    /// RLP default adapters.
    pub fn new(ledger: L, main_account: Account, config: PoolConfig) -> Self {
        let p256 = Arc::new(P256Signer::new());
        Self {
            ledger,
            main_account,
            pool: Vec::new(),
            config,
            store: None,
            signer: p256.clone(),
            key_generator: p256,
            key_encoder: Arc::new(RlpKeyEncoder::new()),
            pending_creation: None,
        }
    }

    /// Create a manager whose main account's sequence number is recovered
    /// from the ledger unless `seq_num` is given.
    pub async fn with_main_key(
        ledger: L,
        address: Address,
        key_pair: KeyPair,
        key_id: Option<u32>,
        seq_num: Option<u64>,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        let main_account = Account::create(&ledger, address, key_pair, key_id, seq_num).await?;
        info!("[proposer-pool] Main account {}", main_account);
        Ok(Self::new(ledger, main_account, config))
    }

    /// Persist the pool to `store` on every change.
    pub fn with_store(mut self, store: Arc<dyn PoolStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the signing primitive.
    pub fn with_signer(mut self, signer: Arc<dyn MessageSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the key generator used for new pool accounts.
    pub fn with_key_generator(mut self, key_generator: Arc<dyn KeyGenerator>) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Replace the public-key encoder used for account creation.
    pub fn with_key_encoder(mut self, key_encoder: Arc<dyn PublicKeyEncoder>) -> Self {
        self.key_encoder = key_encoder;
        self
    }

    /// Replace the in-memory pool with the store's contents.
    ///
    /// No ledger calls: sequence numbers are taken as saved. Returns the
    /// number of accounts loaded (0 without a store).
    pub fn load_pool(&mut self) -> Result<usize, PoolError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(0);
        };

        self.pool = store
            .load()?
            .into_iter()
            .map(Account::from_persisted)
            .collect();
        info!("[proposer-pool] Loaded {} pool accounts", self.pool.len());
        Ok(self.pool.len())
    }

    /// Write the whole pool to the store, if one is configured.
    pub fn persist(&self) -> Result<(), PoolError> {
        Ok(self.save_pool()?)
    }

    fn save_pool(&self) -> Result<(), StoreError> {
        if let Some(store) = self.store.as_ref() {
            let records: Vec<_> = self.pool.iter().map(Account::to_persisted).collect();
            store.save(&records)?;
        }
        Ok(())
    }

    /// Pool accounts in creation order.
    pub fn pool(&self) -> &[Account] {
        &self.pool
    }

    /// The funding account.
    pub fn main_account(&self) -> &Account {
        &self.main_account
    }

    /// Active configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The ledger client.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Index of the first free pool account, creating one if all are busy.
    async fn select_account(&mut self) -> Result<usize, PoolError> {
        for (index, account) in self.pool.iter_mut().enumerate() {
            if account.is_available(&self.ledger).await? {
                debug!("[proposer-pool] Selected {}", account);
                return Ok(index);
            }
        }

        debug!(
            "[proposer-pool] All {} pool accounts busy, growing pool",
            self.pool.len()
        );
        self.create_account().await
    }

    /// Wait (bounded by the settlement timeout) for the main account's
    /// pending transaction, if any.
    async fn settle_main_account(&mut self) -> Result<Option<TransactionResult>, PoolError> {
        let Some(tx_id) = self.main_account.pending_tx().cloned() else {
            return Ok(None);
        };

        let timeout = self.config.settlement_timeout;
        match tokio::time::timeout(timeout, self.main_account.wait_until_settled(&self.ledger))
            .await
        {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(
                    "[proposer-pool] Transaction {} not sealed after {:?}",
                    tx_id, timeout
                );
                Err(PoolError::SettlementTimeout { tx_id, timeout })
            }
        }
    }

    /// Mint a pool account and return its index.
    ///
    /// The pool is unchanged unless the ledger created the account. A
    /// timed-out creation stays pending on the main account together with
    /// its key pair. The next creation waits for it first and adopts the
    /// account if the ledger created one, without submitting another.
    async fn create_account(&mut self) -> Result<usize, PoolError> {
        let settled = self.settle_main_account().await?;
        if let Some(index) = self.adopt_pending_creation(settled) {
            return Ok(index);
        }

        let key_pair = self.key_generator.generate()?;
        let encoded_key = self.key_encoder.encode(
            &key_pair.public_key_bytes()?,
            SignatureAlgorithm::EcdsaP256,
            HashAlgorithm::Sha3_256,
            FULL_KEY_WEIGHT,
        );

        let main_auth = self.main_account.signing_auth(&self.signer);
        let request = TransactionRequest {
            code: self.config.create_account_code.clone(),
            arguments: vec![TransactionArgument::string(hex::encode(encoded_key))],
            proposer: self.main_account.proposer_auth(&self.signer),
            payer: main_auth.clone(),
            authorizers: vec![main_auth],
            compute_limit: self.config.compute_limit,
        };

        let tx_id = self.ledger.submit_transaction(request).await?;
        debug!("[proposer-pool] Account creation submitted: {}", tx_id);
        self.main_account.record_submission(tx_id.clone());
        self.pending_creation = Some(PendingCreation {
            tx_id: tx_id.clone(),
            key_pair,
        });

        let settled = self.settle_main_account().await?;
        self.adopt_pending_creation(settled)
            .ok_or(PoolError::AccountCreationFailed { tx_id })
    }

    /// Add the account created by the pending creation transaction, if its
    /// settled result carries an account-created event.
    ///
    /// Consumes the pending creation either way. A failed save is logged;
    /// the account stays in memory and goes out with the next save.
    fn adopt_pending_creation(&mut self, settled: Option<TransactionResult>) -> Option<usize> {
        let settled = settled?;
        let pending = self.pending_creation.take()?;

        let address = settled
            .find_event(&self.config.account_created_event)
            .and_then(|event| event.data.get("address"))
            .and_then(|address| address.as_str())
            .map(str::to_string);
        let Some(address) = address else {
            warn!(
                "[proposer-pool] Transaction {} emitted no {} event",
                pending.tx_id, self.config.account_created_event
            );
            return None;
        };

        let account = Account::new(address, pending.key_pair, DEFAULT_KEY_ID, 0);
        info!(
            "[proposer-pool] Created pool account {} (pool size {})",
            account,
            self.pool.len() + 1
        );
        self.pool.push(account);
        if let Err(e) = self.save_pool() {
            warn!("[proposer-pool] Failed to save pool: {}", e);
        }

        Some(self.pool.len() - 1)
    }

    async fn throttle(&self) {
        if self.config.submission_interval > Duration::ZERO {
            tokio::time::sleep(self.config.submission_interval).await;
        }
    }
}

#[async_trait]
impl<L: LedgerClient> ProposerPoolApi for AccountManager<L> {
    async fn mutate(
        &mut self,
        code: &str,
        arguments: Vec<TransactionArgument>,
    ) -> Result<TxId, PoolError> {
        let index = self.select_account().await?;

        let proposer = self.pool[index].proposer_auth(&self.signer);
        let main_auth = self.main_account.signing_auth(&self.signer);
        let request = TransactionRequest {
            code: code.to_string(),
            arguments,
            proposer,
            payer: main_auth.clone(),
            authorizers: vec![main_auth],
            compute_limit: self.config.compute_limit,
        };

        let tx_id = self.ledger.submit_transaction(request).await?;
        debug!(
            "[proposer-pool] Submitted {} proposed by {}",
            tx_id, self.pool[index]
        );
        self.pool[index].record_submission(tx_id.clone());
        let saved = self.save_pool();

        self.throttle().await;
        match saved {
            Ok(()) => Ok(tx_id),
            Err(source) => {
                warn!(
                    "[proposer-pool] Transaction {} submitted but pool not saved: {}",
                    tx_id, source
                );
                Err(PoolError::PersistFailed { tx_id, source })
            }
        }
    }

    async fn get_account(&mut self) -> Result<&Account, PoolError> {
        let index = self.select_account().await?;
        Ok(&self.pool[index])
    }

    async fn create_new_account(&mut self) -> Result<&Account, PoolError> {
        let index = self.create_account().await?;
        Ok(&self.pool[index])
    }

    fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

/// `AccountManager` shared between tasks.
///
/// Operations are serialized through an async mutex, so the one-pending-
/// transaction-per-account rule holds across callers.
pub struct SharedAccountManager<L: LedgerClient> {
    inner: Arc<Mutex<AccountManager<L>>>,
}

impl<L: LedgerClient> Clone for SharedAccountManager<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: LedgerClient> SharedAccountManager<L> {
    /// Wrap a manager.
    pub fn new(manager: AccountManager<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Serialized `mutate`.
    pub async fn mutate(
        &self,
        code: &str,
        arguments: Vec<TransactionArgument>,
    ) -> Result<TxId, PoolError> {
        self.inner.lock().await.mutate(code, arguments).await
    }

    /// Current pool size.
    pub async fn pool_len(&self) -> usize {
        self.inner.lock().await.pool_len()
    }

    /// Exclusive access for anything else.
    pub async fn lock(&self) -> MutexGuard<'_, AccountManager<L>> {
        self.inner.lock().await
    }
}
