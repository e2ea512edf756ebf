//! # Account
//!
//! One ledger identity able to authorize transactions: its key material, the
//! local view of the next sequence number and the transaction it is waiting on.
//!
//! ## Invariants
//!
//! - The sequence number only grows; every value is handed out once.
//! - At most one unsettled transaction is tracked; an account with one is
//!   not reused as proposer until the ledger reports it settled.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::authorization::{Authorization, ProposerAuth, SigningAuth};
use super::entities::{PersistedAccount, TransactionResult};
use super::errors::{Address, LedgerError, TxId};
use super::key_material::KeyPair;
use super::value_objects::AuthRole;
use crate::ports::outbound::{LedgerClient, MessageSigner};

/// Key index used when none is given.
pub const DEFAULT_KEY_ID: u32 = 0;

/// A proposer-capable ledger account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    address: Address,
    key_pair: KeyPair,
    key_id: u32,
    sequence_number: u64,
    pending_tx: Option<TxId>,
}

impl Account {
    /// Build an account from known state, without touching the ledger.
    pub fn new(address: Address, key_pair: KeyPair, key_id: u32, sequence_number: u64) -> Self {
        Self {
            address,
            key_pair,
            key_id,
            sequence_number,
            pending_tx: None,
        }
    }

    /// Build an account, recovering the sequence number from the ledger when
    /// `seq_num` is `None`.
    ///
    /// A key the ledger does not report starts at 0. An explicit `Some(0)` is
    /// used as given.
    pub async fn create<L>(
        ledger: &L,
        address: Address,
        key_pair: KeyPair,
        key_id: Option<u32>,
        seq_num: Option<u64>,
    ) -> Result<Self, LedgerError>
    where
        L: LedgerClient + ?Sized,
    {
        let key_id = key_id.unwrap_or(DEFAULT_KEY_ID);
        let sequence_number = match seq_num {
            Some(seq) => seq,
            None => {
                let info = ledger.account_info(&address).await?;
                let recovered = info.key(key_id).map(|k| k.sequence_number).unwrap_or(0);
                debug!(
                    "[proposer-pool] Recovered sequence number {} for {} key {}",
                    recovered, address, key_id
                );
                recovered
            }
        };

        Ok(Self::new(address, key_pair, key_id, sequence_number))
    }

    /// Account address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Key material.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Key index.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Sequence number the next proposal will use, without consuming it.
    pub fn peek_sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Transaction this account is waiting on, if any.
    pub fn pending_tx(&self) -> Option<&TxId> {
        self.pending_tx.as_ref()
    }

    /// Return the current sequence number and advance the counter.
    pub fn next_sequence_number(&mut self) -> u64 {
        let current = self.sequence_number;
        self.sequence_number += 1;
        current
    }

    /// Whether the account can propose again.
    ///
    /// No pending transaction means no network call. Otherwise the ledger is
    /// queried once; a settled status (sealed or expired) clears the pending
    /// transaction.
    pub async fn is_available<L>(&mut self, ledger: &L) -> Result<bool, LedgerError>
    where
        L: LedgerClient + ?Sized,
    {
        let Some(tx_id) = self.pending_tx.as_ref() else {
            return Ok(true);
        };

        let result = ledger.transaction_status(tx_id).await?;
        if result.status.is_settled() {
            debug!(
                "[proposer-pool] {} released ({:?} {})",
                self.address, result.status, tx_id
            );
            self.pending_tx = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// Block until the pending transaction (if any) settles, then clear it.
    ///
    /// Returns the settled result, or `None` when nothing was pending.
    pub async fn wait_until_settled<L>(
        &mut self,
        ledger: &L,
    ) -> Result<Option<TransactionResult>, LedgerError>
    where
        L: LedgerClient + ?Sized,
    {
        let Some(tx_id) = self.pending_tx.as_ref() else {
            return Ok(None);
        };

        let result = ledger.wait_until_sealed(tx_id).await?;
        debug!(
            "[proposer-pool] {} settled ({:?} {})",
            self.address, result.status, tx_id
        );
        self.pending_tx = None;
        Ok(Some(result))
    }

    /// Authorization for `role`.
    ///
    /// `AuthRole::Proposer` consumes a sequence number.
    pub fn authorization(
        &mut self,
        role: AuthRole,
        signer: &Arc<dyn MessageSigner>,
    ) -> Authorization {
        match role {
            AuthRole::Proposer => Authorization::Proposer(self.proposer_auth(signer)),
            AuthRole::Payer => Authorization::Payer(self.signing_auth(signer)),
            AuthRole::Authorizer => Authorization::Authorizer(self.signing_auth(signer)),
        }
    }

    /// Proposer authorization; consumes a sequence number.
    pub fn proposer_auth(&mut self, signer: &Arc<dyn MessageSigner>) -> ProposerAuth {
        let sequence_number = self.next_sequence_number();
        ProposerAuth::new(self.signing_auth(signer), sequence_number)
    }

    /// Payer / authorizer authorization.
    pub fn signing_auth(&self, signer: &Arc<dyn MessageSigner>) -> SigningAuth {
        SigningAuth::new(
            self.address.clone(),
            self.key_id,
            self.key_pair.private.clone(),
            Arc::clone(signer),
        )
    }

    /// Track `tx_id` as the transaction this account waits on.
    pub fn record_submission(&mut self, tx_id: TxId) {
        self.pending_tx = Some(tx_id);
    }

    /// Record for the pool store. The pending transaction is not saved.
    pub fn to_persisted(&self) -> PersistedAccount {
        PersistedAccount {
            address: self.address.clone(),
            key_pair: self.key_pair.clone(),
            key_id: self.key_id,
            seq_num: self.sequence_number,
        }
    }

    /// Restore from a pool store record, without any ledger call.
    pub fn from_persisted(record: PersistedAccount) -> Self {
        Self::new(
            record.address,
            record.key_pair,
            record.key_id,
            record.seq_num,
        )
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.address, self.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountInfo, AccountKey, PrivateKey, SignerError, TxStatus};
    use crate::ports::outbound::MockLedgerClient;

    struct FixedSigner;

    impl MessageSigner for FixedSigner {
        fn sign(&self, _key: &PrivateKey, _message: &[u8]) -> Result<Vec<u8>, SignerError> {
            Ok(vec![0x5a; 4])
        }
    }

    fn signer() -> Arc<dyn MessageSigner> {
        Arc::new(FixedSigner)
    }

    fn key_pair() -> KeyPair {
        KeyPair::new("aa".repeat(64), PrivateKey::new(vec![7u8; 32]))
    }

    fn account(seq: u64) -> Account {
        Account::new("0x01".to_string(), key_pair(), 0, seq)
    }

    #[test]
    fn test_next_sequence_number_read_and_increment() {
        let mut acc = account(5);
        let values: Vec<u64> = (0..4).map(|_| acc.next_sequence_number()).collect();
        assert_eq!(values, vec![5, 6, 7, 8]);
        assert_eq!(acc.peek_sequence_number(), 9);
    }

    #[test]
    fn test_display_shows_next_sequence_number() {
        assert_eq!(account(3).to_string(), "0x01[3]");
    }

    #[test]
    fn test_proposer_authorization_consumes_sequence_number() {
        let mut acc = account(10);
        let auth = acc.authorization(AuthRole::Proposer, &signer());
        assert_eq!(auth.sequence_number(), Some(10));
        assert_eq!(acc.peek_sequence_number(), 11);
    }

    #[test]
    fn test_payer_authorization_leaves_sequence_number() {
        let mut acc = account(10);
        let payer = acc.authorization(AuthRole::Payer, &signer());
        let authorizer = acc.authorization(AuthRole::Authorizer, &signer());
        assert_eq!(payer.sequence_number(), None);
        assert_eq!(authorizer.sequence_number(), None);
        assert_eq!(acc.peek_sequence_number(), 10);

        let sig = payer.sign(b"payload").unwrap();
        assert_eq!(sig.address, "0x01");
        assert_eq!(sig.signature, "5a5a5a5a");
    }

    #[test]
    fn test_persisted_record_excludes_pending() {
        let mut acc = account(4);
        acc.record_submission("tx".to_string());

        let restored = Account::from_persisted(acc.to_persisted());
        assert_eq!(restored.address(), acc.address());
        assert_eq!(restored.key_pair(), acc.key_pair());
        assert_eq!(restored.peek_sequence_number(), 4);
        assert!(restored.pending_tx().is_none());
    }

    #[tokio::test]
    async fn test_available_without_pending_makes_no_call() {
        let ledger = MockLedgerClient::new();
        let mut acc = account(0);
        assert!(acc.is_available(&ledger).await.unwrap());
        assert_eq!(ledger.status_queries(), 0);
    }

    #[tokio::test]
    async fn test_pending_blocks_until_sealed() {
        let ledger = MockLedgerClient::new();
        let tx_id = "tx-1".to_string();
        ledger.set_status(&tx_id, TxStatus::Executed);

        let mut acc = account(0);
        acc.record_submission(tx_id.clone());
        assert!(!acc.is_available(&ledger).await.unwrap());
        assert_eq!(acc.pending_tx(), Some(&tx_id));

        ledger.set_status(&tx_id, TxStatus::Sealed);
        assert!(acc.is_available(&ledger).await.unwrap());
        assert!(acc.pending_tx().is_none());
    }

    #[tokio::test]
    async fn test_expired_releases_account() {
        let ledger = MockLedgerClient::new();
        let tx_id = "tx-2".to_string();
        ledger.set_status(&tx_id, TxStatus::Expired);

        let mut acc = account(0);
        acc.record_submission(tx_id);
        assert!(acc.is_available(&ledger).await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_until_settled_clears_pending() {
        let ledger = MockLedgerClient::new();
        let tx_id = "tx-3".to_string();
        ledger.set_status(&tx_id, TxStatus::Pending);

        let mut acc = account(0);
        assert!(acc.wait_until_settled(&ledger).await.unwrap().is_none());

        acc.record_submission(tx_id);
        let result = acc.wait_until_settled(&ledger).await.unwrap().unwrap();
        assert_eq!(result.status, TxStatus::Sealed);
        assert!(acc.pending_tx().is_none());
    }

    #[tokio::test]
    async fn test_create_recovers_sequence_number() {
        let ledger = MockLedgerClient::new();
        ledger.register_account(AccountInfo {
            address: "0x01".to_string(),
            keys: vec![
                AccountKey {
                    index: 0,
                    public_key: "aa".to_string(),
                    sequence_number: 3,
                    weight: 1000,
                    revoked: false,
                },
                AccountKey {
                    index: 1,
                    public_key: "bb".to_string(),
                    sequence_number: 17,
                    weight: 1000,
                    revoked: false,
                },
            ],
        });

        let acc = Account::create(&ledger, "0x01".to_string(), key_pair(), Some(1), None)
            .await
            .unwrap();
        assert_eq!(acc.key_id(), 1);
        assert_eq!(acc.peek_sequence_number(), 17);

        let missing_key = Account::create(&ledger, "0x01".to_string(), key_pair(), Some(9), None)
            .await
            .unwrap();
        assert_eq!(missing_key.peek_sequence_number(), 0);
    }

    #[tokio::test]
    async fn test_create_honors_explicit_zero() {
        let ledger = MockLedgerClient::new();
        // Unregistered address: any ledger lookup would fail.
        let acc = Account::create(&ledger, "0x99".to_string(), key_pair(), None, Some(0))
            .await
            .unwrap();
        assert_eq!(acc.peek_sequence_number(), 0);
        assert_eq!(acc.key_id(), DEFAULT_KEY_ID);
    }

    #[tokio::test]
    async fn test_create_propagates_network_error() {
        let ledger = MockLedgerClient::new();
        ledger.set_failing(true);
        let result = Account::create(&ledger, "0x01".to_string(), key_pair(), None, None).await;
        assert!(matches!(result, Err(LedgerError::Network(_))));
    }
}
