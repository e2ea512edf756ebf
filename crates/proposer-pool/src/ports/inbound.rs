//! # Inbound Ports
//!
//! API trait defining what the proposer pool offers its callers.

use async_trait::async_trait;

use crate::domain::{Account, PoolError, TransactionArgument, TxId};

/// Proposer pool API - inbound port.
///
/// Operations take `&mut self`: one caller drives the pool at a time. Share a
/// pool between tasks through `SharedAccountManager`.
#[async_trait]
pub trait ProposerPoolApi: Send + Sync {
    /// Submit a transaction proposed by a free pool account and paid for by
    /// the main account. Returns without waiting for settlement.
    async fn mutate(
        &mut self,
        code: &str,
        arguments: Vec<TransactionArgument>,
    ) -> Result<TxId, PoolError>;

    /// First available pool account, minting a new one when all are busy.
    async fn get_account(&mut self) -> Result<&Account, PoolError>;

    /// Mint a new pool account funded by the main account.
    async fn create_new_account(&mut self) -> Result<&Account, PoolError>;

    /// Number of pool accounts (main account excluded).
    fn pool_len(&self) -> usize;
}
