//! # In-Memory Pool Store
//!
//! Non-durable `PoolStore`, for tests and for hosts that do not persist.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::domain::{PersistedAccount, StoreError};
use crate::ports::outbound::PoolStore;

/// Pool store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct InMemoryPoolStore {
    accounts: RwLock<Vec<PersistedAccount>>,
    saves: AtomicUsize,
}

impl InMemoryPoolStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `accounts`.
    pub fn with_accounts(accounts: Vec<PersistedAccount>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            saves: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the saved pool.
    pub fn snapshot(&self) -> Vec<PersistedAccount> {
        self.accounts.read().clone()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PoolStore for InMemoryPoolStore {
    fn load(&self) -> Result<Vec<PersistedAccount>, StoreError> {
        Ok(self.accounts.read().clone())
    }

    fn save(&self, accounts: &[PersistedAccount]) -> Result<(), StoreError> {
        *self.accounts.write() = accounts.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
