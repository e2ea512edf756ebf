//! # JSON File Pool Store
//!
//! Keeps the pool in `<dir>/accounts.json` as a JSON array of
//! `{address, keyPair: {public, private}, keyId, seqNum}` records.
//!
//! ## Write Protocol
//!
//! 1. Serialize the whole pool to `accounts.json.tmp`
//! 2. fsync the temp file
//! 3. Rename over `accounts.json`
//! 4. fsync the directory (Unix)
//!
//! A crash leaves either the old or the new file, never a partial one. The
//! directory is locked for the lifetime of the store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::lock::PoolLock;
use crate::domain::{PersistedAccount, StoreError};
use crate::ports::outbound::PoolStore;

/// File-backed pool store.
#[derive(Debug)]
pub struct JsonFilePoolStore {
    path: PathBuf,
    _lock: PoolLock,
}

impl JsonFilePoolStore {
    /// Pool file name
    pub const FILE_NAME: &'static str = "accounts.json";

    /// Open (creating if needed) the pool directory and lock it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let lock = PoolLock::acquire(dir)?;

        Ok(Self {
            path: dir.join(Self::FILE_NAME),
            _lock: lock,
        })
    }

    /// Path of the pool file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl PoolStore for JsonFilePoolStore {
    fn load(&self) -> Result<Vec<PersistedAccount>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, accounts: &[PersistedAccount]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(accounts)?;

        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;
        #[cfg(unix)]
        if let Some(dir) = self.path.parent() {
            File::open(dir)?.sync_all()?;
        }

        debug!(
            "[proposer-pool] Saved {} accounts to {}",
            accounts.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{KeyPair, PrivateKey};

    fn record(address: &str, seq_num: u64) -> PersistedAccount {
        PersistedAccount {
            address: address.to_string(),
            key_pair: KeyPair::new("ab".repeat(64), PrivateKey::new(vec![9u8; 32])),
            key_id: 0,
            seq_num,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePoolStore::open(dir.path()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePoolStore::open(dir.path()).unwrap();

        let pool = vec![record("0x02", 7), record("0x01", 0)];
        store.save(&pool).unwrap();
        assert_eq!(store.load().unwrap(), pool);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_saved_pool_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let pool = vec![record("0x01", 5), record("0x02", 0)];
        {
            let store = JsonFilePoolStore::open(dir.path()).unwrap();
            store.save(&pool).unwrap();
        }

        let reopened = JsonFilePoolStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load().unwrap(), pool);
        assert!(!reopened.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePoolStore::open(dir.path()).unwrap();

        store.save(&[record("0x01", 1), record("0x02", 2)]).unwrap();
        store.save(&[record("0x03", 3)]).unwrap();
        assert_eq!(store.load().unwrap(), vec![record("0x03", 3)]);
    }

    #[test]
    fn test_file_uses_pool_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePoolStore::open(dir.path()).unwrap();
        store.save(&[record("0x01", 4)]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["address"], "0x01");
        assert_eq!(raw[0]["keyId"], 0);
        assert_eq!(raw[0]["seqNum"], 4);
        assert_eq!(raw[0]["keyPair"]["private"], "09".repeat(32));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePoolStore::open(dir.path()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_second_store_on_same_dir_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let _store = JsonFilePoolStore::open(dir.path()).unwrap();

        assert!(matches!(
            JsonFilePoolStore::open(dir.path()),
            Err(StoreError::AlreadyLocked { .. })
        ));
    }
}
