//! # Pool Directory Locking
//!
//! Keeps a second process from writing the same pool file. Two writers would
//! each overwrite the other's pool and reuse sequence numbers.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::StoreError;

/// Exclusive lock on a pool directory, released on drop.
#[derive(Debug)]
pub struct PoolLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl PoolLock {
    /// Lock file name
    pub const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock on `dir`.
    ///
    /// # Errors
    ///
    /// `StoreError::AlreadyLocked` if another holder has it.
    pub fn acquire(dir: &Path) -> Result<Self, StoreError> {
        let lock_path = dir.join(Self::LOCK_FILE);

        // No truncate here: the holder's PID must stay readable for the error.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        file.set_len(0)?;
        writeln!(file, "{}", pid)?;
        file.sync_all()?;

        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    /// PID written by this holder.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for PoolLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_writes_pid() {
        let dir = tempfile::tempdir().unwrap();

        let lock = PoolLock::acquire(dir.path()).expect("Should acquire lock");
        let content = std::fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim().parse::<u32>().unwrap(), std::process::id());
        assert_eq!(lock.pid(), std::process::id());
    }

    #[test]
    fn test_double_lock_fails_with_holder_pid() {
        let dir = tempfile::tempdir().unwrap();

        let _held = PoolLock::acquire(dir.path()).expect("First lock should succeed");
        match PoolLock::acquire(dir.path()) {
            Err(StoreError::AlreadyLocked { pid, path }) => {
                assert_eq!(pid, Some(std::process::id()));
                assert!(path.ends_with(PoolLock::LOCK_FILE));
            }
            other => panic!("expected AlreadyLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();

        {
            let _lock = PoolLock::acquire(dir.path()).expect("Should acquire");
        }
        assert!(!dir.path().join(PoolLock::LOCK_FILE).exists());

        PoolLock::acquire(dir.path()).expect("Should acquire after release");
    }
}
