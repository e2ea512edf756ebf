//! # Pool Configuration
//!
//! Runtime parameters for the `AccountManager`. All values have defaults;
//! `from_env` applies `PROPOSER_POOL_*` overrides on top of them.

use std::time::Duration;

use tracing::{info, warn};

/// Event type emitted by the ledger when an account is created.
pub const ACCOUNT_CREATED_EVENT: &str = "flow.AccountCreated";

/// Transaction that creates an account paid for by the signer and adds the
/// RLP-encoded public key passed as its only argument.
pub const CREATE_ACCOUNT_TRANSACTION: &str = r#"
transaction(publicKey: String) {
  prepare(signer: AuthAccount) {
    let account = AuthAccount(payer: signer)
    account.addPublicKey(publicKey.decodeHex())
  }
}
"#;

/// Default spacing between submissions.
pub const DEFAULT_SUBMISSION_INTERVAL: Duration = Duration::from_millis(100);

/// Default compute limit attached to every transaction.
pub const DEFAULT_COMPUTE_LIMIT: u64 = 9999;

/// Default bound on any single settlement wait.
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable overriding the submission interval (milliseconds).
pub const ENV_SUBMISSION_INTERVAL_MS: &str = "PROPOSER_POOL_SUBMISSION_INTERVAL_MS";
/// Environment variable overriding the compute limit.
pub const ENV_COMPUTE_LIMIT: &str = "PROPOSER_POOL_COMPUTE_LIMIT";
/// Environment variable overriding the settlement timeout (seconds).
pub const ENV_SETTLEMENT_TIMEOUT_SECS: &str = "PROPOSER_POOL_SETTLEMENT_TIMEOUT_SECS";

/// Account manager configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Minimum spacing between consecutive submissions (network rate limit).
    pub submission_interval: Duration,

    /// Compute limit for every submitted transaction.
    pub compute_limit: u64,

    /// Upper bound on each wait for a transaction to seal.
    ///
    /// Expiry surfaces `PoolError::SettlementTimeout`.
    pub settlement_timeout: Duration,

    /// Event type that carries the new account's address.
    pub account_created_event: String,

    /// Script submitted to create pool accounts.
    pub create_account_code: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            submission_interval: DEFAULT_SUBMISSION_INTERVAL,
            compute_limit: DEFAULT_COMPUTE_LIMIT,
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            account_created_event: ACCOUNT_CREATED_EVENT.to_string(),
            create_account_code: CREATE_ACCOUNT_TRANSACTION.to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `PROPOSER_POOL_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SUBMISSION_INTERVAL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => {
                    self.submission_interval = Duration::from_millis(ms);
                    info!("[proposer-pool] Submission interval set to {}ms", ms);
                }
                Err(_) => warn!("{} must be an integer, got {:?}", ENV_SUBMISSION_INTERVAL_MS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_COMPUTE_LIMIT) {
            match raw.trim().parse::<u64>() {
                Ok(limit) => self.compute_limit = limit,
                Err(_) => warn!("{} must be an integer, got {:?}", ENV_COMPUTE_LIMIT, raw),
            }
        }

        if let Some(raw) = lookup(ENV_SETTLEMENT_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.settlement_timeout = Duration::from_secs(secs),
                Err(_) => warn!("{} must be an integer, got {:?}", ENV_SETTLEMENT_TIMEOUT_SECS, raw),
            }
        }

        self
    }

    /// Set the submission interval.
    pub fn with_submission_interval(mut self, interval: Duration) -> Self {
        self.submission_interval = interval;
        self
    }

    /// Set the compute limit.
    pub fn with_compute_limit(mut self, limit: u64) -> Self {
        self.compute_limit = limit;
        self
    }

    /// Set the settlement timeout.
    pub fn with_settlement_timeout(mut self, timeout: Duration) -> Self {
        self.settlement_timeout = timeout;
        self
    }

    /// Set the account-created event type.
    pub fn with_account_created_event(mut self, event_type: impl Into<String>) -> Self {
        self.account_created_event = event_type.into();
        self
    }
}
