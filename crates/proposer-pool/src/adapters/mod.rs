//! # Adapters Layer (Hexagonal Architecture)
//!
//! Default implementations of the outbound ports, except the ledger client
//! which the host supplies.

mod file_store;
mod lock;
mod memory_store;
mod p256_signer;
mod rlp_encoder;

pub use file_store::JsonFilePoolStore;
pub use lock::PoolLock;
pub use memory_store::InMemoryPoolStore;
pub use p256_signer::P256Signer;
pub use rlp_encoder::RlpKeyEncoder;
