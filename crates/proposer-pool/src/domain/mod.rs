//! # Domain Module
//!
//! Core domain types for the proposer pool.

pub mod account;
pub mod authorization;
pub mod config;
pub mod entities;
pub mod errors;
pub mod key_material;
pub mod value_objects;

pub use account::*;
pub use authorization::*;
pub use config::*;
pub use entities::*;
pub use errors::*;
pub use key_material::*;
pub use value_objects::*;
