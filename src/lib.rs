//! Transaction construction for a NEO-style ledger.
//!
//! Builds VM scripts from typed contract parameters, encodes and decodes
//! transactions, validates them against live network state with optional
//! auto-fix, and selects coins for UTXO transfers.

pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod types;
pub mod utils;
pub mod virtual_machine;

pub use error::{Error, Result};
