//! Transaction model and the logic built around it.
//!
//! - [`transaction`]: the transaction and its wire codec
//! - [`signer`], [`attribute`], [`witness`]: transaction components
//! - [`fees`]: network fee calculation
//! - [`validator`]: checks and auto-fixes against network state
//! - [`coin_selection`]: greedy input selection for UTXO transfers

pub mod attribute;
pub mod coin_selection;
pub mod fees;
pub mod signer;
pub mod transaction;
pub mod validator;
pub mod witness;
