//! Network collaborator used by the validator.
//!
//! - [`client`]: the [`NetworkClient`] trait and its error type
//! - [`local_client`]: in-memory implementation for offline use and tests

pub mod client;
pub mod local_client;

pub use client::{InvokeResult, NetworkClient, NetworkError};
