//! Core value types shared by the codec, the script builder and the validator.
//!
//! - `encoding`: wire codec traits, the `Reader` cursor and var-int helpers
//! - `hash`: `UInt160` / `UInt256` and the digests that produce them
//! - `fixed8`: exact eight-decimal amounts
//! - `address`: base58 account addresses

pub mod address;
pub mod encoding;
pub mod fixed8;
pub mod hash;
