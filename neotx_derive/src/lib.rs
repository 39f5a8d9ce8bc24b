//! Derive macros for the neotx crate.
//!
//! Provides:
//! - `#[derive(BinaryCodec)]` - wire serialization through `Encode`/`Decode`
//! - `#[derive(Error)]` - error type boilerplate with `#[from]` conversions

mod binary_codec;
mod error;

use proc_macro::TokenStream;

/// Automatically implements `Encode` and `Decode` traits for binary serialization.
#[proc_macro_derive(BinaryCodec, attributes(binary_codec))]
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    binary_codec::derive_binary_codec(input)
}

/// Automatically implements `Display`, `Error` and `From` for error types.
#[proc_macro_derive(Error, attributes(error, from))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
