//! Fixed-size hash types and the digests used to derive them.
//!
//! Hashes are stored in wire order (little-endian) and displayed reversed,
//! which is how explorers and RPC nodes print them.

use crate::types::encoding::{EncodeSink, EncodingError, decode_hex};
use neotx_derive::BinaryCodec;
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

macro_rules! define_uint {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, BinaryCodec)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Size in bytes.
            pub const LEN: usize = $len;

            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            /// Builds from wire-order (little-endian) bytes.
            pub fn from_le_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| EncodingError::InvalidLength {
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(arr))
            }

            /// Parses the big-endian display form, with or without `0x`.
            pub fn from_be_hex(s: &str) -> Result<Self, EncodingError> {
                let mut bytes = decode_hex(s)?;
                if bytes.len() != $len {
                    return Err(EncodingError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                bytes.reverse();
                Self::from_le_slice(&bytes)
            }

            /// Parses wire-order hex.
            pub fn from_le_hex(s: &str) -> Result<Self, EncodingError> {
                Self::from_le_slice(&decode_hex(s)?)
            }

            pub fn as_le_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Big-endian bytes, as displayed.
            pub fn to_be_bytes(&self) -> [u8; $len] {
                let mut out = self.0;
                out.reverse();
                out
            }

            /// Big-endian hex without prefix.
            pub fn to_be_hex(&self) -> String {
                hex::encode(self.to_be_bytes())
            }

            /// Wire-order hex.
            pub fn to_le_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", self.to_be_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = EncodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_be_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_be_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_uint!(
    /// 20-byte script hash identifying an account or contract.
    UInt160,
    20
);

define_uint!(
    /// 32-byte hash identifying a transaction or asset.
    UInt256,
    32
);

impl UInt160 {
    /// Script hash of a verification or contract script.
    pub fn from_script(script: &[u8]) -> Self {
        Self(hash160(script))
    }
}

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, used for checksums and block hashes.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 over SHA-256, used for script hashes.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// Incremental SHA-256 hasher.
///
/// Implements [`EncodeSink`] so encodable types can be hashed directly
/// without building the serialized buffer first.
#[derive(Default)]
pub struct Sha256Sink {
    hasher: Sha256,
}

impl Sha256Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalize(self) -> UInt256 {
        UInt256(self.hasher.finalize().into())
    }
}

impl EncodeSink for Sha256Sink {
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }
}
