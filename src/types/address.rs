//! Base58 account addresses.
//!
//! An address is `base58(version || script_hash_le || checksum)` where the
//! checksum is the first four bytes of `hash256(version || script_hash_le)`.

use crate::types::encoding::EncodingError;
use crate::types::hash::{UInt160, hash256};

/// Address version byte used by the public networks.
pub const ADDRESS_VERSION: u8 = 0x35;

const CHECKSUM_LEN: usize = 4;
const ADDRESS_PAYLOAD_LEN: usize = 1 + UInt160::LEN;

/// Encodes a script hash as an address with the given version byte.
pub fn script_hash_to_address(hash: &UInt160, version: u8) -> String {
    let mut payload = Vec::with_capacity(ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN);
    payload.push(version);
    payload.extend_from_slice(hash.as_le_bytes());
    let checksum = hash256(&payload);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(payload).into_string()
}

/// Decodes an address back to its script hash, verifying version and checksum.
pub fn address_to_script_hash(address: &str, version: u8) -> Result<UInt160, EncodingError> {
    let raw = bs58::decode(address)
        .into_vec()
        .map_err(|e| EncodingError::InvalidValue(format!("address {address:?} is not base58: {e}")))?;
    if raw.len() != ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN {
        return Err(EncodingError::InvalidLength {
            expected: ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN,
            actual: raw.len(),
        });
    }
    let (payload, checksum) = raw.split_at(ADDRESS_PAYLOAD_LEN);
    if hash256(payload)[..CHECKSUM_LEN] != *checksum {
        return Err(EncodingError::InvalidValue(format!(
            "address {address:?} has a bad checksum"
        )));
    }
    if payload[0] != version {
        return Err(EncodingError::InvalidValue(format!(
            "address {address:?} has version 0x{:02x}, expected 0x{version:02x}",
            payload[0]
        )));
    }
    UInt160::from_le_slice(&payload[1..])
}

/// True when `s` decodes as an address of the given version.
pub fn is_address(s: &str, version: u8) -> bool {
    address_to_script_hash(s, version).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> UInt160 {
        UInt160::from_be_hex("0x5b7074e873973a6ed3708862f219a6fbf4d1c411").unwrap()
    }

    #[test]
    fn address_roundtrip() {
        let hash = sample_hash();
        let address = script_hash_to_address(&hash, ADDRESS_VERSION);
        assert_eq!(address_to_script_hash(&address, ADDRESS_VERSION).unwrap(), hash);
        assert!(is_address(&address, ADDRESS_VERSION));
    }

    #[test]
    fn version_prefix_is_n() {
        // 0x35 maps every 25-byte payload into the 'N' range of base58.
        let address = script_hash_to_address(&sample_hash(), ADDRESS_VERSION);
        assert!(address.starts_with('N'), "{address}");
    }

    #[test]
    fn wrong_version_rejected() {
        let address = script_hash_to_address(&sample_hash(), 0x17);
        assert!(address_to_script_hash(&address, ADDRESS_VERSION).is_err());
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut address = script_hash_to_address(&sample_hash(), ADDRESS_VERSION);
        let last = address.pop().unwrap();
        address.push(if last == '1' { '2' } else { '1' });
        assert!(!is_address(&address, ADDRESS_VERSION));
    }

    #[test]
    fn garbage_rejected() {
        assert!(!is_address("1", ADDRESS_VERSION));
        assert!(!is_address("0OIl", ADDRESS_VERSION));
        assert!(!is_address("", ADDRESS_VERSION));
    }
}
