//! Witnesses proving that a signer authorized a transaction.

use crate::types::hash::UInt160;
use neotx_derive::BinaryCodec;
use serde_json::{Value, json};

/// An invocation script (signatures) paired with the verification script
/// it satisfies.
#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct Witness {
    pub invocation_script: Vec<u8>,
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    /// Script hash of the account this witness verifies.
    pub fn script_hash(&self) -> UInt160 {
        UInt160::from_script(&self.verification_script)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "invocation": hex::encode(&self.invocation_script),
            "verification": hex::encode(&self.verification_script),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::encoding::{Decode, Encode};

    const VERIFICATION: &str = "21031d8e1630ce640966967bc6d95223d21f44304133003140c3b52004dc981349c968747476aa";

    #[test]
    fn layout_is_two_var_byte_scripts() {
        let witness = Witness::new(vec![0xaa], hex::decode(VERIFICATION).unwrap());
        let encoded = witness.to_hex();
        assert_eq!(&encoded[..6], "01aa27");
        assert_eq!(Witness::from_hex(&encoded).unwrap(), witness);
    }

    #[test]
    fn script_hash_is_hash160_of_verification() {
        let witness = Witness::new(Vec::new(), hex::decode(VERIFICATION).unwrap());
        assert_eq!(
            witness.script_hash(),
            UInt160::from_script(&hex::decode(VERIFICATION).unwrap())
        );
        assert_ne!(witness.script_hash(), UInt160::zero());
    }
}
