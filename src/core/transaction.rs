//! Transaction structure and wire codec.

use crate::core::attribute::TransactionAttribute;
use crate::core::signer::Signer;
use crate::core::witness::Witness;
use crate::types::encoding::{Encode, EncodeSink};
use crate::types::fixed8::Fixed8;
use crate::types::hash::{Sha256Sink, UInt256};
use neotx_derive::BinaryCodec;
use serde_json::{Value, json};

/// Current transaction format version.
pub const TX_VERSION: u8 = 0;

/// A ledger transaction.
///
/// Built by the caller, possibly corrected in place by the validator, then
/// serialized for signing and broadcast. Field order is the wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, BinaryCodec)]
pub struct Transaction {
    pub version: u8,
    pub signers: Vec<Signer>,
    pub attributes: Vec<TransactionAttribute>,
    pub script: Vec<u8>,
    /// Whole GAS units paid for script execution.
    pub system_fee: Fixed8,
    /// Fee paid for size and witness verification.
    pub network_fee: Fixed8,
    /// Last block height at which the transaction can be included.
    pub valid_until_block: u32,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            version: TX_VERSION,
            ..Self::default()
        }
    }

    pub fn with_script(mut self, script: Vec<u8>) -> Self {
        self.script = script;
        self
    }

    pub fn add_signer(&mut self, signer: Signer) -> &mut Self {
        self.signers.push(signer);
        self
    }

    pub fn add_attribute(&mut self, attribute: TransactionAttribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn add_witness(&mut self, witness: Witness) -> &mut Self {
        self.witnesses.push(witness);
        self
    }

    /// Writes every field except the witnesses.
    ///
    /// This is the part covered by signatures.
    pub fn encode_unsigned<S: EncodeSink>(&self, out: &mut S) {
        self.version.encode(out);
        self.signers.encode(out);
        self.attributes.encode(out);
        self.script.encode(out);
        self.system_fee.encode(out);
        self.network_fee.encode(out);
        self.valid_until_block.encode(out);
    }

    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_unsigned(&mut out);
        out
    }

    /// SHA-256 of the unsigned serialization.
    ///
    /// Displayed big-endian, like every other hash.
    pub fn hash(&self) -> UInt256 {
        let mut sink = Sha256Sink::new();
        self.encode_unsigned(&mut sink);
        sink.finalize()
    }

    /// Serialized size in bytes, witnesses included.
    pub fn size(&self) -> usize {
        self.encoded_len()
    }

    /// Human-facing export with named enums and `0x` hashes.
    pub fn to_json(&self) -> Value {
        json!({
            "hash": self.hash().to_string(),
            "size": self.size(),
            "version": self.version,
            "signers": self.signers.iter().map(Signer::to_json).collect::<Vec<_>>(),
            "attributes": self.attributes.iter().map(TransactionAttribute::to_json).collect::<Vec<_>>(),
            "script": hex::encode(&self.script),
            "sysfee": self.system_fee.to_string(),
            "netfee": self.network_fee.to_string(),
            "validuntilblock": self.valid_until_block,
            "witnesses": self.witnesses.iter().map(Witness::to_json).collect::<Vec<_>>(),
        })
    }
}
