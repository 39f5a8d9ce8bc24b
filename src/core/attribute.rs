//! Transaction attributes.

use crate::error::Error;
use crate::types::encoding::{Decode, Encode, EncodeSink, EncodingError, Reader, decode_hex, write_var_bytes};
use crate::virtual_machine::errors::NotFoundError;
use neotx_derive::BinaryCodec;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Largest attribute payload accepted on the wire.
pub const MAX_ATTRIBUTE_DATA: usize = 65535;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, BinaryCodec)]
pub enum AttributeUsage {
    Url = 0x81,
}

impl AttributeUsage {
    const NAMES: [(AttributeUsage, &'static str); 1] = [(AttributeUsage::Url, "Url")];
}

impl fmt::Display for AttributeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Self::NAMES
            .iter()
            .find(|(usage, _)| usage == self)
            .map_or("Unknown", |(_, name)| name);
        f.write_str(name)
    }
}

impl FromStr for AttributeUsage {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(usage, _)| *usage)
            .ok_or_else(|| NotFoundError::EnumName {
                kind: "AttributeUsage",
                name: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionAttribute {
    pub usage: AttributeUsage,
    data: Vec<u8>,
}

impl TransactionAttribute {
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> Result<Self, EncodingError> {
        if data.len() > MAX_ATTRIBUTE_DATA {
            return Err(EncodingError::LengthOverflow(data.len() as u64));
        }
        Ok(Self { usage, data })
    }

    /// A `Url` attribute carrying the ASCII bytes of `url`.
    pub fn url(url: &str) -> Result<Self, EncodingError> {
        Self::new(AttributeUsage::Url, url.as_bytes().to_vec())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_json(&self) -> Value {
        json!({ "usage": self.usage.to_string(), "data": hex::encode(&self.data) })
    }

    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| EncodingError::InvalidValue(format!("attribute missing `{name}`")))
        };
        let usage: AttributeUsage = field("usage")?.parse()?;
        Ok(Self::new(usage, decode_hex(field("data")?)?)?)
    }
}

impl Encode for TransactionAttribute {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.usage.encode(out);
        write_var_bytes(out, &self.data);
    }
}

impl Decode for TransactionAttribute {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        let usage = AttributeUsage::decode(reader)?;
        let data = reader.read_var_bytes()?.to_vec();
        Self::new(usage, data)
    }
}
