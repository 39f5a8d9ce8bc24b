//! Serialized VM stack items, as returned by `System.Binary.Serialize` and
//! by RPC nodes in invocation results.
//!
//! Each item is a type byte followed by its payload: var-bytes for
//! primitives, a var-int count and that many children for containers.

use crate::types::encoding::{Decode, Encode, EncodeSink, EncodingError, Reader, write_var_bytes, write_var_int};
use crate::virtual_machine::contract_param::ContractParam;
use num_bigint::BigInt;
use num_traits::Zero;

/// Containers nested deeper than this are rejected.
pub const MAX_NESTING: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StackItemType {
    ByteArray = 0x00,
    Boolean = 0x01,
    Integer = 0x02,
    Array = 0x80,
    Struct = 0x81,
    Map = 0x82,
}

impl TryFrom<u8> for StackItemType {
    type Error = EncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => StackItemType::ByteArray,
            0x01 => StackItemType::Boolean,
            0x02 => StackItemType::Integer,
            0x80 => StackItemType::Array,
            0x81 => StackItemType::Struct,
            0x82 => StackItemType::Map,
            other => {
                return Err(EncodingError::InvalidValue(format!(
                    "unknown stack item type 0x{other:02x}"
                )));
            }
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackItem {
    ByteArray(Vec<u8>),
    Boolean(bool),
    Integer(BigInt),
    Array(Vec<StackItem>),
    Struct(Vec<StackItem>),
    Map(Vec<(StackItem, StackItem)>),
}

impl StackItem {
    pub fn item_type(&self) -> StackItemType {
        match self {
            StackItem::ByteArray(_) => StackItemType::ByteArray,
            StackItem::Boolean(_) => StackItemType::Boolean,
            StackItem::Integer(_) => StackItemType::Integer,
            StackItem::Array(_) => StackItemType::Array,
            StackItem::Struct(_) => StackItemType::Struct,
            StackItem::Map(_) => StackItemType::Map,
        }
    }

    /// Converts to a contract parameter. Maps have no parameter form.
    pub fn to_contract_param(&self) -> Option<ContractParam> {
        match self {
            StackItem::ByteArray(bytes) => Some(ContractParam::ByteArray(bytes.clone())),
            StackItem::Boolean(b) => Some(ContractParam::Boolean(*b)),
            StackItem::Integer(i) => Some(ContractParam::Integer(i.clone())),
            StackItem::Array(items) | StackItem::Struct(items) => items
                .iter()
                .map(StackItem::to_contract_param)
                .collect::<Option<Vec<_>>>()
                .map(ContractParam::Array),
            StackItem::Map(_) => None,
        }
    }

    fn decode_nested(reader: &mut Reader<'_>, depth: usize) -> Result<Self, EncodingError> {
        if depth > MAX_NESTING {
            return Err(EncodingError::InvalidValue(format!(
                "stack item nested deeper than {MAX_NESTING}"
            )));
        }
        let item_type = StackItemType::try_from(reader.read_u8()?)?;
        let item = match item_type {
            StackItemType::ByteArray => StackItem::ByteArray(reader.read_var_bytes()?.to_vec()),
            StackItemType::Boolean => {
                StackItem::Boolean(reader.read_var_bytes()?.iter().any(|&b| b != 0))
            }
            StackItemType::Integer => {
                StackItem::Integer(BigInt::from_signed_bytes_le(reader.read_var_bytes()?))
            }
            StackItemType::Array | StackItemType::Struct => {
                let count = reader.read_length()?;
                let mut items = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    items.push(Self::decode_nested(reader, depth + 1)?);
                }
                if item_type == StackItemType::Array {
                    StackItem::Array(items)
                } else {
                    StackItem::Struct(items)
                }
            }
            StackItemType::Map => {
                let count = reader.read_length()?;
                let mut entries = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    let key = Self::decode_nested(reader, depth + 1)?;
                    let value = Self::decode_nested(reader, depth + 1)?;
                    entries.push((key, value));
                }
                StackItem::Map(entries)
            }
        };
        Ok(item)
    }
}

impl Decode for StackItem {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        Self::decode_nested(reader, 0)
    }
}

impl Encode for StackItem {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[self.item_type() as u8]);
        match self {
            StackItem::ByteArray(bytes) => write_var_bytes(out, bytes),
            StackItem::Boolean(b) => write_var_bytes(out, &[*b as u8]),
            StackItem::Integer(i) => {
                let bytes = if i.is_zero() {
                    Vec::new()
                } else {
                    i.to_signed_bytes_le()
                };
                write_var_bytes(out, &bytes);
            }
            StackItem::Array(items) | StackItem::Struct(items) => {
                write_var_int(out, items.len() as u64);
                for item in items {
                    item.encode(out);
                }
            }
            StackItem::Map(entries) => {
                write_var_int(out, entries.len() as u64);
                for (key, value) in entries {
                    key.encode(out);
                    value.encode(out);
                }
            }
        }
    }
}
