//! Typed contract invocation parameters.
//!
//! A [`ContractParam`] carries a value that always matches its declared
//! [`ContractParamType`]. Constructors coerce loose caller input (numbers,
//! decimal strings, addresses) into the typed form; JSON import checks the
//! pairing and rejects mismatches.

use crate::error::Error;
use crate::types::address::{ADDRESS_VERSION, address_to_script_hash, is_address};
use crate::types::encoding::{EncodingError, decode_hex};
use crate::types::fixed8::{DECIMALS, parse_scaled};
use crate::types::hash::{UInt160, UInt256};
use crate::virtual_machine::errors::{NotFoundError, ParamError};
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Parameter type tags as used by contract manifests and RPC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContractParamType {
    Signature = 0x00,
    Boolean = 0x01,
    Integer = 0x02,
    Hash160 = 0x03,
    Hash256 = 0x04,
    ByteArray = 0x05,
    PublicKey = 0x06,
    String = 0x07,
    Array = 0x10,
    InteropInterface = 0xf0,
    Void = 0xff,
}

const PARAM_TYPE_NAMES: &[(ContractParamType, &str)] = &[
    (ContractParamType::Signature, "Signature"),
    (ContractParamType::Boolean, "Boolean"),
    (ContractParamType::Integer, "Integer"),
    (ContractParamType::Hash160, "Hash160"),
    (ContractParamType::Hash256, "Hash256"),
    (ContractParamType::ByteArray, "ByteArray"),
    (ContractParamType::PublicKey, "PublicKey"),
    (ContractParamType::String, "String"),
    (ContractParamType::Array, "Array"),
    (ContractParamType::InteropInterface, "InteropInterface"),
    (ContractParamType::Void, "Void"),
];

impl ContractParamType {
    pub fn name(self) -> &'static str {
        PARAM_TYPE_NAMES
            .iter()
            .find(|(t, _)| *t == self)
            .map_or("Unknown", |(_, name)| name)
    }

    pub fn from_name(name: &str) -> Result<Self, NotFoundError> {
        PARAM_TYPE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(t, _)| *t)
            .ok_or_else(|| NotFoundError::EnumName {
                kind: "ContractParamType",
                name: name.to_string(),
            })
    }

    pub fn byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ContractParamType {
    type Error = NotFoundError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PARAM_TYPE_NAMES
            .iter()
            .find(|(t, _)| t.byte() == value)
            .map(|(t, _)| *t)
            .ok_or_else(|| NotFoundError::EnumName {
                kind: "ContractParamType",
                name: format!("0x{value:02x}"),
            })
    }
}

impl fmt::Display for ContractParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a string handed to [`ContractParam::byte_array`] is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ByteArrayFormat {
    /// Hex bytes, stored as given.
    Hex,
    /// An address, stored as its little-endian script hash.
    Address,
    /// A decimal amount, stored as an 8-byte little-endian integer scaled
    /// by `10^precision`.
    Fixed8 { precision: u8 },
}

impl ByteArrayFormat {
    /// Fixed8 at full eight-digit precision.
    pub const FIXED8: ByteArrayFormat = ByteArrayFormat::Fixed8 { precision: 8 };
}

/// A contract parameter whose value always matches its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractParam {
    Signature(Vec<u8>),
    Boolean(bool),
    Integer(BigInt),
    Hash160(UInt160),
    Hash256(UInt256),
    ByteArray(Vec<u8>),
    PublicKey(Vec<u8>),
    String(String),
    Array(Vec<ContractParam>),
    InteropInterface,
    Void,
}

/// Loose truthiness used by [`ContractParam::boolean`].
pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

impl Truthy for i64 {
    fn truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for &str {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::truthy)
    }
}

/// Inputs accepted by [`ContractParam::integer`].
pub trait IntegerInput {
    fn to_bigint(&self) -> Result<BigInt, EncodingError>;
}

impl IntegerInput for i64 {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        Ok(BigInt::from(*self))
    }
}

impl IntegerInput for u64 {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        Ok(BigInt::from(*self))
    }
}

impl IntegerInput for i32 {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        Ok(BigInt::from(*self))
    }
}

/// Rounds to the nearest whole number, halves toward positive infinity.
impl IntegerInput for f64 {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        BigInt::from_f64((self + 0.5).floor())
            .ok_or_else(|| EncodingError::InvalidValue(format!("{self} is not a finite number")))
    }
}

/// Drops any fractional part after `.`; digits before it may be arbitrarily long.
impl IntegerInput for &str {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        let whole = self.trim().split('.').next().unwrap_or_default();
        let whole = match whole {
            "" | "-" | "+" => "0",
            w => w,
        };
        BigInt::from_str(whole)
            .map_err(|_| EncodingError::InvalidValue(format!("{self:?} is not an integer")))
    }
}

impl IntegerInput for BigInt {
    fn to_bigint(&self) -> Result<BigInt, EncodingError> {
        Ok(self.clone())
    }
}

impl ContractParam {
    pub fn string(value: impl Into<String>) -> Self {
        ContractParam::String(value.into())
    }

    pub fn boolean(value: impl Truthy) -> Self {
        ContractParam::Boolean(value.truthy())
    }

    pub fn integer(value: impl IntegerInput) -> Result<Self, EncodingError> {
        value.to_bigint().map(ContractParam::Integer)
    }

    /// Accepts an address or a big-endian 20-byte hex script hash.
    pub fn hash160(value: &str) -> Result<Self, EncodingError> {
        if is_address(value, ADDRESS_VERSION) {
            return address_to_script_hash(value, ADDRESS_VERSION).map(ContractParam::Hash160);
        }
        UInt160::from_be_hex(value).map(ContractParam::Hash160)
    }

    /// Accepts a big-endian 32-byte hex hash.
    pub fn hash256(value: &str) -> Result<Self, EncodingError> {
        UInt256::from_be_hex(value).map(ContractParam::Hash256)
    }

    /// Accepts a compressed (33-byte) or uncompressed (65-byte) hex key.
    pub fn public_key(value: &str) -> Result<Self, EncodingError> {
        let bytes = decode_hex(value)?;
        if bytes.len() != 33 && bytes.len() != 65 {
            return Err(EncodingError::InvalidLength {
                expected: 33,
                actual: bytes.len(),
            });
        }
        Ok(ContractParam::PublicKey(bytes))
    }

    pub fn signature(value: &str) -> Result<Self, EncodingError> {
        decode_hex(value).map(ContractParam::Signature)
    }

    /// Builds a byte array from a string in the given format.
    pub fn byte_array(value: &str, format: ByteArrayFormat) -> Result<Self, EncodingError> {
        let bytes = match format {
            ByteArrayFormat::Hex => decode_hex(value)?,
            ByteArrayFormat::Address => address_to_script_hash(value, ADDRESS_VERSION)?
                .as_le_bytes()
                .to_vec(),
            ByteArrayFormat::Fixed8 { precision } => fixed8_bytes(value, precision)?.to_vec(),
        };
        Ok(ContractParam::ByteArray(bytes))
    }

    /// Fixed8 byte array from a float, e.g. `fixed8(100.5, 8)`.
    pub fn fixed8(value: f64, precision: u8) -> Result<Self, EncodingError> {
        if !value.is_finite() {
            return Err(EncodingError::InvalidValue(format!(
                "{value} is not a finite number"
            )));
        }
        Self::byte_array(&format!("{value}"), ByteArrayFormat::Fixed8 { precision })
    }

    pub fn array(params: impl IntoIterator<Item = ContractParam>) -> Self {
        ContractParam::Array(params.into_iter().collect())
    }

    pub fn param_type(&self) -> ContractParamType {
        match self {
            ContractParam::Signature(_) => ContractParamType::Signature,
            ContractParam::Boolean(_) => ContractParamType::Boolean,
            ContractParam::Integer(_) => ContractParamType::Integer,
            ContractParam::Hash160(_) => ContractParamType::Hash160,
            ContractParam::Hash256(_) => ContractParamType::Hash256,
            ContractParam::ByteArray(_) => ContractParamType::ByteArray,
            ContractParam::PublicKey(_) => ContractParamType::PublicKey,
            ContractParam::String(_) => ContractParamType::String,
            ContractParam::Array(_) => ContractParamType::Array,
            ContractParam::InteropInterface => ContractParamType::InteropInterface,
            ContractParam::Void => ContractParamType::Void,
        }
    }

    /// Builds a parameter from a type tag and a loosely typed value.
    ///
    /// Fails when the value's shape cannot represent the type, e.g. an
    /// `Array` tag paired with a string.
    pub fn new(param_type: ContractParamType, value: &Value) -> Result<Self, Error> {
        let mismatch = || ParamError::TypeMismatch {
            param_type: param_type.name(),
            value: value.to_string(),
        };
        let param = match (param_type, value) {
            (ContractParamType::String, Value::String(s)) => ContractParam::string(s.as_str()),
            (ContractParamType::Boolean, Value::Bool(b)) => ContractParam::Boolean(*b),
            (ContractParamType::Boolean, Value::Number(n)) => {
                ContractParam::boolean(n.as_f64().unwrap_or_default())
            }
            (ContractParamType::Boolean, Value::String(s)) => ContractParam::boolean(s.as_str()),
            (ContractParamType::Integer, Value::String(s)) => ContractParam::integer(s.as_str())?,
            (ContractParamType::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => ContractParam::integer(i)?,
                None => ContractParam::integer(n.as_f64().ok_or_else(mismatch)?)?,
            },
            (ContractParamType::Hash160, Value::String(s)) => ContractParam::hash160(s)?,
            (ContractParamType::Hash256, Value::String(s)) => ContractParam::hash256(s)?,
            (ContractParamType::ByteArray, Value::String(s)) => {
                ContractParam::byte_array(s, ByteArrayFormat::Hex)?
            }
            (ContractParamType::PublicKey, Value::String(s)) => ContractParam::public_key(s)?,
            (ContractParamType::Signature, Value::String(s)) => ContractParam::signature(s)?,
            (ContractParamType::Array, Value::Array(items)) => ContractParam::Array(
                items
                    .iter()
                    .map(ContractParam::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (ContractParamType::InteropInterface, Value::Null) => ContractParam::InteropInterface,
            (ContractParamType::Void, Value::Null) => ContractParam::Void,
            _ => return Err(mismatch().into()),
        };
        Ok(param)
    }

    /// Parses `{"type": "...", "value": ...}`.
    pub fn from_json(json: &Value) -> Result<Self, Error> {
        let type_name = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ParamError::MalformedJson(json.to_string()))?;
        let param_type = ContractParamType::from_name(type_name)?;
        ContractParam::new(param_type, json.get("value").unwrap_or(&Value::Null))
    }

    /// Exports as `{"type": "...", "value": ...}`, recursing through arrays.
    pub fn to_json(&self) -> Value {
        let value = match self {
            ContractParam::Signature(bytes)
            | ContractParam::ByteArray(bytes)
            | ContractParam::PublicKey(bytes) => Value::String(hex::encode(bytes)),
            ContractParam::Boolean(b) => Value::Bool(*b),
            ContractParam::Integer(i) => Value::String(i.to_string()),
            ContractParam::Hash160(h) => Value::String(h.to_be_hex()),
            ContractParam::Hash256(h) => Value::String(h.to_be_hex()),
            ContractParam::String(s) => Value::String(s.clone()),
            ContractParam::Array(items) => {
                Value::Array(items.iter().map(ContractParam::to_json).collect())
            }
            ContractParam::InteropInterface | ContractParam::Void => Value::Null,
        };
        json!({ "type": self.param_type().name(), "value": value })
    }
}

/// Converts a decimal string into the 8-byte little-endian integer scaled
/// by `10^precision`.
///
/// The value is first rounded to eight places; any nonzero digit beyond
/// `precision` after that is a precision error.
pub fn fixed8_bytes(value: &str, precision: u8) -> Result<[u8; 8], EncodingError> {
    if precision as u32 > DECIMALS {
        return Err(EncodingError::InvalidValue(format!(
            "precision {precision} exceeds {DECIMALS}"
        )));
    }
    let (scaled, _) = parse_scaled(value, DECIMALS)?;
    let divisor = 10i128.pow(DECIMALS - precision as u32);
    if scaled % divisor != 0 {
        return Err(EncodingError::WrongPrecision {
            expected: precision,
        });
    }
    let units = i64::try_from(scaled / divisor)
        .map_err(|_| EncodingError::InvalidValue(format!("amount {value:?} out of range")))?;
    Ok(units.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::address::script_hash_to_address;

    // ========== Coercion Tests ==========

    #[test]
    fn string_is_verbatim() {
        assert_eq!(ContractParam::string("hello"), ContractParam::String("hello".into()));
    }

    #[test]
    fn boolean_truthiness() {
        assert_eq!(ContractParam::boolean(0i64), ContractParam::Boolean(false));
        assert_eq!(ContractParam::boolean(2i64), ContractParam::Boolean(true));
        assert_eq!(ContractParam::boolean("0"), ContractParam::Boolean(true));
        assert_eq!(ContractParam::boolean(""), ContractParam::Boolean(false));
        assert_eq!(ContractParam::boolean(None::<bool>), ContractParam::Boolean(false));
        assert_eq!(ContractParam::boolean(f64::NAN), ContractParam::Boolean(false));
    }

    #[test]
    fn integer_rounds_numbers_and_truncates_strings() {
        assert_eq!(ContractParam::integer(1.5f64).unwrap(), ContractParam::Integer(2.into()));
        assert_eq!(ContractParam::integer(1.4f64).unwrap(), ContractParam::Integer(1.into()));
        assert_eq!(ContractParam::integer(-1.5f64).unwrap(), ContractParam::Integer((-1).into()));
        assert_eq!(ContractParam::integer(-1.6f64).unwrap(), ContractParam::Integer((-2).into()));
        assert_eq!(ContractParam::integer(-0.4f64).unwrap(), ContractParam::Integer(0.into()));
        assert_eq!(ContractParam::integer("12.99").unwrap(), ContractParam::Integer(12.into()));
        assert_eq!(ContractParam::integer("-7.5").unwrap(), ContractParam::Integer((-7).into()));
        assert!(ContractParam::integer("abc").is_err());
        assert!(ContractParam::integer(f64::INFINITY).is_err());
    }

    #[test]
    fn integer_preserves_big_values() {
        let big = "123456789012345678901234567890";
        match ContractParam::integer(big).unwrap() {
            ContractParam::Integer(i) => assert_eq!(i.to_string(), big),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hash160_accepts_address_or_hash() {
        let hash_hex = "5b7074e873973a6ed3708862f219a6fbf4d1c411";
        let hash = UInt160::from_be_hex(hash_hex).unwrap();
        let address = script_hash_to_address(&hash, ADDRESS_VERSION);

        let from_address = ContractParam::hash160(&address).unwrap();
        let from_hex = ContractParam::hash160(hash_hex).unwrap();
        assert_eq!(from_address, from_hex);
        assert!(ContractParam::hash160("1").is_err());
    }

    // ========== ByteArray Tests ==========

    #[test]
    fn byte_array_fixed8_default_precision() {
        let param = ContractParam::fixed8(100.012345678, 8).unwrap();
        assert_eq!(
            param,
            ContractParam::ByteArray(hex::decode("88ba1e5402000000").unwrap())
        );
    }

    #[test]
    fn byte_array_fixed8_custom_precision() {
        assert_eq!(
            ContractParam::fixed8(1.0, 0).unwrap(),
            ContractParam::ByteArray(hex::decode("0100000000000000").unwrap())
        );
        assert_eq!(
            ContractParam::fixed8(222.1234, 4).unwrap(),
            ContractParam::ByteArray(hex::decode("b2e4210000000000").unwrap())
        );
    }

    #[test]
    fn byte_array_fixed8_wrong_precision() {
        assert_eq!(
            ContractParam::fixed8(222.12345, 4),
            Err(EncodingError::WrongPrecision { expected: 4 })
        );
        assert_eq!(
            ContractParam::fixed8(222.12345, 4).unwrap_err().to_string(),
            "wrong precision: expected 4"
        );
    }

    #[test]
    fn byte_array_from_address_is_little_endian() {
        let hash = UInt160::from_be_hex("5b7074e873973a6ed3708862f219a6fbf4d1c411").unwrap();
        let address = script_hash_to_address(&hash, ADDRESS_VERSION);
        assert_eq!(
            ContractParam::byte_array(&address, ByteArrayFormat::Address).unwrap(),
            ContractParam::ByteArray(hash.as_le_bytes().to_vec())
        );
    }

    #[test]
    fn byte_array_hex_rejects_malformed() {
        assert!(ContractParam::byte_array("xyz", ByteArrayFormat::Hex).is_err());
    }

    // ========== JSON Tests ==========

    #[test]
    fn export_recurses_arrays() {
        let param = ContractParam::array([
            ContractParam::string("a"),
            ContractParam::array([ContractParam::Boolean(true)]),
        ]);
        assert_eq!(
            param.to_json(),
            json!({
                "type": "Array",
                "value": [
                    {"type": "String", "value": "a"},
                    {"type": "Array", "value": [{"type": "Boolean", "value": true}]}
                ]
            })
        );
    }

    #[test]
    fn import_matches_export() {
        let param = ContractParam::array([
            ContractParam::Integer(42.into()),
            ContractParam::hash160("5b7074e873973a6ed3708862f219a6fbf4d1c411").unwrap(),
            ContractParam::ByteArray(vec![1, 2, 3]),
        ]);
        assert_eq!(ContractParam::from_json(&param.to_json()).unwrap(), param);
    }

    #[test]
    fn import_rejects_type_value_mismatch() {
        let err = ContractParam::from_json(&json!({"type": "Array", "value": "nope"})).unwrap_err();
        assert!(matches!(err, Error::Param(ParamError::TypeMismatch { .. })));
    }

    #[test]
    fn import_rejects_unknown_type() {
        let err = ContractParam::from_json(&json!({"type": "Float", "value": 1})).unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::EnumName { .. })));
    }

    #[test]
    fn type_names_are_bidirectional() {
        for (t, name) in PARAM_TYPE_NAMES {
            assert_eq!(t.name(), *name);
            assert_eq!(ContractParamType::from_name(name).unwrap(), *t);
            assert_eq!(ContractParamType::try_from(t.byte()).unwrap(), *t);
        }
    }
}
