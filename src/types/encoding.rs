//! Binary encoding and decoding traits for the ledger wire format.
//!
//! All encoded data uses little-endian byte order. Sequences carry a compact
//! variable-length count prefix, which is the only framing on the wire.
//!
//! # Binary Format
//!
//! - Integers: little-endian, fixed-width
//! - `bool`: single byte (0 = false, 1 = true)
//! - `Vec<T>`/`String`: var-int count followed by elements
//! - Arrays `[T; N]`: elements serialized sequentially without length prefix
//!
//! # Var-int
//!
//! | value              | encoding               |
//! |--------------------|------------------------|
//! | `< 0xfd`           | 1 byte                 |
//! | `<= 0xffff`        | `0xfd` + u16 LE        |
//! | `<= 0xffff_ffff`   | `0xfe` + u32 LE        |
//! | otherwise          | `0xff` + u64 LE        |
//!
//! Decoding rejects a var-int that uses a wider form than needed, so that
//! decoding then re-encoding always reproduces the input bytes.

use neotx_derive::Error;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers and hashers so encodable types can be written
/// directly into the target without intermediate allocations.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Counter for computing encoded size without allocating memory.
#[derive(Default)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self { len: 0 }
    }

    /// Returns the total number of bytes counted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Trait for types that can be serialized to the wire format.
pub trait Encode {
    /// Writes the binary representation to the given sink.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Returns the number of bytes `encode` would write.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }

    /// Serializes to a new byte buffer with exact capacity.
    ///
    /// Performs two passes: first to count bytes, then to encode.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Serializes to a lowercase hex string.
    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Errors raised while encoding or decoding bytes, hex and scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Input is not valid hexadecimal.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Input ended before the expected data was read.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    /// A length does not fit the encoding that must carry it.
    #[error("length {0} exceeds the maximum encodable size")]
    LengthOverflow(u64),
    /// A var-int used a wider form than its value requires.
    #[error("non-canonical var-int encoding")]
    NonCanonicalVarInt,
    /// Bytes remained after a complete value was decoded.
    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),
    /// A decimal amount has more fractional digits than allowed.
    #[error("wrong precision: expected {expected}")]
    WrongPrecision { expected: u8 },
    /// A fixed-length field had the wrong size.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Script contains a byte that is not a known opcode.
    #[error("unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
    /// Data does not represent a valid value for the target type.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Maximum element count accepted for a decoded sequence.
pub const MAX_ARRAY_LEN: u64 = 0x0100_0000;

/// Forward-only cursor over a byte slice.
///
/// Shared by the transaction codec, the script tokenizer and the stack item
/// deserializer. Every read is bounds-checked and reports how many bytes
/// were missing.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        if self.remaining() < n {
            return Err(EncodingError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EncodingError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, EncodingError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a compact var-int, rejecting non-minimal forms.
    pub fn read_var_int(&mut self) -> Result<u64, EncodingError> {
        let (value, min) = match self.read_u8()? {
            0xfd => (u16::from_le_bytes(self.read_array()?) as u64, 0xfd),
            0xfe => (u32::from_le_bytes(self.read_array()?) as u64, 0x1_0000),
            0xff => (u64::from_le_bytes(self.read_array()?), 0x1_0000_0000),
            small => return Ok(small as u64),
        };
        if value < min {
            return Err(EncodingError::NonCanonicalVarInt);
        }
        Ok(value)
    }

    /// Reads a var-int length followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], EncodingError> {
        let len = self.read_length()?;
        self.read_bytes(len)
    }

    /// Reads a var-int element count bounded by [`MAX_ARRAY_LEN`].
    pub fn read_length(&mut self) -> Result<usize, EncodingError> {
        let len = self.read_var_int()?;
        if len > MAX_ARRAY_LEN {
            return Err(EncodingError::LengthOverflow(len));
        }
        usize::try_from(len).map_err(|_| EncodingError::LengthOverflow(len))
    }

    /// Fails if any input remains unread.
    pub fn finish(&self) -> Result<(), EncodingError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(EncodingError::TrailingBytes(n)),
        }
    }
}

/// Trait for types that can be deserialized from the wire format.
pub trait Decode: Sized {
    /// Reads and decodes a value, advancing the reader past the consumed bytes.
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError>;

    /// Decodes a value from a byte slice, requiring all bytes to be consumed.
    fn from_bytes(data: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = Reader::new(data);
        let value = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    /// Decodes a value from a hex string, requiring all bytes to be consumed.
    fn from_hex(s: &str) -> Result<Self, EncodingError> {
        Self::from_bytes(&decode_hex(s)?)
    }
}

/// Writes `value` as a compact var-int.
pub fn write_var_int<S: EncodeSink>(out: &mut S, value: u64) {
    if value < 0xfd {
        out.write(&[value as u8]);
    } else if value <= 0xffff {
        out.write(&[0xfd]);
        out.write(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.write(&[0xfe]);
        out.write(&(value as u32).to_le_bytes());
    } else {
        out.write(&[0xff]);
        out.write(&value.to_le_bytes());
    }
}

/// Number of bytes the var-int form of `value` occupies.
pub fn var_int_len(value: u64) -> usize {
    match value {
        0..0xfd => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Writes a var-int length prefix followed by the bytes.
pub fn write_var_bytes<S: EncodeSink>(out: &mut S, bytes: &[u8]) {
    write_var_int(out, bytes.len() as u64);
    out.write(bytes);
}

/// Decodes a hex string, accepting an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, EncodingError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits).map_err(|e| EncodingError::InvalidHex(format!("{s:?}: {e}")))
}

/// Returns the bytes in reverse order.
pub fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

impl Encode for u8 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[*self]);
    }
}

impl Decode for u8 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        reader.read_u8()
    }
}

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<S: EncodeSink>(&self, out: &mut S) {
                    out.write(&self.to_le_bytes());
                }
            }

            impl Decode for $t {
                fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
                    Ok(<$t>::from_le_bytes(reader.read_array()?))
                }
            }
        )*
    };
}

impl_int!(u16, u32, u64, i16, i32, i64);

impl Encode for bool {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[*self as u8]);
    }
}

impl Decode for bool {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(EncodingError::InvalidValue(format!(
                "boolean byte 0x{other:02x}"
            ))),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        write_var_int(out, self.len() as u64);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        let len = reader.read_length()?;
        // Every element occupies at least one byte.
        let mut vec = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            vec.push(T::decode(reader)?);
        }
        Ok(vec)
    }
}

impl Encode for String {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        write_var_bytes(out, self.as_bytes());
    }
}

impl Decode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        let bytes = reader.read_var_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| EncodingError::InvalidValue("string is not valid utf-8".into()))
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        reader.read_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== SizeCounter Tests ==========

    #[test]
    fn size_counter_accumulates() {
        let mut counter = SizeCounter::new();
        assert!(counter.is_empty());

        counter.write(&[1, 2, 3]);
        assert_eq!(counter.len(), 3);

        counter.write(&[4, 5]);
        assert_eq!(counter.len(), 5);
    }

    #[test]
    fn to_bytes_preallocates_exact_capacity() {
        let data: Vec<u8> = vec![1, 2, 3, 4, 5];
        let bytes = data.to_bytes();
        // var-int count + elements
        assert_eq!(bytes.len(), 1 + 5);
        assert_eq!(bytes.capacity(), bytes.len());
        assert_eq!(data.encoded_len(), 6);
    }

    // ========== Var-int Tests ==========

    fn var_int_bytes(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_var_int(&mut out, value);
        out
    }

    #[test]
    fn var_int_boundaries() {
        assert_eq!(var_int_bytes(0), vec![0x00]);
        assert_eq!(var_int_bytes(0xfc), vec![0xfc]);
        assert_eq!(var_int_bytes(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(var_int_bytes(0xffff), vec![0xfd, 0xff, 0xff]);
        assert_eq!(var_int_bytes(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(
            var_int_bytes(0x1_0000_0000),
            vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn var_int_len_matches_encoding() {
        for value in [0, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000, u64::MAX] {
            assert_eq!(var_int_len(value), var_int_bytes(value).len(), "value {value}");
        }
    }

    #[test]
    fn var_int_read_back() {
        for value in [7u64, 0xfd, 0x1234, 0x12_3456, 0x1_0000_0000] {
            let bytes = var_int_bytes(value);
            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.read_var_int().unwrap(), value);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn var_int_rejects_non_canonical() {
        let mut reader = Reader::new(&[0xfd, 0x10, 0x00]);
        assert_eq!(reader.read_var_int(), Err(EncodingError::NonCanonicalVarInt));

        let mut reader = Reader::new(&[0xfe, 0xff, 0xff, 0x00, 0x00]);
        assert_eq!(reader.read_var_int(), Err(EncodingError::NonCanonicalVarInt));
    }

    // ========== Reader Tests ==========

    #[test]
    fn reader_tracks_position() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_bytes(2).unwrap(), &[1, 2]);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.read_u8().unwrap(), 3);
    }

    #[test]
    fn reader_reports_truncation() {
        let mut reader = Reader::new(&[0x03, 0xaa]);
        assert_eq!(
            reader.read_var_bytes(),
            Err(EncodingError::UnexpectedEof {
                needed: 3,
                remaining: 1
            })
        );
    }

    #[test]
    fn reader_rejects_huge_length() {
        let mut reader = Reader::new(&[0xff, 0, 0, 0, 0, 1, 0, 0, 0]);
        assert!(matches!(
            reader.read_length(),
            Err(EncodingError::LengthOverflow(_))
        ));
    }

    // ========== Integer Tests ==========

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(0x0102u16.to_bytes(), vec![0x02, 0x01]);
        assert_eq!(0x01020304u32.to_bytes(), vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!((-2i64).to_bytes(), vec![0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(i64::from_bytes(&(-2i64).to_bytes()).unwrap(), -2);
    }

    #[test]
    fn bool_rejects_invalid_byte() {
        assert!(bool::from_bytes(&[1]).unwrap());
        assert!(matches!(
            bool::from_bytes(&[2]),
            Err(EncodingError::InvalidValue(_))
        ));
    }

    // ========== Sequence Tests ==========

    #[test]
    fn vec_uses_var_int_prefix() {
        let items = vec![0x0102u16; 300];
        let bytes = items.to_bytes();
        assert_eq!(&bytes[..3], &[0xfd, 0x2c, 0x01]);
        assert_eq!(bytes.len(), 3 + 600);
        assert_eq!(Vec::<u16>::from_bytes(&bytes).unwrap(), items);
    }

    #[test]
    fn string_roundtrip() {
        let s = String::from("transfer");
        let bytes = s.to_bytes();
        assert_eq!(bytes[0], 8);
        assert_eq!(String::from_bytes(&bytes).unwrap(), s);
    }

    #[test]
    fn from_bytes_rejects_trailing() {
        assert_eq!(
            u16::from_bytes(&[1, 2, 3]),
            Err(EncodingError::TrailingBytes(1))
        );
    }

    // ========== Hex Tests ==========

    #[test]
    fn decode_hex_accepts_prefix() {
        assert_eq!(decode_hex("0xabcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_hex("ABCD").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_hex_rejects_malformed() {
        assert!(matches!(decode_hex("abc"), Err(EncodingError::InvalidHex(_))));
        assert!(matches!(decode_hex("zz"), Err(EncodingError::InvalidHex(_))));
    }

    #[test]
    fn reverse_bytes_reverses() {
        assert_eq!(reverse_bytes(&[1, 2, 3]), vec![3, 2, 1]);
    }
}
