//! Script tokenizer.
//!
//! Splits a byte script into [`OpToken`]s, one per instruction, and renders
//! them back as bytes or as a readable listing.

use crate::types::encoding::{Encode, EncodeSink, EncodingError, Reader};
use crate::virtual_machine::interop::{self, InteropCode};
use crate::virtual_machine::isa::{OpCode, OperandSize};
use num_bigint::BigInt;

/// One decoded instruction.
///
/// `params` holds the operand without its length prefix and is present only
/// for opcodes whose operand size is nonzero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpToken {
    pub code: OpCode,
    pub params: Option<Vec<u8>>,
}

impl OpToken {
    /// Builds a token, checking the operand against the opcode's size class.
    pub fn new(code: OpCode, params: Option<Vec<u8>>) -> Result<Self, EncodingError> {
        let actual = params.as_ref().map_or(0, Vec::len);
        match code.operand_size() {
            OperandSize::Fixed(0) if params.is_some() => {
                return Err(EncodingError::InvalidValue(format!(
                    "{} takes no operand",
                    code.mnemonic()
                )));
            }
            OperandSize::Fixed(n) if n > 0 && (params.is_none() || actual != n) => {
                return Err(EncodingError::InvalidLength {
                    expected: n,
                    actual,
                });
            }
            OperandSize::Prefixed(width) => {
                if params.is_none() {
                    return Err(EncodingError::InvalidValue(format!(
                        "{} requires an operand",
                        code.mnemonic()
                    )));
                }
                if (actual as u64) > max_prefixed_len(width) {
                    return Err(EncodingError::LengthOverflow(actual as u64));
                }
            }
            _ => {}
        }
        Ok(Self { code, params })
    }

    /// Tokenizes a whole script.
    ///
    /// Fails on an unknown opcode or when an operand runs past the end.
    pub fn from_script(script: &[u8]) -> Result<Vec<OpToken>, EncodingError> {
        let mut reader = Reader::new(script);
        let mut tokens = Vec::new();
        while !reader.is_empty() {
            tokens.push(Self::read(&mut reader)?);
        }
        Ok(tokens)
    }

    /// Reads a single instruction from the cursor.
    pub fn read(reader: &mut Reader<'_>) -> Result<OpToken, EncodingError> {
        let offset = reader.position();
        let byte = reader.read_u8()?;
        let code = OpCode::try_from(byte)
            .map_err(|_| EncodingError::UnknownOpcode { opcode: byte, offset })?;

        let params = match code.operand_size() {
            OperandSize::Fixed(0) => None,
            OperandSize::Fixed(n) => Some(reader.read_bytes(n)?.to_vec()),
            OperandSize::Prefixed(width) => {
                let len = read_prefix(reader, width)?;
                Some(reader.read_bytes(len)?.to_vec())
            }
        };
        Ok(OpToken { code, params })
    }

    /// Decodes the integer pushed by this instruction.
    ///
    /// Small immediates map directly; data pushes hold a little-endian
    /// two's-complement value, with the empty array meaning zero.
    pub fn parse_int(&self) -> Result<BigInt, EncodingError> {
        if let Some(value) = self.code.small_int_value() {
            return Ok(BigInt::from(value));
        }
        match (&self.params, self.code.is_push_data()) {
            (Some(bytes), true) => Ok(BigInt::from_signed_bytes_le(bytes)),
            _ => Err(EncodingError::InvalidValue(format!(
                "{} does not push an integer",
                self.code.mnemonic()
            ))),
        }
    }

    /// Renders `MNEMONIC` or `MNEMONIC hexparams`.
    pub fn to_instruction(&self) -> String {
        match &self.params {
            Some(params) => format!("{} {}", self.code.mnemonic(), hex::encode(params)),
            None => self.code.mnemonic().to_string(),
        }
    }

    /// The interop code, if this is a `SYSCALL`.
    pub fn interop_code(&self) -> Option<InteropCode> {
        match (&self.params, self.code) {
            (Some(p), OpCode::SysCall) => p.as_slice().try_into().ok().map(InteropCode),
            _ => None,
        }
    }

    /// Static price of the instruction, including the called service.
    pub fn price(&self) -> Result<i64, EncodingError> {
        let base = self.code.price();
        match self.interop_code() {
            Some(code) => interop::price(code)
                .map(|service| base + service)
                .map_err(|e| EncodingError::InvalidValue(e.to_string())),
            None => Ok(base),
        }
    }
}

impl Encode for OpToken {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[self.code.byte()]);
        let Some(params) = &self.params else {
            return;
        };
        if let OperandSize::Prefixed(width) = self.code.operand_size() {
            out.write(&(params.len() as u32).to_le_bytes()[..width]);
        }
        out.write(params);
    }
}

/// Renders a script as one instruction per line.
pub fn disassemble(script: &[u8]) -> Result<String, EncodingError> {
    let tokens = OpToken::from_script(script)?;
    Ok(tokens
        .iter()
        .map(OpToken::to_instruction)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn read_prefix(reader: &mut Reader<'_>, width: usize) -> Result<usize, EncodingError> {
    let bytes = reader.read_bytes(width)?;
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(bytes);
    Ok(u32::from_le_bytes(buf) as usize)
}

fn max_prefixed_len(width: usize) -> u64 {
    (1u64 << (8 * width)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(hex_script: &str) -> Vec<OpToken> {
        OpToken::from_script(&hex::decode(hex_script).unwrap()).unwrap()
    }

    fn token(code: OpCode, params: Option<&str>) -> OpToken {
        OpToken::new(code, params.map(|p| hex::decode(p).unwrap())).unwrap()
    }

    // ========== Tokenizer Tests ==========

    #[test]
    fn tokenizes_every_size_class() {
        let result = tokens("5103aabbcc4c02dead68627d5b5266");
        assert_eq!(
            result,
            vec![
                token(OpCode::Push1, None),
                token(OpCode::PushBytes3, Some("aabbcc")),
                token(OpCode::PushData1, Some("dead")),
                token(OpCode::SysCall, Some("627d5b52")),
                token(OpCode::Ret, None),
            ]
        );
    }

    #[test]
    fn pushdata2_reads_le_prefix() {
        let mut script = vec![0x4d, 0x00, 0x01];
        script.extend(std::iter::repeat_n(0x11u8, 256));
        let result = OpToken::from_script(&script).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].params.as_ref().unwrap().len(), 256);
    }

    #[test]
    fn truncated_operand_fails() {
        assert!(matches!(
            OpToken::from_script(&[0x03, 0xaa]),
            Err(EncodingError::UnexpectedEof { needed: 3, remaining: 1 })
        ));
        assert!(matches!(
            OpToken::from_script(&[0x68, 0x62, 0x7d]),
            Err(EncodingError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            OpToken::from_script(&[0x4d, 0x01]),
            Err(EncodingError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn unknown_opcode_reports_offset() {
        assert_eq!(
            OpToken::from_script(&[0x51, 0x67]),
            Err(EncodingError::UnknownOpcode {
                opcode: 0x67,
                offset: 1
            })
        );
    }

    #[test]
    fn reencoding_reproduces_script() {
        let script = hex::decode("5103aabbcc4c02dead68627d5b5266").unwrap();
        let rebuilt: Vec<u8> = OpToken::from_script(&script)
            .unwrap()
            .iter()
            .flat_map(|t| t.to_bytes())
            .collect();
        assert_eq!(rebuilt, script);
    }

    // ========== Token Construction Tests ==========

    #[test]
    fn new_checks_operand_length() {
        assert!(OpToken::new(OpCode::PushBytes2, Some(vec![1])).is_err());
        assert!(OpToken::new(OpCode::SysCall, None).is_err());
        assert!(OpToken::new(OpCode::Push1, Some(vec![1])).is_err());
        assert!(OpToken::new(OpCode::PushData1, Some(vec![0; 256])).is_err());
        assert!(OpToken::new(OpCode::PushData1, Some(vec![0; 255])).is_ok());
    }

    // ========== Integer Tests ==========

    #[test]
    fn parse_int_small_immediates() {
        assert_eq!(token(OpCode::PushM1, None).parse_int().unwrap(), BigInt::from(-1));
        assert_eq!(token(OpCode::Push0, None).parse_int().unwrap(), BigInt::from(0));
        assert_eq!(token(OpCode::Push16, None).parse_int().unwrap(), BigInt::from(16));
    }

    #[test]
    fn parse_int_sized_pushes() {
        assert_eq!(token(OpCode::PushBytes1, Some("7f")).parse_int().unwrap(), BigInt::from(127));
        assert_eq!(token(OpCode::PushBytes1, Some("80")).parse_int().unwrap(), BigInt::from(-128));
        assert_eq!(token(OpCode::PushBytes2, Some("007f")).parse_int().unwrap(), BigInt::from(32512));
        assert_eq!(token(OpCode::PushBytes2, Some("8000")).parse_int().unwrap(), BigInt::from(128));
    }

    #[test]
    fn parse_int_rejects_non_push() {
        assert!(token(OpCode::SysCall, Some("627d5b52")).parse_int().is_err());
        assert!(token(OpCode::Add, None).parse_int().is_err());
    }

    // ========== Rendering Tests ==========

    #[test]
    fn to_instruction_formats() {
        assert_eq!(token(OpCode::SysCall, Some("01020304")).to_instruction(), "SYSCALL 01020304");
        assert_eq!(token(OpCode::Push1, None).to_instruction(), "PUSH1");
    }

    #[test]
    fn disassemble_lists_instructions() {
        let listing = disassemble(&hex::decode("00c1046e616d6566").unwrap()).unwrap();
        assert_eq!(listing, "PUSH0\nPACK\nPUSHBYTES4 6e616d65\nRET");
    }

    #[test]
    fn syscall_price_includes_service() {
        let check_sig = token(OpCode::SysCall, Some("747476aa"));
        assert_eq!(check_sig.price().unwrap(), 1_000_000);
        assert_eq!(token(OpCode::PushBytes1, Some("01")).price().unwrap(), 120);
        assert!(token(OpCode::SysCall, Some("00000000")).price().is_err());
    }
}
