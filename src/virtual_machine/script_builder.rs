//! Script assembly from contract calls and parameter pushes.
//!
//! [`ScriptBuilder`] owns an append-only byte buffer. Every push chooses the
//! smallest encoding the instruction set allows, so the bytes it produces
//! tokenize back into the same sequence of operations.

use crate::error::Error;
use crate::types::encoding::{EncodingError, decode_hex};
use crate::types::hash::UInt160;
use crate::virtual_machine::contract_param::ContractParam;
use crate::virtual_machine::interop::{self, resolve_alias};
use crate::virtual_machine::isa::OpCode;
use num_bigint::BigInt;

/// Longest data push that fits the inline `PUSHBYTESn` form.
pub const MAX_INLINE_PUSH: usize = 75;

/// Service invoked by [`ScriptBuilder::emit_app_call`].
pub const CONTRACT_CALL_SERVICE: &str = "System.Contract.Call";
pub const CHECK_SIG_SERVICE: &str = "Neo.Crypto.CheckSig";
pub const CHECK_MULTISIG_SERVICE: &str = "Neo.Crypto.CheckMultiSig";

/// A value that can be pushed onto the evaluation stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptArg {
    /// Pushed as `false`.
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    Int(BigInt),
    Array(Vec<ScriptArg>),
    Param(ContractParam),
}

impl ScriptArg {
    /// Bytes given as a hex string.
    pub fn hex(s: &str) -> Result<Self, EncodingError> {
        decode_hex(s).map(ScriptArg::Bytes)
    }
}

impl From<bool> for ScriptArg {
    fn from(value: bool) -> Self {
        ScriptArg::Bool(value)
    }
}

impl From<i64> for ScriptArg {
    fn from(value: i64) -> Self {
        ScriptArg::Int(value.into())
    }
}

impl From<i32> for ScriptArg {
    fn from(value: i32) -> Self {
        ScriptArg::Int(value.into())
    }
}

impl From<BigInt> for ScriptArg {
    fn from(value: BigInt) -> Self {
        ScriptArg::Int(value)
    }
}

impl From<Vec<u8>> for ScriptArg {
    fn from(value: Vec<u8>) -> Self {
        ScriptArg::Bytes(value)
    }
}

impl From<&[u8]> for ScriptArg {
    fn from(value: &[u8]) -> Self {
        ScriptArg::Bytes(value.to_vec())
    }
}

impl From<ContractParam> for ScriptArg {
    fn from(value: ContractParam) -> Self {
        ScriptArg::Param(value)
    }
}

impl From<Vec<ScriptArg>> for ScriptArg {
    fn from(value: Vec<ScriptArg>) -> Self {
        ScriptArg::Array(value)
    }
}

impl<T: Into<ScriptArg>> From<Option<T>> for ScriptArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScriptArg::Null, Into::into)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an opcode and its raw operand bytes.
    pub fn emit(&mut self, op: OpCode, params: Option<&[u8]>) -> &mut Self {
        self.script.push(op.byte());
        if let Some(params) = params {
            self.script.extend_from_slice(params);
        }
        self
    }

    pub fn emit_push(&mut self, value: impl Into<ScriptArg>) -> Result<&mut Self, EncodingError> {
        self.push_arg(&value.into())
    }

    fn push_arg(&mut self, value: &ScriptArg) -> Result<&mut Self, EncodingError> {
        match value {
            ScriptArg::Null => Ok(self.emit_bool(false)),
            ScriptArg::Bool(b) => Ok(self.emit_bool(*b)),
            ScriptArg::Bytes(bytes) => self.emit_bytes(bytes),
            ScriptArg::Int(n) => self.emit_int(n),
            ScriptArg::Array(items) => self.emit_array(items),
            ScriptArg::Param(param) => self.emit_param(param),
        }
    }

    pub fn emit_bool(&mut self, value: bool) -> &mut Self {
        self.emit(if value { OpCode::Push1 } else { OpCode::Push0 }, None)
    }

    /// Pushes a byte string with the shortest length encoding.
    pub fn emit_bytes(&mut self, data: &[u8]) -> Result<&mut Self, EncodingError> {
        let len = data.len();
        if len <= MAX_INLINE_PUSH {
            self.script.push(len as u8);
        } else if len < 0x100 {
            self.emit(OpCode::PushData1, Some(&[len as u8]));
        } else if len < 0x1_0000 {
            self.emit(OpCode::PushData2, Some(&(len as u16).to_le_bytes()));
        } else {
            let len = u32::try_from(len).map_err(|_| EncodingError::LengthOverflow(len as u64))?;
            self.emit(OpCode::PushData4, Some(&len.to_le_bytes()));
        }
        self.script.extend_from_slice(data);
        Ok(self)
    }

    /// Pushes an integer.
    ///
    /// `-1..=16` use their dedicated opcodes; anything else is pushed as its
    /// minimal little-endian two's-complement bytes.
    pub fn emit_int(&mut self, value: &BigInt) -> Result<&mut Self, EncodingError> {
        let small = i64::try_from(value).ok().and_then(OpCode::for_small_int);
        match small {
            Some(op) => Ok(self.emit(op, None)),
            None => self.emit_bytes(&value.to_signed_bytes_le()),
        }
    }

    /// Pushes the elements in reverse, then the count, then `PACK`.
    pub fn emit_array(&mut self, items: &[ScriptArg]) -> Result<&mut Self, EncodingError> {
        for item in items.iter().rev() {
            self.push_arg(item)?;
        }
        self.emit_int(&BigInt::from(items.len()))?;
        Ok(self.emit(OpCode::Pack, None))
    }

    pub fn emit_param(&mut self, param: &ContractParam) -> Result<&mut Self, EncodingError> {
        match param {
            ContractParam::String(s) => self.emit_bytes(s.as_bytes()),
            ContractParam::Boolean(b) => Ok(self.emit_bool(*b)),
            ContractParam::Integer(n) => self.emit_int(n),
            ContractParam::ByteArray(bytes)
            | ContractParam::PublicKey(bytes)
            | ContractParam::Signature(bytes) => self.emit_bytes(bytes),
            ContractParam::Hash160(hash) => self.emit_bytes(hash.as_le_bytes()),
            ContractParam::Hash256(hash) => self.emit_bytes(hash.as_le_bytes()),
            ContractParam::Array(items) => {
                for item in items.iter().rev() {
                    self.emit_param(item)?;
                }
                self.emit_int(&BigInt::from(items.len()))?;
                Ok(self.emit(OpCode::Pack, None))
            }
            ContractParam::InteropInterface | ContractParam::Void => {
                Err(EncodingError::InvalidValue(format!(
                    "{} parameters cannot be pushed",
                    param.param_type()
                )))
            }
        }
    }

    /// Pushes `args` in reverse, then calls the named interop service.
    pub fn emit_sys_call(&mut self, service: &str, args: &[ScriptArg]) -> Result<&mut Self, Error> {
        let code = interop::interop_code(service)?;
        for arg in args.iter().rev() {
            self.push_arg(arg)?;
        }
        Ok(self.emit(OpCode::SysCall, Some(code.as_bytes())))
    }

    /// Calls `operation` on a deployed contract.
    ///
    /// `script_hash` is a big-endian 20-byte hex hash or one of the native
    /// aliases `NEO`, `GAS`, `POLICY`.
    pub fn emit_app_call(
        &mut self,
        script_hash: &str,
        operation: Option<&str>,
        args: &[ScriptArg],
    ) -> Result<&mut Self, Error> {
        let hash = resolve_alias(script_hash).unwrap_or(script_hash);
        let hash = UInt160::from_be_hex(hash)?;

        self.emit_array(args)?;
        if let Some(operation) = operation {
            self.emit_bytes(operation.as_bytes())?;
        }
        self.emit_bytes(hash.as_le_bytes())?;
        self.emit_sys_call(CONTRACT_CALL_SERVICE, &[])
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.script
    }

    pub fn build(self) -> Vec<u8> {
        self.script
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.script)
    }
}

/// Verification script of a single-signature account.
pub fn signature_verification_script(public_key: &[u8]) -> Result<Vec<u8>, Error> {
    check_compressed_key(public_key)?;
    let mut sb = ScriptBuilder::new();
    sb.emit_bytes(public_key)?;
    sb.emit_sys_call(CHECK_SIG_SERVICE, &[])?;
    Ok(sb.build())
}

/// Verification script of an `m`-of-n multi-signature account.
///
/// Keys are written in the order given.
pub fn multisig_verification_script(threshold: usize, public_keys: &[&[u8]]) -> Result<Vec<u8>, Error> {
    if threshold == 0 || threshold > public_keys.len() {
        return Err(EncodingError::InvalidValue(format!(
            "threshold {threshold} out of range for {} keys",
            public_keys.len()
        ))
        .into());
    }
    let mut sb = ScriptBuilder::new();
    sb.emit_int(&BigInt::from(threshold))?;
    for key in public_keys {
        check_compressed_key(key)?;
        sb.emit_bytes(key)?;
    }
    sb.emit_int(&BigInt::from(public_keys.len()))?;
    sb.emit_sys_call(CHECK_MULTISIG_SERVICE, &[])?;
    Ok(sb.build())
}

/// Invocation script pushing each signature in order.
pub fn invocation_script(signatures: &[&[u8]]) -> Result<Vec<u8>, EncodingError> {
    let mut sb = ScriptBuilder::new();
    for signature in signatures {
        if signature.len() != 64 {
            return Err(EncodingError::InvalidLength {
                expected: 64,
                actual: signature.len(),
            });
        }
        sb.emit_bytes(signature)?;
    }
    Ok(sb.build())
}

fn check_compressed_key(key: &[u8]) -> Result<(), EncodingError> {
    if key.len() != 33 {
        return Err(EncodingError::InvalidLength {
            expected: 33,
            actual: key.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_machine::interop::NEO_CONTRACT;
    use crate::virtual_machine::token::OpToken;

    const KEY_A: &str = "031d8e1630ce640966967bc6d95223d21f44304133003140c3b52004dc981349c9";
    const KEY_B: &str = "03767002bb9f74317035ce8d557a3aed30ce831eb16b5f636a139dad0b07916bed";
    const KEY_C: &str = "0329898e6e5e0a2f175e205b4019c500d6bb69203b56470ec2fc8ab0a4c065e16d";

    fn hex_of(f: impl FnOnce(&mut ScriptBuilder)) -> String {
        let mut sb = ScriptBuilder::new();
        f(&mut sb);
        sb.to_hex()
    }

    // ========== Push Tests ==========

    #[test]
    fn pushes_booleans_and_null() {
        assert_eq!(hex_of(|sb| { sb.emit_push(true).unwrap(); }), "51");
        assert_eq!(hex_of(|sb| { sb.emit_push(false).unwrap(); }), "00");
        assert_eq!(hex_of(|sb| { sb.emit_push(ScriptArg::Null).unwrap(); }), "00");
        assert_eq!(hex_of(|sb| { sb.emit_push(None::<bool>).unwrap(); }), "00");
    }

    #[test]
    fn pushes_small_integers_with_dedicated_opcodes() {
        assert_eq!(hex_of(|sb| { sb.emit_push(-1).unwrap(); }), "4f");
        assert_eq!(hex_of(|sb| { sb.emit_push(0).unwrap(); }), "00");
        assert_eq!(hex_of(|sb| { sb.emit_push(1).unwrap(); }), "51");
        assert_eq!(hex_of(|sb| { sb.emit_push(16).unwrap(); }), "60");
    }

    #[test]
    fn pushes_wider_integers_as_signed_le() {
        assert_eq!(hex_of(|sb| { sb.emit_push(17).unwrap(); }), "0111");
        assert_eq!(hex_of(|sb| { sb.emit_push(127).unwrap(); }), "017f");
        assert_eq!(hex_of(|sb| { sb.emit_push(128).unwrap(); }), "028000");
        assert_eq!(hex_of(|sb| { sb.emit_push(255).unwrap(); }), "02ff00");
        assert_eq!(hex_of(|sb| { sb.emit_push(32512).unwrap(); }), "02007f");
        assert_eq!(hex_of(|sb| { sb.emit_push(-2).unwrap(); }), "01fe");
        assert_eq!(hex_of(|sb| { sb.emit_push(-129).unwrap(); }), "027fff");
    }

    #[test]
    fn numeric_push_parses_back() {
        for n in [-1i64, 0, 16, 127, 32512, -129, 1 << 40] {
            let mut sb = ScriptBuilder::new();
            sb.emit_push(n).unwrap();
            let tokens = OpToken::from_script(sb.as_bytes()).unwrap();
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].parse_int().unwrap(), BigInt::from(n));
        }
    }

    #[test]
    fn byte_push_length_classes() {
        let cases = [
            (75usize, OpCode::PushBytes75),
            (76, OpCode::PushData1),
            (255, OpCode::PushData1),
            (256, OpCode::PushData2),
            (65535, OpCode::PushData2),
            (65536, OpCode::PushData4),
        ];
        for (len, expected) in cases {
            let mut sb = ScriptBuilder::new();
            sb.emit_bytes(&vec![0xab; len]).unwrap();
            let tokens = OpToken::from_script(sb.as_bytes()).unwrap();
            assert_eq!(tokens.len(), 1, "len {len}");
            assert_eq!(tokens[0].code, expected, "len {len}");
            assert_eq!(tokens[0].params.as_ref().unwrap().len(), len);
        }
    }

    #[test]
    fn pushdata2_prefix_is_little_endian() {
        let mut sb = ScriptBuilder::new();
        sb.emit_bytes(&[0u8; 0x0102]).unwrap();
        assert_eq!(&sb.as_bytes()[..3], &[0x4d, 0x02, 0x01]);
    }

    #[test]
    fn hex_arg_rejects_malformed() {
        assert!(ScriptArg::hex("abc").is_err());
        assert_eq!(ScriptArg::hex("abcd").unwrap(), ScriptArg::Bytes(vec![0xab, 0xcd]));
    }

    #[test]
    fn arrays_push_reversed_then_pack() {
        let args: Vec<ScriptArg> = vec![1.into(), 2.into(), 3.into()];
        assert_eq!(hex_of(|sb| { sb.emit_push(args).unwrap(); }), "53525153c1");
        assert_eq!(hex_of(|sb| { sb.emit_push(Vec::<ScriptArg>::new()).unwrap(); }), "00c1");
    }

    // ========== Parameter Tests ==========

    #[test]
    fn params_push_their_payload() {
        assert_eq!(
            hex_of(|sb| { sb.emit_param(&ContractParam::string("name")).unwrap(); }),
            "046e616d65"
        );
        assert_eq!(
            hex_of(|sb| { sb.emit_param(&ContractParam::Integer(1000.into())).unwrap(); }),
            "02e803"
        );
        let hash = ContractParam::hash160("5b7074e873973a6ed3708862f219a6fbf4d1c411").unwrap();
        assert_eq!(
            hex_of(|sb| { sb.emit_param(&hash).unwrap(); }),
            "1411c4d1f4fba619f2628870d36e3a9773e874705b"
        );
        let nested = ContractParam::array([ContractParam::Boolean(true), ContractParam::string("a")]);
        assert_eq!(hex_of(|sb| { sb.emit_param(&nested).unwrap(); }), "01615152c1");
    }

    #[test]
    fn void_param_cannot_be_pushed() {
        assert!(ScriptBuilder::new().emit_param(&ContractParam::Void).is_err());
    }

    // ========== Call Tests ==========

    #[test]
    fn sys_call_pushes_args_in_reverse() {
        let mut sb = ScriptBuilder::new();
        sb.emit_sys_call("System.Runtime.Notify", &[1.into(), 2.into()]).unwrap();
        let expected = format!("5251 68{}", interop::interop_code("System.Runtime.Notify").unwrap());
        assert_eq!(sb.to_hex(), expected.replace(' ', ""));
    }

    #[test]
    fn sys_call_unknown_service_fails() {
        let err = ScriptBuilder::new().emit_sys_call("System.Nope", &[]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn app_call_resolves_alias() {
        let mut by_alias = ScriptBuilder::new();
        by_alias.emit_app_call("neo", Some("name"), &[]).unwrap();
        let mut by_hash = ScriptBuilder::new();
        by_hash.emit_app_call(NEO_CONTRACT, Some("name"), &[]).unwrap();
        assert_eq!(by_alias, by_hash);

        let le_hash = UInt160::from_be_hex(NEO_CONTRACT).unwrap().to_le_hex();
        assert_eq!(by_alias.to_hex(), format!("00c1046e616d6514{le_hash}68627d5b52"));
        assert_eq!(by_alias.len(), 33);
    }

    #[test]
    fn app_call_rejects_short_hash() {
        let err = ScriptBuilder::new().emit_app_call("abcd", None, &[]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn app_call_tokenizes_back() {
        let mut sb = ScriptBuilder::new();
        sb.emit_app_call("gas", Some("transfer"), &[5.into(), ScriptArg::hex("aa").unwrap()])
            .unwrap();
        let ops: Vec<OpCode> = OpToken::from_script(sb.as_bytes())
            .unwrap()
            .into_iter()
            .map(|t| t.code)
            .collect();
        assert_eq!(
            ops,
            vec![
                OpCode::PushBytes1,
                OpCode::Push5,
                OpCode::Push2,
                OpCode::Pack,
                OpCode::PushBytes8,
                OpCode::PushBytes20,
                OpCode::SysCall,
            ]
        );
    }

    // ========== Witness Script Tests ==========

    #[test]
    fn single_signature_verification_script() {
        let key = hex::decode(KEY_A).unwrap();
        assert_eq!(
            hex::encode(signature_verification_script(&key).unwrap()),
            format!("21{KEY_A}68747476aa")
        );
        assert!(signature_verification_script(&key[..32]).is_err());
    }

    #[test]
    fn multisig_verification_script_layout() {
        let keys: Vec<Vec<u8>> = [KEY_A, KEY_B, KEY_C].iter().map(|k| hex::decode(k).unwrap()).collect();
        let refs: Vec<&[u8]> = keys.iter().map(Vec::as_slice).collect();
        assert_eq!(
            hex::encode(multisig_verification_script(2, &refs).unwrap()),
            format!("5221{KEY_A}21{KEY_B}21{KEY_C}5368c7c34cba")
        );
        assert!(multisig_verification_script(0, &refs).is_err());
        assert!(multisig_verification_script(4, &refs).is_err());
    }

    #[test]
    fn invocation_script_pushes_signatures() {
        let sig = [7u8; 64];
        let script = invocation_script(&[&sig, &sig]).unwrap();
        assert_eq!(script.len(), 130);
        assert_eq!(script[0], 0x40);
        assert!(invocation_script(&[&sig[..10]]).is_err());
    }
}
