//! Interop service registry.
//!
//! A service is addressed from a script by `SYSCALL` followed by the first
//! four bytes of `sha256(name)`. The registry is built once from the known
//! names and answers lookups in both directions.

use crate::types::hash::{UInt160, hash160, sha256};
use crate::virtual_machine::errors::NotFoundError;
use crate::virtual_machine::isa::OpCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Four-byte service identifier carried by `SYSCALL`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InteropCode(pub [u8; 4]);

impl InteropCode {
    /// Derives the code for any name, registered or not.
    pub fn from_name(name: &str) -> Self {
        let digest = sha256(name.as_bytes());
        Self([digest[0], digest[1], digest[2], digest[3]])
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for InteropCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A registered native service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteropService {
    pub name: &'static str,
    pub code: InteropCode,
    /// Execution price in base units.
    pub price: i64,
}

const SERVICES: &[(&str, i64)] = &[
    ("Neo.Crypto.CheckSig", 1_000_000),
    ("Neo.Crypto.CheckMultiSig", 1_000_000),
    ("Neo.Crypto.CheckMultisigWithECDsaSecp256r1", 1_000_000),
    ("Neo.Crypto.ECDsaVerify", 1_000_000),
    ("Neo.Crypto.ECDsaCheckMultiSig", 1_000_000),
    ("Neo.Native.Deploy", 0),
    ("Neo.Native.Tokens.NEO", 0),
    ("Neo.Native.Tokens.GAS", 0),
    ("Neo.Native.Policy", 0),
    ("System.Binary.Deserialize", 500_000),
    ("System.Binary.Serialize", 100_000),
    ("System.Blockchain.GetBlock", 2_500_000),
    ("System.Blockchain.GetContract", 1_000_000),
    ("System.Blockchain.GetHeight", 400),
    ("System.Blockchain.GetTransaction", 1_000_000),
    ("System.Blockchain.GetTransactionFromBlock", 1_000_000),
    ("System.Blockchain.GetTransactionHeight", 1_000_000),
    ("System.Contract.Call", 1_000_000),
    ("System.Contract.CallEx", 1_000_000),
    ("System.Contract.Create", 0),
    ("System.Contract.CreateStandardAccount", 10_000),
    ("System.Contract.Destroy", 1_000_000),
    ("System.Contract.GetCallFlags", 30_000),
    ("System.Contract.IsStandard", 30_000),
    ("System.Contract.Update", 0),
    ("System.Enumerator.Concat", 400),
    ("System.Enumerator.Create", 400),
    ("System.Enumerator.Next", 1_000_000),
    ("System.Enumerator.Value", 400),
    ("System.Iterator.Concat", 400),
    ("System.Iterator.Create", 400),
    ("System.Iterator.Key", 400),
    ("System.Iterator.Keys", 400),
    ("System.Iterator.Values", 400),
    ("System.Json.Deserialize", 500_000),
    ("System.Json.Serialize", 100_000),
    ("System.Runtime.CheckWitness", 30_000),
    ("System.Runtime.GasLeft", 400),
    ("System.Runtime.GetCallingScriptHash", 400),
    ("System.Runtime.GetEntryScriptHash", 400),
    ("System.Runtime.GetExecutingScriptHash", 400),
    ("System.Runtime.GetInvocationCounter", 400),
    ("System.Runtime.GetNotifications", 10_000),
    ("System.Runtime.GetScriptContainer", 250),
    ("System.Runtime.GetTime", 250),
    ("System.Runtime.GetTrigger", 250),
    ("System.Runtime.Log", 1_000_000),
    ("System.Runtime.Notify", 1_000_000),
    ("System.Runtime.Platform", 250),
    ("System.Storage.AsReadOnly", 400),
    ("System.Storage.Delete", 1_000_000),
    ("System.Storage.Find", 1_000_000),
    ("System.Storage.Get", 1_000_000),
    ("System.Storage.GetContext", 400),
    ("System.Storage.GetReadOnlyContext", 400),
    ("System.Storage.Put", 1_000_000),
    ("System.Storage.PutEx", 1_000_000),
];

struct Registry {
    by_name: HashMap<&'static str, InteropService>,
    by_code: HashMap<InteropCode, &'static str>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut by_name = HashMap::with_capacity(SERVICES.len());
    let mut by_code = HashMap::with_capacity(SERVICES.len());
    for &(name, price) in SERVICES {
        let code = InteropCode::from_name(name);
        by_code.insert(code, name);
        by_name.insert(name, InteropService { name, code, price });
    }
    Registry { by_name, by_code }
});

/// Looks a service up by its dotted name.
pub fn lookup(name: &str) -> Result<&'static InteropService, NotFoundError> {
    REGISTRY
        .by_name
        .get(name)
        .ok_or_else(|| NotFoundError::InteropService(name.to_string()))
}

/// Looks a service up by the code found after a `SYSCALL`.
pub fn lookup_code(code: InteropCode) -> Result<&'static InteropService, NotFoundError> {
    REGISTRY
        .by_code
        .get(&code)
        .and_then(|name| REGISTRY.by_name.get(name))
        .ok_or_else(|| NotFoundError::InteropCode(u32::from_be_bytes(code.0)))
}

/// Code of a registered service.
pub fn interop_code(name: &str) -> Result<InteropCode, NotFoundError> {
    lookup(name).map(|service| service.code)
}

/// Price of the service behind a `SYSCALL` operand.
pub fn price(code: InteropCode) -> Result<i64, NotFoundError> {
    lookup_code(code).map(|service| service.price)
}

/// Script hash of a native contract: `hash160(SYSCALL || code(name))`.
pub fn native_contract_hash(name: &str) -> UInt160 {
    let code = InteropCode::from_name(name);
    let mut script = Vec::with_capacity(5);
    script.push(OpCode::SysCall.byte());
    script.extend_from_slice(&code.0);
    UInt160(hash160(&script))
}

/// Canonical NEO token contract hash (big-endian display form).
pub const NEO_CONTRACT: &str = "9bde8f209c88dd0e7ca3bf0af0f476cdd8207789";
/// Canonical GAS token contract hash (big-endian display form).
pub const GAS_CONTRACT: &str = "8c23f196d8a1bfd103a9dcb1f9ccf0c611377d3b";
/// Canonical policy contract hash (big-endian display form).
pub const POLICY_CONTRACT: &str = "3209d09120465bf181ced70693b897ec6ea4619a";

/// Resolves `NEO`, `GAS` or `POLICY` (any case) to its canonical hash.
pub fn resolve_alias(alias: &str) -> Option<&'static str> {
    match alias.to_ascii_uppercase().as_str() {
        "NEO" => Some(NEO_CONTRACT),
        "GAS" => Some(GAS_CONTRACT),
        "POLICY" => Some(POLICY_CONTRACT),
        _ => None,
    }
}
