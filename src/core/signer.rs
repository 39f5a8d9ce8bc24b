//! Transaction signers and their witness scopes.

use crate::error::Error;
use crate::types::encoding::{Decode, Encode, EncodeSink, EncodingError, Reader};
use crate::types::hash::UInt160;
use crate::virtual_machine::errors::NotFoundError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Compressed public key identifying a contract group.
pub type GroupKey = [u8; 33];

/// Bit flags limiting where a signer's witness is accepted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WitnessScope(u8);

impl WitnessScope {
    /// Valid everywhere. Also the empty flag set.
    pub const GLOBAL: WitnessScope = WitnessScope(0x00);
    pub const CALLED_BY_ENTRY: WitnessScope = WitnessScope(0x01);
    pub const CUSTOM_CONTRACTS: WitnessScope = WitnessScope(0x10);
    pub const CUSTOM_GROUPS: WitnessScope = WitnessScope(0x20);

    const NAMED_FLAGS: [(WitnessScope, &'static str); 3] = [
        (WitnessScope::CALLED_BY_ENTRY, "CalledByEntry"),
        (WitnessScope::CUSTOM_CONTRACTS, "CustomContracts"),
        (WitnessScope::CUSTOM_GROUPS, "CustomGroups"),
    ];

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: WitnessScope) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WitnessScope {
    type Output = WitnessScope;

    fn bitor(self, rhs: Self) -> Self::Output {
        WitnessScope(self.0 | rhs.0)
    }
}

impl BitOrAssign for WitnessScope {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Comma-delimited flag names, `Global` for the empty set.
impl fmt::Display for WitnessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == WitnessScope::GLOBAL {
            return f.write_str("Global");
        }
        let names = Self::NAMED_FLAGS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        let known = Self::NAMED_FLAGS.iter().fold(0, |acc, (flag, _)| acc | flag.0);
        let mut out = names.join(", ");
        if self.0 & !known != 0 {
            out.push_str(&format!(", 0x{:02x}", self.0 & !known));
        }
        f.write_str(out.trim_start_matches(", "))
    }
}

impl FromStr for WitnessScope {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').map(str::trim).try_fold(WitnessScope::GLOBAL, |acc, name| {
            if name == "Global" {
                return Ok(acc);
            }
            Self::NAMED_FLAGS
                .iter()
                .find(|(_, n)| *n == name)
                .map(|(flag, _)| acc | *flag)
                .ok_or_else(|| NotFoundError::EnumName {
                    kind: "WitnessScope",
                    name: name.to_string(),
                })
        })
    }
}

/// An account co-signing a transaction.
///
/// The allowed lists can only be non-empty while the matching scope bit is
/// set; the mutators keep that invariant by setting the bit themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signer {
    pub account: UInt160,
    scopes: WitnessScope,
    allowed_contracts: Vec<UInt160>,
    allowed_groups: Vec<GroupKey>,
}

impl Signer {
    pub fn new(account: UInt160, scopes: WitnessScope) -> Self {
        Self {
            account,
            scopes,
            allowed_contracts: Vec::new(),
            allowed_groups: Vec::new(),
        }
    }

    pub fn scopes(&self) -> WitnessScope {
        self.scopes
    }

    pub fn allowed_contracts(&self) -> &[UInt160] {
        &self.allowed_contracts
    }

    pub fn allowed_groups(&self) -> &[GroupKey] {
        &self.allowed_groups
    }

    /// Appends contracts and sets `CustomContracts`.
    pub fn add_allowed_contracts(&mut self, contracts: impl IntoIterator<Item = UInt160>) {
        self.scopes |= WitnessScope::CUSTOM_CONTRACTS;
        self.allowed_contracts.extend(contracts);
    }

    /// Appends groups and sets `CustomGroups`.
    pub fn add_allowed_groups(&mut self, groups: impl IntoIterator<Item = GroupKey>) {
        self.scopes |= WitnessScope::CUSTOM_GROUPS;
        self.allowed_groups.extend(groups);
    }

    /// `20 + 1 + 20 * contracts + 33 * groups`, list prefixes not counted.
    pub fn size(&self) -> usize {
        UInt160::LEN + 1 + UInt160::LEN * self.allowed_contracts.len() + 33 * self.allowed_groups.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let json = SignerJson {
            account: self.account,
            scopes: self.scopes.to_string(),
            allowed_contracts: self
                .scopes
                .contains(WitnessScope::CUSTOM_CONTRACTS)
                .then(|| self.allowed_contracts.clone()),
            allowed_groups: self
                .scopes
                .contains(WitnessScope::CUSTOM_GROUPS)
                .then(|| self.allowed_groups.iter().map(hex::encode).collect()),
        };
        serde_json::to_value(json).unwrap_or_default()
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, Error> {
        let json: SignerJson = serde_json::from_value(value.clone())?;
        let mut signer = Signer::new(json.account, json.scopes.parse()?);
        if let Some(contracts) = json.allowed_contracts {
            signer.add_allowed_contracts(contracts);
        }
        if let Some(groups) = json.allowed_groups {
            let keys = groups
                .iter()
                .map(String::as_str)
                .map(parse_group_key)
                .collect::<Result<Vec<_>, _>>()?;
            signer.add_allowed_groups(keys);
        }
        Ok(signer)
    }
}

fn parse_group_key(s: &str) -> Result<GroupKey, EncodingError> {
    let bytes = crate::types::encoding::decode_hex(s)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| EncodingError::InvalidLength { expected: 33, actual })
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignerJson {
    account: UInt160,
    scopes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowed_contracts: Option<Vec<UInt160>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowed_groups: Option<Vec<String>>,
}

impl Encode for Signer {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.account.encode(out);
        out.write(&[self.scopes.bits()]);
        if self.scopes.contains(WitnessScope::CUSTOM_CONTRACTS) {
            self.allowed_contracts.encode(out);
        }
        if self.scopes.contains(WitnessScope::CUSTOM_GROUPS) {
            self.allowed_groups.encode(out);
        }
    }
}

impl Decode for Signer {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
        let account = UInt160::decode(reader)?;
        let scopes = WitnessScope::from_bits(reader.read_u8()?);
        let allowed_contracts = if scopes.contains(WitnessScope::CUSTOM_CONTRACTS) {
            Vec::<UInt160>::decode(reader)?
        } else {
            Vec::new()
        };
        let allowed_groups = if scopes.contains(WitnessScope::CUSTOM_GROUPS) {
            Vec::<GroupKey>::decode(reader)?
        } else {
            Vec::new()
        };
        Ok(Signer {
            account,
            scopes,
            allowed_contracts,
            allowed_groups,
        })
    }
}
