//! Network settings passed to the components that need them.
//!
//! Nothing here is global: build a [`Settings`] (or load one from a JSON
//! file) and hand it to the validator, coin selector and logger.

use crate::error::Result;
use crate::types::address::ADDRESS_VERSION;
use crate::types::hash::UInt256;
use crate::utils::log::{self, Level};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of blocks a transaction stays valid for, counted from the
/// current height.
pub const MAX_TRANSACTION_LIFESPAN: u32 = 2_102_400;

pub const MAIN_NET_MAGIC: u32 = 5_195_086;
pub const TEST_NET_MAGIC: u32 = 1_951_352_142;

/// Asset id of GAS, the fee asset on both public networks.
pub const GAS_ASSET_ID: &str = "602c79718b16e442de58778e148d0b1084e3b2dffd5de6b7b16cee7969282de7";
/// Asset id of NEO.
pub const NEO_ASSET_ID: &str = "c56f33fc6ecfcd0c225c4ab356fee59390af8560be0e930faebe74a6daff7c9b";

/// How the edges of the `validUntilBlock` window are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowBound {
    /// `height < vub < height + lifespan`.
    #[default]
    Exclusive,
    /// `height <= vub <= height + lifespan`.
    Inclusive,
}

impl WindowBound {
    /// Whether `vub` is inside the window opened at `height`.
    pub fn contains(self, height: u32, lifespan: u32, vub: u32) -> bool {
        let (low, high) = (u64::from(height), u64::from(height) + u64::from(lifespan));
        let vub = u64::from(vub);
        match self {
            WindowBound::Exclusive => low < vub && vub < high,
            WindowBound::Inclusive => low <= vub && vub <= high,
        }
    }

    /// Largest value inside the window, saturating at `u32::MAX`.
    pub fn upper(self, height: u32, lifespan: u32) -> u32 {
        let high = height.saturating_add(lifespan);
        match self {
            WindowBound::Exclusive => high.saturating_sub(1),
            WindowBound::Inclusive => high,
        }
    }
}

/// Logger switches applied by [`Settings::apply_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSettings {
    pub show_timestamp: bool,
    pub show_level: bool,
    pub min_level: Level,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            show_timestamp: true,
            show_level: true,
            min_level: Level::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Display name, `MainNet` or `TestNet` for the public networks.
    pub network: String,
    pub magic: u32,
    pub rpc_endpoint: String,
    pub address_version: u8,
    /// Asset in which network and system fees are paid.
    pub fee_asset: UInt256,
    pub window_bound: WindowBound,
    pub max_transaction_lifespan: u32,
    pub log: LogSettings,
}

impl Settings {
    pub fn main_net() -> Self {
        Self {
            network: "MainNet".into(),
            magic: MAIN_NET_MAGIC,
            rpc_endpoint: "http://seed1.neo.org:10332".into(),
            address_version: ADDRESS_VERSION,
            fee_asset: gas_asset_id(),
            window_bound: WindowBound::default(),
            max_transaction_lifespan: MAX_TRANSACTION_LIFESPAN,
            log: LogSettings::default(),
        }
    }

    pub fn test_net() -> Self {
        Self {
            network: "TestNet".into(),
            magic: TEST_NET_MAGIC,
            rpc_endpoint: "http://seed5t.neo.org:20332".into(),
            ..Self::main_net()
        }
    }

    /// Reads settings from a JSON file. Missing keys take MainNet values.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Pushes the log switches into the process logger.
    pub fn apply_logging(&self) {
        log::configure(self.log.show_timestamp, self.log.show_level, self.log.min_level);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::main_net()
    }
}

fn gas_asset_id() -> UInt256 {
    UInt256::from_be_hex(GAS_ASSET_ID).unwrap_or_default()
}
