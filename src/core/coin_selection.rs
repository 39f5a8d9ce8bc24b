//! Greedy per-asset coin selection for UTXO transfers.
//!
//! Unspent entries are consumed in the order the balance lists them until
//! the requested amount (plus the fee, for the fee asset) is covered. The
//! leftover goes back to the owner as a change output.

use crate::types::address::{address_to_script_hash, script_hash_to_address};
use crate::types::encoding::EncodingError;
use crate::types::fixed8::Fixed8;
use crate::types::hash::{UInt160, UInt256};
use neotx_derive::{BinaryCodec, Error};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinSelectionError {
    /// The balance holds no unspent entry for the asset.
    #[error("no funds for asset {asset}")]
    NoFunds { asset: UInt256 },
    /// The entries for the asset do not cover the requirement.
    #[error("insufficient funds for asset {asset}: need {required}, have {available}")]
    InsufficientFunds {
        asset: UInt256,
        required: Fixed8,
        available: Fixed8,
    },
    /// Summing the amounts of the asset left the `Fixed8` range.
    #[error("amount overflow for asset {asset}")]
    AmountOverflow { asset: UInt256 },
}

/// An output of a previous transaction that has not been spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unspent {
    pub txid: UInt256,
    pub index: u16,
    pub value: Fixed8,
}

/// Unspent entries of one asset, in the order they will be consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBalance {
    pub asset_id: UInt256,
    pub unspent: Vec<Unspent>,
}

impl AssetBalance {
    pub fn new(asset_id: UInt256) -> Self {
        Self {
            asset_id,
            unspent: Vec::new(),
        }
    }

    pub fn add_unspent(&mut self, txid: UInt256, index: u16, value: Fixed8) -> &mut Self {
        self.unspent.push(Unspent { txid, index, value });
        self
    }

    pub fn total(&self) -> Fixed8 {
        self.unspent.iter().map(|u| u.value).sum()
    }
}

/// Funds held by one account, keyed by asset symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Script hash that receives change.
    pub owner: UInt160,
    assets: BTreeMap<String, AssetBalance>,
}

impl Balance {
    pub fn new(owner: UInt160) -> Self {
        Self {
            owner,
            assets: BTreeMap::new(),
        }
    }

    pub fn from_address(address: &str, version: u8) -> Result<Self, EncodingError> {
        Ok(Self::new(address_to_script_hash(address, version)?))
    }

    pub fn address(&self, version: u8) -> String {
        script_hash_to_address(&self.owner, version)
    }

    /// Entry for `symbol`, created empty on first use.
    pub fn asset_mut(&mut self, symbol: &str, asset_id: UInt256) -> &mut AssetBalance {
        self.assets
            .entry(symbol.to_string())
            .or_insert_with(|| AssetBalance::new(asset_id))
    }

    pub fn asset(&self, symbol: &str) -> Option<&AssetBalance> {
        self.assets.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// First record, by symbol, holding `asset_id`.
    pub fn find_by_id(&self, asset_id: &UInt256) -> Option<&AssetBalance> {
        self.assets.values().find(|a| a.asset_id == *asset_id)
    }
}

/// Reference to a previous transaction output, used as an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinaryCodec)]
pub struct CoinReference {
    pub prev_hash: UInt256,
    pub prev_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinaryCodec)]
pub struct TransactionOutput {
    pub asset_id: UInt256,
    pub value: Fixed8,
    pub script_hash: UInt160,
}

/// Inputs to spend and change to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<CoinReference>,
    pub change: Vec<TransactionOutput>,
}

/// Picks inputs from `balance` covering `intents` plus `fee` in `fee_asset`.
///
/// Assets are processed in order of first appearance in `intents`; the fee
/// asset comes last if no intent names it. A zero fee adds nothing.
pub fn calculate_inputs(
    balance: &Balance,
    intents: &[TransactionOutput],
    fee: Fixed8,
    fee_asset: UInt256,
) -> Result<Selection, CoinSelectionError> {
    let mut required: Vec<(UInt256, Fixed8)> = Vec::new();
    for intent in intents {
        add_requirement(&mut required, intent.asset_id, intent.value)?;
    }
    if fee > Fixed8::ZERO {
        add_requirement(&mut required, fee_asset, fee)?;
    }

    let mut selection = Selection::default();
    for (asset, amount) in required {
        if amount <= Fixed8::ZERO {
            continue;
        }
        let unspent = balance
            .find_by_id(&asset)
            .map(|a| a.unspent.as_slice())
            .filter(|u| !u.is_empty())
            .ok_or(CoinSelectionError::NoFunds { asset })?;

        let mut gathered = Fixed8::ZERO;
        let mut used = 0;
        for coin in unspent {
            if gathered >= amount {
                break;
            }
            gathered = gathered
                .checked_add(coin.value)
                .ok_or(CoinSelectionError::AmountOverflow { asset })?;
            used += 1;
        }
        if gathered < amount {
            return Err(CoinSelectionError::InsufficientFunds {
                asset,
                required: amount,
                available: gathered,
            });
        }

        selection.inputs.extend(unspent[..used].iter().map(|coin| CoinReference {
            prev_hash: coin.txid,
            prev_index: coin.index,
        }));
        let remainder = gathered
            .checked_sub(amount)
            .ok_or(CoinSelectionError::AmountOverflow { asset })?;
        if remainder > Fixed8::ZERO {
            crate::info!("change of {remainder} in asset {asset} to {}", balance.owner);
            selection.change.push(TransactionOutput {
                asset_id: asset,
                value: remainder,
                script_hash: balance.owner,
            });
        }
    }
    Ok(selection)
}

fn add_requirement(
    required: &mut Vec<(UInt256, Fixed8)>,
    asset: UInt256,
    value: Fixed8,
) -> Result<(), CoinSelectionError> {
    match required.iter_mut().find(|(id, _)| *id == asset) {
        Some((_, total)) => {
            *total = total
                .checked_add(value)
                .ok_or(CoinSelectionError::AmountOverflow { asset })?;
        }
        None => required.push((asset, value)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GAS_ASSET_ID, NEO_ASSET_ID};
    use crate::types::address::ADDRESS_VERSION;
    use crate::types::encoding::{Decode, Encode};

    fn neo() -> UInt256 {
        UInt256::from_be_hex(NEO_ASSET_ID).unwrap()
    }

    fn gas() -> UInt256 {
        UInt256::from_be_hex(GAS_ASSET_ID).unwrap()
    }

    fn txid(byte: u8) -> UInt256 {
        UInt256([byte; 32])
    }

    fn amount(s: &str) -> Fixed8 {
        s.parse().unwrap()
    }

    fn recipient() -> UInt160 {
        UInt160::from_be_hex("5df31f6f59e6a4fbdd75103786bf73db1000b235").unwrap()
    }

    fn owner() -> UInt160 {
        UInt160::from_be_hex("cef0c0fdcfe7838eff6ff104f9cdec2922297537").unwrap()
    }

    fn intent(asset_id: UInt256, value: &str) -> TransactionOutput {
        TransactionOutput {
            asset_id,
            value: amount(value),
            script_hash: recipient(),
        }
    }

    fn funded_balance() -> Balance {
        let mut balance = Balance::new(owner());
        balance.asset_mut("NEO", neo()).add_unspent(txid(0xab), 0, amount("10"));
        balance.asset_mut("GAS", gas()).add_unspent(txid(0xcd), 0, amount("1.5"));
        balance
    }

    // ========== Error Tests ==========

    #[test]
    fn empty_balance_has_no_funds() {
        let err = calculate_inputs(&Balance::new(owner()), &[intent(neo(), "1")], Fixed8::ZERO, gas()).unwrap_err();
        assert_eq!(err, CoinSelectionError::NoFunds { asset: neo() });
        assert!(err.to_string().starts_with("no funds"));
    }

    #[test]
    fn empty_entry_list_has_no_funds() {
        let mut balance = Balance::new(owner());
        balance.asset_mut("NEO", neo());
        assert!(matches!(
            calculate_inputs(&balance, &[intent(neo(), "1")], Fixed8::ZERO, gas()),
            Err(CoinSelectionError::NoFunds { .. })
        ));
    }

    #[test]
    fn short_balance_is_insufficient() {
        let mut balance = Balance::new(owner());
        balance.asset_mut("NEO", neo()).add_unspent(txid(1), 0, amount("1"));
        let err = calculate_inputs(&balance, &[intent(neo(), "2")], Fixed8::ZERO, gas()).unwrap_err();
        assert_eq!(
            err,
            CoinSelectionError::InsufficientFunds {
                asset: neo(),
                required: amount("2"),
                available: amount("1"),
            }
        );
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn fee_can_make_balance_insufficient() {
        let mut balance = Balance::new(owner());
        balance.asset_mut("GAS", gas()).add_unspent(txid(1), 0, amount("1"));
        assert!(calculate_inputs(&balance, &[intent(gas(), "1")], Fixed8::ZERO, gas()).is_ok());
        assert!(matches!(
            calculate_inputs(&balance, &[intent(gas(), "1")], amount("0.1"), gas()),
            Err(CoinSelectionError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn huge_entries_report_overflow() {
        let mut balance = Balance::new(owner());
        balance
            .asset_mut("NEO", neo())
            .add_unspent(txid(1), 0, Fixed8::from_raw(i64::MAX - 10))
            .add_unspent(txid(2), 1, Fixed8::from_raw(100));
        let request = TransactionOutput {
            asset_id: neo(),
            value: Fixed8::from_raw(i64::MAX),
            script_hash: recipient(),
        };
        assert_eq!(
            calculate_inputs(&balance, &[request], Fixed8::ZERO, gas()),
            Err(CoinSelectionError::AmountOverflow { asset: neo() })
        );
    }

    #[test]
    fn huge_requests_report_overflow() {
        let request = TransactionOutput {
            asset_id: gas(),
            value: Fixed8::from_raw(i64::MAX),
            script_hash: recipient(),
        };
        assert_eq!(
            calculate_inputs(&funded_balance(), &[request], amount("1"), gas()),
            Err(CoinSelectionError::AmountOverflow { asset: gas() })
        );
    }

    // ========== Selection Tests ==========

    #[test]
    fn covers_intents_and_fee_with_change() {
        let intents = [intent(neo(), "1"), intent(gas(), "0.5")];
        let selection = calculate_inputs(&funded_balance(), &intents, amount("0.1"), gas()).unwrap();
        assert_eq!(
            selection.inputs,
            vec![
                CoinReference { prev_hash: txid(0xab), prev_index: 0 },
                CoinReference { prev_hash: txid(0xcd), prev_index: 0 },
            ]
        );
        assert_eq!(
            selection.change,
            vec![
                TransactionOutput { asset_id: neo(), value: amount("9"), script_hash: owner() },
                TransactionOutput { asset_id: gas(), value: amount("0.9"), script_hash: owner() },
            ]
        );
    }

    #[test]
    fn consumes_entries_in_order_and_stops_when_covered() {
        let mut balance = Balance::new(owner());
        balance
            .asset_mut("NEO", neo())
            .add_unspent(txid(1), 0, amount("3"))
            .add_unspent(txid(2), 1, amount("1"))
            .add_unspent(txid(3), 2, amount("50"));
        let selection = calculate_inputs(&balance, &[intent(neo(), "2"), intent(neo(), "2")], Fixed8::ZERO, gas()).unwrap();
        assert_eq!(
            selection.inputs.iter().map(|i| i.prev_index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(selection.change.is_empty());
    }

    #[test]
    fn fee_alone_selects_fee_asset() {
        let selection = calculate_inputs(&funded_balance(), &[], amount("0.5"), gas()).unwrap();
        assert_eq!(selection.inputs, vec![CoinReference { prev_hash: txid(0xcd), prev_index: 0 }]);
        assert_eq!(selection.change[0].value, amount("1"));
    }

    #[test]
    fn nothing_requested_selects_nothing() {
        assert_eq!(
            calculate_inputs(&Balance::new(owner()), &[], Fixed8::ZERO, gas()).unwrap(),
            Selection::default()
        );
    }

    // ========== Balance Tests ==========

    #[test]
    fn balance_lookup_by_symbol_and_id() {
        let balance = funded_balance();
        assert_eq!(balance.symbols().collect::<Vec<_>>(), vec!["GAS", "NEO"]);
        assert_eq!(balance.asset("NEO").unwrap().total(), amount("10"));
        assert_eq!(balance.find_by_id(&gas()).unwrap().total(), amount("1.5"));
        assert!(balance.find_by_id(&txid(9)).is_none());
    }

    #[test]
    fn balance_address_roundtrip() {
        let address = funded_balance().address(ADDRESS_VERSION);
        let balance = Balance::from_address(&address, ADDRESS_VERSION).unwrap();
        assert_eq!(balance.owner, owner());
        assert!(Balance::from_address("1", ADDRESS_VERSION).is_err());
    }

    // ========== Codec Tests ==========

    #[test]
    fn coin_reference_layout() {
        let reference = CoinReference { prev_hash: txid(0xab), prev_index: 0x0102 };
        let bytes = reference.to_bytes();
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[32..], &[0x02, 0x01]);
        assert_eq!(CoinReference::from_bytes(&bytes).unwrap(), reference);
    }

    #[test]
    fn output_layout() {
        let output = intent(gas(), "0.5");
        let bytes = output.to_bytes();
        assert_eq!(bytes.len(), 32 + 8 + 20);
        assert_eq!(hex::encode(&bytes[32..40]), "80f0fa0200000000");
    }
}
