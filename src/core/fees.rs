//! Network fee calculation.
//!
//! The network fee pays for the serialized size of a transaction and for
//! running each witness's verification script. Verification cost is static:
//! the sum of the opcode prices plus the price of every called service.

use crate::core::transaction::Transaction;
use crate::types::encoding::EncodingError;
use crate::types::fixed8::Fixed8;
use crate::virtual_machine::token::OpToken;

/// Static execution cost of a verification script.
pub fn verification_cost(script: &[u8]) -> Result<Fixed8, EncodingError> {
    let mut total: i64 = 0;
    for token in OpToken::from_script(script)? {
        total = total
            .checked_add(token.price()?)
            .ok_or_else(|| EncodingError::InvalidValue("verification cost overflow".into()))?;
    }
    Ok(Fixed8::from_raw(total))
}

/// Minimum network fee for `tx` at the given per-byte rate.
pub fn network_fee(tx: &Transaction, fee_per_byte: Fixed8) -> Result<Fixed8, EncodingError> {
    let overflow = || EncodingError::InvalidValue("network fee overflow".into());
    let size = i64::try_from(tx.size()).map_err(|_| overflow())?;
    let mut fee = Fixed8::from_raw(fee_per_byte.raw().checked_mul(size).ok_or_else(overflow)?);
    for witness in &tx.witnesses {
        fee = fee
            .checked_add(verification_cost(&witness.verification_script)?)
            .ok_or_else(overflow)?;
    }
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::utils::{
        MULTISIG_VERIFICATION, SIG_VERIFICATION, fixture_transaction, name_script,
    };

    #[test]
    fn single_signature_cost() {
        let cost = verification_cost(&hex::decode(SIG_VERIFICATION).unwrap()).unwrap();
        assert_eq!(cost, Fixed8::from_raw(120 + 1_000_000));
    }

    #[test]
    fn multisig_cost() {
        let cost = verification_cost(&hex::decode(MULTISIG_VERIFICATION).unwrap()).unwrap();
        assert_eq!(cost, Fixed8::from_raw(30 + 3 * 120 + 30 + 1_000_000));
    }

    #[test]
    fn unknown_syscall_is_an_error() {
        assert!(verification_cost(&[0x68, 0, 0, 0, 0]).is_err());
        assert!(verification_cost(&[0x21, 0x00]).is_err());
    }

    #[test]
    fn fee_for_fixture_transactions() {
        let rate = Fixed8::from_raw(1000);
        assert_eq!(
            network_fee(&fixture_transaction(), rate).unwrap().to_string(),
            "0.0237254"
        );
        let tx = fixture_transaction().with_script(name_script());
        assert_eq!(network_fee(&tx, rate).unwrap().to_string(), "0.0240554");
    }

    #[test]
    fn fee_without_witnesses_is_size_only() {
        let tx = Transaction::new();
        assert_eq!(network_fee(&tx, Fixed8::from_raw(10)).unwrap(), Fixed8::from_raw(250));
    }
}
