//! Fixed-point amounts with eight fractional digits.
//!
//! Every fee and asset value on the ledger is an integer count of base units
//! (1e-8 of a whole token). `Fixed8` keeps that integer and never touches
//! floating point except when converting caller input.

use crate::types::encoding::EncodingError;
use neotx_derive::BinaryCodec;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of fractional digits.
pub const DECIMALS: u32 = 8;

/// Base units in one whole token.
pub const ONE: i64 = 100_000_000;

/// Amount in base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BinaryCodec)]
pub struct Fixed8(i64);

impl Fixed8 {
    pub const ZERO: Fixed8 = Fixed8(0);

    /// Wraps a raw base-unit count.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole tokens, e.g. `from_whole(10)` is `10.00000000`.
    pub fn from_whole(units: i64) -> Option<Self> {
        units.checked_mul(ONE).map(Self)
    }

    /// Converts a float through its shortest decimal form, rounding to 8 places.
    pub fn from_f64(value: f64) -> Result<Self, EncodingError> {
        if !value.is_finite() {
            return Err(EncodingError::InvalidValue(format!(
                "amount {value} is not finite"
            )));
        }
        format!("{value}").parse()
    }

    /// True when the amount has no fractional part.
    pub fn is_whole(self) -> bool {
        self.0 % ONE == 0
    }

    /// Rounds up to the next whole token.
    /// Rounds up to the next whole token, `None` past the top of the range.
    pub fn ceil(self) -> Option<Self> {
        let rem = self.0.rem_euclid(ONE);
        if rem == 0 {
            Some(self)
        } else {
            (self.0 - rem).checked_add(ONE).map(Self)
        }
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Parses a plain decimal string into an integer scaled by `10^decimals`.
///
/// Digits beyond `decimals` are rounded half away from zero. The second
/// element is false when rounding discarded a nonzero digit.
pub(crate) fn parse_scaled(s: &str, decimals: u32) -> Result<(i128, bool), EncodingError> {
    let invalid = || EncodingError::InvalidValue(format!("invalid decimal {s:?}"));
    let trimmed = s.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let overflow = || EncodingError::InvalidValue(format!("decimal {s:?} out of range"));
    let mut value: i128 = 0;
    for digit in int_part.bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((digit - b'0') as i128))
            .ok_or_else(overflow)?;
    }

    let frac = frac_part.as_bytes();
    for i in 0..decimals as usize {
        let digit = frac.get(i).map_or(0, |d| d - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as i128))
            .ok_or_else(overflow)?;
    }

    let dropped = frac.get(decimals as usize..).unwrap_or(&[]);
    let exact = dropped.iter().all(|&d| d == b'0');
    if dropped.first().is_some_and(|&d| d >= b'5') {
        value = value.checked_add(1).ok_or_else(overflow)?;
    }

    Ok((if negative { -value } else { value }, exact))
}

impl FromStr for Fixed8 {
    type Err = EncodingError;

    /// Parses a decimal string, rounding past the eighth fractional digit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scaled, _) = parse_scaled(s, DECIMALS)?;
        i64::try_from(scaled)
            .map(Self)
            .map_err(|_| EncodingError::InvalidValue(format!("amount {s:?} out of range")))
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / ONE as u64;
        let frac = abs % ONE as u64;
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let digits = format!("{frac:08}");
            write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

// Operators saturate at the ends of the `i64` range. Use the `checked_*`
// methods where overflow must be reported.

impl Add for Fixed8 {
    type Output = Fixed8;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed8 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Fixed8 {
    type Output = Fixed8;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed8 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Fixed8 {
    type Output = Fixed8;
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// Scales a per-unit rate, e.g. fee-per-byte times size.
impl Mul<i64> for Fixed8 {
    type Output = Fixed8;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Fixed8 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fixed8::ZERO, Add::add)
    }
}

impl Serialize for Fixed8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fixed8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Fixed8Visitor;

        impl Visitor<'_> for Fixed8Visitor {
            type Value = Fixed8;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount as string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Fixed8, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fixed8, E> {
                Fixed8::from_whole(v).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fixed8, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(Fixed8::from_whole)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Fixed8, E> {
                Fixed8::from_f64(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Fixed8Visitor)
    }
}
