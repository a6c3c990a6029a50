//! Smallest-unit amounts and the decimal codec at the controller's edges.
//!
//! The remote ledger only ever sees [`Wei`]. Human-readable amounts are
//! decimal strings in the major unit with a fixed exponent of
//! [`ETHER_DECIMALS`]; [`parse_ether`] and [`format_ether`] are the only
//! conversions between the two.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/// Fractional exponent between the major unit and the smallest unit.
pub const ETHER_DECIMALS: u32 = 18;

const WEI_PER_ETHER: u128 = 10u128.pow(ETHER_DECIMALS);

/// An amount denominated in the smallest currency unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub const fn new(wei: u128) -> Self {
        Self(wei)
    }

    /// Whole major units, e.g. `Wei::ether(2)` is two ether.
    pub fn ether(whole: u64) -> Self {
        Self(u128::from(whole) * WEI_PER_ETHER)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The major-unit decimal rendering; see [`format_ether`].
    pub fn to_ether_string(&self) -> String {
        format_ether(*self)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl From<u128> for Wei {
    fn from(wei: u128) -> Self {
        Self(wei)
    }
}

/// Convert a major-unit decimal string into [`Wei`].
///
/// Accepts `digits`, `digits.`, `.digits`, and `digits.digits`. Trailing
/// zeros past the 18th fractional digit are tolerated; any other digit past
/// it would lose precision and is rejected. Signs, whitespace, exponents,
/// and thousands separators are rejected.
pub fn parse_ether(value: &str) -> Result<Wei, AmountError> {
    if value.is_empty() {
        return Err(AmountError::Empty);
    }
    if value.starts_with('-') {
        return Err(AmountError::Negative(value.to_string()));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed(value.to_string()));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::Malformed(value.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS as usize {
        return Err(AmountError::TooPrecise {
            value: value.to_string(),
            decimals: ETHER_DECIMALS,
        });
    }

    let overflow = || AmountError::Overflow(value.to_string());
    let whole_units = accumulate_digits(whole).ok_or_else(overflow)?;
    let scale = 10u128.pow(ETHER_DECIMALS - fraction.len() as u32);
    let fraction_units = accumulate_digits(fraction)
        .and_then(|f| f.checked_mul(scale))
        .ok_or_else(overflow)?;

    whole_units
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(fraction_units))
        .map(Wei)
        .ok_or_else(overflow)
}

/// Render [`Wei`] as a major-unit decimal string.
///
/// Always carries at least one fractional digit (`1.0`, `1.5`, `0.0`), with
/// trailing zeros removed.
pub fn format_ether(amount: Wei) -> String {
    let whole = amount.0 / WEI_PER_ETHER;
    let fraction = amount.0 % WEI_PER_ETHER;
    let padded = format!("{fraction:0width$}", width = ETHER_DECIMALS as usize);
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

fn accumulate_digits(digits: &str) -> Option<u128> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
    })
}
