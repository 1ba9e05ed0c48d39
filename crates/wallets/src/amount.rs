//! Parsing of user-entered decimal amounts into exact base-unit quantities.

use crate::{
    NATIVE_DECIMALS, NATIVE_SYMBOL,
    error::{ErrorInfo, ErrorKind},
};
use alloy_primitives::{U256, utils::format_units};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasons an amount string is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Please enter an amount")]
    Empty,
    #[error("Amount must not be negative")]
    Negative,
    #[error("`{0}` is not a valid decimal number")]
    NotANumber(String),
    #[error("Amount has more than {0} decimal places")]
    TooPrecise(u8),
    #[error("Amount must be greater than zero")]
    Zero,
    #[error("Amount is too large")]
    Overflow,
}

impl From<AmountError> for ErrorInfo {
    fn from(err: AmountError) -> Self {
        Self::new(ErrorKind::InvalidAmount, err.to_string())
    }
}

/// An exact integer count of the smallest denomination of an asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUnitAmount(U256);

impl BaseUnitAmount {
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    pub const fn get(self) -> U256 {
        self.0
    }

    /// Formats the amount in whole native units, e.g. `1.500000000000000000`.
    pub fn to_native_string(self) -> String {
        format_units(self.0, NATIVE_DECIMALS).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<BaseUnitAmount> for U256 {
    fn from(amount: BaseUnitAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for BaseUnitAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {NATIVE_SYMBOL}", self.to_native_string())
    }
}

/// Validates the free-form amount text entered by the user, at native precision.
///
/// Succeeds only for strictly positive amounts that are exactly representable in wei.
pub fn validate(input: &str) -> Result<BaseUnitAmount, ErrorInfo> {
    let value = parse_units(input, NATIVE_DECIMALS)?;
    if value.is_zero() {
        return Err(AmountError::Zero.into());
    }
    Ok(BaseUnitAmount(value))
}

/// Parses a non-negative decimal string into an integer scaled by `10^decimals`.
///
/// The conversion is exact. Input carrying non-zero digits beyond `decimals` fractional
/// places is rejected instead of truncated.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(rest) = input.strip_prefix('-') {
        // only a well-formed number after the sign counts as negative
        return match parse_units(rest, decimals) {
            Ok(_) => Err(AmountError::Negative),
            Err(err) => Err(err),
        };
    }

    let (int, frac) = input.split_once('.').unwrap_or((input, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !is_digits(int) || !is_digits(frac) {
        return Err(AmountError::NotANumber(input.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooPrecise(decimals));
    }

    let mut digits = String::with_capacity(int.len() + decimals as usize);
    digits.push_str(int);
    digits.push_str(frac);
    digits.extend(std::iter::repeat_n('0', decimals as usize - frac.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    digits.parse::<U256>().map_err(|_| AmountError::Overflow)
}
