use crate::error::AmountError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Monetary amount in the smallest currency unit.
///
/// All comparisons happen on the raw integer; decimal conversion is only
/// for display and user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(pub U256);

impl Amount {
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn from_raw(raw: impl Into<U256>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Returns `self * pct / 100`, rounded down.
    pub fn percent(self, pct: u8) -> Option<Amount> {
        self.0
            .checked_mul(U256::from(pct))
            .map(|scaled| Amount(scaled / U256::from(100u8)))
    }

    /// Parses a human decimal string such as `"1.5"` into smallest units.
    pub fn parse_units(value: &str, decimals: u8) -> Result<Self, AmountError> {
        let trimmed = value.trim();
        let parsed =
            Decimal::from_str(trimmed).map_err(|_| AmountError::Malformed(trimmed.to_string()))?;

        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(AmountError::Negative(trimmed.to_string()));
        }

        let parsed = parsed.normalize();
        if parsed.scale() > u32::from(decimals) {
            return Err(AmountError::TooPrecise {
                value: trimmed.to_string(),
                decimals,
            });
        }

        let mut multiplier = Decimal::ONE;
        for _ in 0..decimals {
            multiplier = multiplier
                .checked_mul(Decimal::TEN)
                .ok_or_else(|| AmountError::Overflow(trimmed.to_string()))?;
        }

        let raw = parsed
            .abs()
            .checked_mul(multiplier)
            .and_then(|d| d.trunc().to_u128())
            .ok_or_else(|| AmountError::Overflow(trimmed.to_string()))?;

        Ok(Self(U256::from(raw)))
    }

    pub fn parse_ether(value: &str) -> Result<Self, AmountError> {
        Self::parse_units(value, super::ETHER_DECIMALS)
    }

    /// Formats the amount as an exact human decimal, trimming trailing zeros.
    pub fn format_units(&self, decimals: u8) -> String {
        let base = U256::exp10(decimals as usize);
        let whole = self.0 / base;
        let frac = self.0 % base;

        if frac.is_zero() {
            return whole.to_string();
        }

        let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    pub fn format_ether(&self) -> String {
        self.format_units(super::ETHER_DECIMALS)
    }

    /// Lossy conversion for display arithmetic; `None` when out of `Decimal` range.
    pub fn to_decimal(&self, decimals: u8) -> Option<Decimal> {
        Decimal::from_str(&self.format_units(decimals)).ok()
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for Amount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
