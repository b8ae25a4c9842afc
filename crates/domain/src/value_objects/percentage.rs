use crate::value_objects::amount::Amount;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

const FULL_BPS: u32 = 10_000;

/// Percentage in the `[0, 100]` range, e.g. `Percentage(dec!(42.5))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(100))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(100)).to_u32().unwrap_or(0)
    }

    /// Share of `part` in `whole`, in basis-point resolution, clamped to 100%.
    ///
    /// A zero `whole` yields 0%.
    pub fn of_ratio(part: Amount, whole: Amount) -> Self {
        if whole.is_zero() {
            return Self(Decimal::ZERO);
        }

        let full = U256::from(FULL_BPS);
        let bps = match part.raw().checked_mul(full) {
            Some(scaled) => scaled / whole.raw(),
            None => {
                let unit = whole.raw() / full;
                if unit.is_zero() { full } else { part.raw() / unit }
            }
        };

        let bps = if bps > full { FULL_BPS } else { bps.as_u32() };
        Self::from_bps(bps)
    }
}
