//! Caller-facing price range specification.
//!
//! A `PriceRange` is meaningless on its own: it must be resolved against a
//! pool's current price and discretization before any instruction can be
//! built. Resolution lives with each protocol's adapter; this module only
//! carries the specification and the shared relative→absolute conversion.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RangeError, Result};

/// Price range specification for LP positions.
///
/// ```
/// use lp_adapter::range::PriceRange;
/// use rust_decimal::Decimal;
///
/// // maximum concentration: the single active tick/bin
/// let tight = PriceRange::single_unit();
/// // +/- 1%
/// let pct = PriceRange::percent(Decimal::new(1, 2));
/// // +/- 100 bps, asymmetric forms also available
/// let bps = PriceRange::bps(100);
/// // explicit tick/bin bounds
/// let units = PriceRange::units(-120, 120);
/// # let _ = (tight, pct, bps, units);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PriceRange {
    /// The single discretized unit containing the current price.
    SingleUnit,
    /// Explicit inclusive unit bounds (ticks or bin ids, protocol-dependent).
    Units { lower: i32, upper: i32 },
    /// Fractional offsets around the current price: `-0.01` / `0.01` = ±1%.
    Percent { lower: Decimal, upper: Decimal },
    /// Basis-point offsets around the current price.
    Bps { lower: i32, upper: i32 },
    /// Absolute price bounds (token A priced in token B).
    Absolute { lower: Decimal, upper: Decimal },
}

impl PriceRange {
    pub fn single_unit() -> Self {
        Self::SingleUnit
    }

    pub fn units(lower: i32, upper: i32) -> Self {
        Self::Units { lower, upper }
    }

    /// Symmetric fractional range: `percent(0.01)` is ±1%.
    pub fn percent(fraction: Decimal) -> Self {
        Self::Percent {
            lower: -fraction,
            upper: fraction,
        }
    }

    pub fn percent_asymmetric(lower: Decimal, upper: Decimal) -> Self {
        Self::Percent { lower, upper }
    }

    /// Symmetric basis-point range: `bps(100)` is ±1%.
    pub fn bps(basis_points: i32) -> Self {
        Self::Bps {
            lower: -basis_points,
            upper: basis_points,
        }
    }

    pub fn bps_asymmetric(lower: i32, upper: i32) -> Self {
        Self::Bps { lower, upper }
    }

    pub fn absolute(lower: Decimal, upper: Decimal) -> Self {
        Self::Absolute { lower, upper }
    }

    pub fn is_single_unit(&self) -> bool {
        matches!(self, Self::SingleUnit)
    }

    /// Resolve the relative modes to absolute price bounds. `SingleUnit` and
    /// `Units` need protocol context and are rejected here.
    pub fn to_absolute(&self, current_price: Decimal) -> Result<(Decimal, Decimal)> {
        let (lower, upper) = match self {
            Self::Absolute { lower, upper } => (*lower, *upper),
            Self::Percent { lower, upper } => {
                if current_price <= Decimal::ZERO {
                    return Err(RangeError::UnsupportedRangeMode(
                        "relative range against a non-positive price",
                    )
                    .into());
                }
                (
                    current_price * (Decimal::ONE + lower),
                    current_price * (Decimal::ONE + upper),
                )
            }
            Self::Bps { lower, upper } => {
                if current_price <= Decimal::ZERO {
                    return Err(RangeError::UnsupportedRangeMode(
                        "relative range against a non-positive price",
                    )
                    .into());
                }
                let lower = Decimal::from(*lower) / Decimal::from(10_000);
                let upper = Decimal::from(*upper) / Decimal::from(10_000);
                (
                    current_price * (Decimal::ONE + lower),
                    current_price * (Decimal::ONE + upper),
                )
            }
            Self::SingleUnit | Self::Units { .. } => {
                return Err(RangeError::UnsupportedRangeMode(
                    "unit ranges resolve against a pool, not a price",
                )
                .into())
            }
        };
        if lower > upper {
            return Err(RangeError::LowerGreaterThanUpper {
                lower: lower.to_string(),
                upper: upper.to_string(),
            }
            .into());
        }
        Ok((lower, upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_resolves_around_current_price() {
        let range = PriceRange::percent(Decimal::new(1, 2)); // +/- 1%
        let (lower, upper) = range.to_absolute(Decimal::from(100)).unwrap();
        assert_eq!(lower, Decimal::from(99));
        assert_eq!(upper, Decimal::from(101));
    }

    #[test]
    fn bps_matches_percent() {
        let bps = PriceRange::bps(100);
        let pct = PriceRange::percent(Decimal::new(1, 2));
        let price = Decimal::from(250);
        assert_eq!(
            bps.to_absolute(price).unwrap(),
            pct.to_absolute(price).unwrap()
        );
    }

    #[test]
    fn unit_modes_need_protocol_context() {
        assert!(PriceRange::single_unit()
            .to_absolute(Decimal::from(1))
            .is_err());
        assert!(PriceRange::units(-10, 10)
            .to_absolute(Decimal::from(1))
            .is_err());
    }

    #[test]
    fn relative_range_rejects_zero_price() {
        assert!(PriceRange::bps(100).to_absolute(Decimal::ZERO).is_err());
    }
}
