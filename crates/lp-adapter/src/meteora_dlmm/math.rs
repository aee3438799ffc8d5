//! Bin/price conversion and bin-array indexing for the bin family.
//!
//! Bin prices follow `(1 + step/10000)^bin`, computed through f64 logs: the
//! geometric base is exact in neither binary nor decimal, and the round-to-
//! nearest inverse absorbs the float error, so `price_to_bin(bin_to_price(b))`
//! recovers `b` exactly at matching decimals.

use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};

use super::{BINS_PER_ARRAY, MAX_BIN_ID, MIN_BIN_ID};
use crate::error::{Error, RangeError, Result};

fn check_bin(bin_id: i32) -> Result<()> {
    if !(MIN_BIN_ID..=MAX_BIN_ID).contains(&bin_id) {
        return Err(RangeError::OutOfBounds {
            unit: "bin",
            value: bin_id as i64,
            min: MIN_BIN_ID as i64,
            max: MAX_BIN_ID as i64,
        }
        .into());
    }
    Ok(())
}

/// Price of token X in token Y at a bin:
/// `(1 + step/10000)^bin * 10^(decimals_x - decimals_y)`.
pub fn bin_to_price(
    bin_id: i32,
    bin_step: u16,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<Decimal> {
    check_bin(bin_id)?;
    let base = 1.0 + bin_step as f64 / 10_000.0;
    let price =
        base.powi(bin_id) * 10f64.powi(decimals_x as i32 - decimals_y as i32);
    Decimal::from_f64(price)
        .ok_or_else(|| Error::AmountConversion(format!("bin {bin_id} price not representable")))
}

/// Inverse of [`bin_to_price`]: log of the adjusted price, rounded to the
/// nearest bin and clamped to the valid range.
pub fn price_to_bin(
    price: Decimal,
    bin_step: u16,
    decimals_x: u8,
    decimals_y: u8,
) -> Result<i32> {
    let adjusted = price
        .to_f64()
        .ok_or_else(|| Error::AmountConversion(format!("price {price} not representable")))?
        / 10f64.powi(decimals_x as i32 - decimals_y as i32);
    if adjusted <= 0.0 {
        return Err(RangeError::OutOfBounds {
            unit: "price",
            value: 0,
            min: MIN_BIN_ID as i64,
            max: MAX_BIN_ID as i64,
        }
        .into());
    }
    let base = 1.0 + bin_step as f64 / 10_000.0;
    let bin = (adjusted.ln() / base.ln()).round() as i64;
    Ok(bin.clamp(MIN_BIN_ID as i64, MAX_BIN_ID as i64) as i32)
}

/// The single active bin as a degenerate range.
pub fn one_bin_range(active_id: i32) -> (i32, i32) {
    (active_id, active_id)
}

/// Index of the 70-bin array holding `bin_id`, floored toward -inf so that
/// bin -1 lands in array -1 and bin -71 in array -2.
pub fn bin_array_index(bin_id: i32) -> i64 {
    bin_id.div_euclid(BINS_PER_ARRAY) as i64
}

/// Inclusive bin bounds of one bin array.
pub fn bin_array_bounds(index: i64) -> (i32, i32) {
    let lower = (index * BINS_PER_ARRAY as i64) as i32;
    (lower, lower + BINS_PER_ARRAY - 1)
}

/// Bin-array indices a position over `[lower, upper]` touches, ascending.
pub fn bin_array_indices(lower_bin: i32, upper_bin: i32) -> Vec<i64> {
    let first = bin_array_index(lower_bin);
    let last = bin_array_index(upper_bin);
    (first..=last).collect()
}
