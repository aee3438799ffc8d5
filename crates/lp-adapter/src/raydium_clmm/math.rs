//! Tick/price conversion and liquidity math for the tick family.
//!
//! Sqrt prices are Q64.64 fixed point. Tick→sqrt-price goes through the
//! precomputed powers-of-the-base table with a bit scan, never through
//! floats, so the result is bit-exact across the full tick range. Liquidity
//! and amount conversions widen to 256/512-bit intermediates and divide
//! once, truncating, so no step loses more than one unit.

use primitive_types::{U256, U512};
use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};

use super::{MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, Q64, TICK_ARRAY_SIZE};
use crate::error::{Error, RangeError, Result};

/// X64 ratios of `sqrt(1.0001)^(-2^i)` feeding the bit scan below; entry 0
/// is the identity for even ticks, entry 1 the half-step for odd ticks.
const TICK_RATIOS: [u128; 21] = [
    0x10000000000000000,
    0xfffcb933bd6fb800,
    0xfff97272373d4130,
    0xfff2e50f5f656932,
    0xffe5caca7e10e6e2,
    0xffcb9843d37f513e,
    0xff973b41fa98c081,
    0xff2ea16466c96a3e,
    0xfe5dee046a99a2f8,
    0xfcbe86c7900a88a6,
    0xf987a7253ac41317,
    0xf3392b0822b70003,
    0xe7159475a2c29b64,
    0xd097f3bdfd2022b8,
    0xa9f746462d8706df,
    0x70d869a156d2a1b8,
    0x31be135f97d08fd9,
    0x9aa508b5b7a84e1c,
    0x5d6af8dedb811966,
    0x2216e584f5fa1ea,
    0x48a170391f7dc22,
];

fn check_tick(tick: i32) -> Result<()> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(RangeError::OutOfBounds {
            unit: "tick",
            value: tick as i64,
            min: MIN_TICK as i64,
            max: MAX_TICK as i64,
        }
        .into());
    }
    Ok(())
}

/// Convert a tick to its sqrt price in X64 fixed point.
pub fn tick_to_sqrt_price_x64(tick: i32) -> Result<u128> {
    check_tick(tick)?;

    let tick_abs = tick.unsigned_abs();

    // bit 0 selects the base ratio, bits 1..=19 accumulate table entries;
    // every intermediate fits u128 because ratio <= 2^64 and each table
    // entry is < 2^64
    let mut ratio = if tick_abs & 1 != 0 {
        TICK_RATIOS[1]
    } else {
        TICK_RATIOS[0]
    };
    for i in 1..20 {
        if tick_abs & (1 << i) != 0 {
            ratio = (ratio * TICK_RATIOS[i + 1]) >> 64;
        }
    }

    // the scan computes 1.0001^(-|tick|); invert for positive ticks using
    // an exact floor(2^128 / ratio) (2^128 - 1 would bias the result)
    if tick > 0 {
        let quotient = u128::MAX / ratio;
        let remainder = u128::MAX % ratio;
        ratio = if remainder + 1 == ratio {
            quotient + 1
        } else {
            quotient
        };
    }

    Ok(ratio)
}

/// Square an X64 sqrt price and rescale by the token decimal difference.
pub fn sqrt_price_x64_to_price(
    sqrt_price_x64: u128,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<Decimal> {
    let sqrt_price = sqrt_price_x64 as f64 / Q64 as f64;
    let price = sqrt_price * sqrt_price * 10f64.powi(decimals_a as i32 - decimals_b as i32);
    Decimal::from_f64(price)
        .ok_or_else(|| Error::AmountConversion(format!("price {price} not representable")))
}

/// Tick to human price (token A in token B).
pub fn tick_to_price(tick: i32, decimals_a: u8, decimals_b: u8) -> Result<Decimal> {
    let sqrt_price_x64 = tick_to_sqrt_price_x64(tick)?;
    sqrt_price_x64_to_price(sqrt_price_x64, decimals_a, decimals_b)
}

/// Price to tick, floored to the pool's tick spacing and clamped to the
/// valid range. Flooring (not truncation) keeps negative ticks correct.
pub fn price_to_tick(
    price: Decimal,
    decimals_a: u8,
    decimals_b: u8,
    tick_spacing: u16,
) -> Result<i32> {
    let spacing = tick_spacing.max(1) as i32;
    let adjusted = price
        .to_f64()
        .ok_or_else(|| Error::AmountConversion(format!("price {price} not representable")))?
        / 10f64.powi(decimals_a as i32 - decimals_b as i32);
    if adjusted <= 0.0 {
        return Err(RangeError::OutOfBounds {
            unit: "price",
            value: 0,
            min: MIN_TICK as i64,
            max: MAX_TICK as i64,
        }
        .into());
    }

    let tick = (adjusted.ln() / 1.0001f64.ln()).floor() as i64;
    let tick = i32::try_from(tick.clamp(MIN_TICK as i64, MAX_TICK as i64))
        .expect("clamped to i32 range");
    Ok((tick.div_euclid(spacing) * spacing).clamp(MIN_TICK, MAX_TICK))
}

/// Tightest range around the current tick: one spacing unit wide.
pub fn one_tick_range(current_tick: i32, tick_spacing: u16) -> (i32, i32) {
    let spacing = tick_spacing.max(1) as i32;
    let lower = current_tick.div_euclid(spacing) * spacing;
    (lower, lower + spacing)
}

/// Start tick of the tick array containing `tick`, floored toward -inf.
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let ticks_per_array = TICK_ARRAY_SIZE * tick_spacing.max(1) as i32;
    tick.div_euclid(ticks_per_array) * ticks_per_array
}

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn saturate_u64(value: U512) -> u64 {
    if value > U512::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_u64()
    }
}

fn saturate_u128(value: U512) -> u128 {
    if value > U512::from(u128::MAX) {
        u128::MAX
    } else {
        value.low_u128()
    }
}

/// Token A owed by `liquidity` between two sqrt prices:
/// `L * (sb - sa) * Q64 / (sa * sb)`, truncating.
pub fn token_amount_a_from_liquidity(liquidity: u128, sqrt_a: u128, sqrt_b: u128) -> u64 {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if liquidity == 0 || sqrt_a == sqrt_b || sqrt_a == 0 {
        return 0;
    }
    // single 512-bit division keeps the result exact to the last unit
    let numerator =
        U256::from(liquidity).full_mul(U256::from(sqrt_b - sqrt_a)) * U512::from(Q64);
    let denominator = U256::from(sqrt_a).full_mul(U256::from(sqrt_b));
    saturate_u64(numerator / denominator)
}

/// Token B owed by `liquidity` between two sqrt prices:
/// `L * (sb - sa) / Q64`, truncating.
pub fn token_amount_b_from_liquidity(liquidity: u128, sqrt_a: u128, sqrt_b: u128) -> u64 {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if liquidity == 0 || sqrt_a == sqrt_b {
        return 0;
    }
    let amount = U256::from(liquidity).full_mul(U256::from(sqrt_b - sqrt_a)) / U512::from(Q64);
    saturate_u64(amount)
}

/// Amounts a position holds at the current price, split by the three
/// regimes: below range (all A), in range (both), above range (all B).
pub fn amounts_from_liquidity(
    liquidity: u128,
    sqrt_current: u128,
    sqrt_lower: u128,
    sqrt_upper: u128,
) -> (u64, u64) {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_lower, sqrt_upper);
    if sqrt_current <= sqrt_lower {
        (
            token_amount_a_from_liquidity(liquidity, sqrt_lower, sqrt_upper),
            0,
        )
    } else if sqrt_current < sqrt_upper {
        (
            token_amount_a_from_liquidity(liquidity, sqrt_current, sqrt_upper),
            token_amount_b_from_liquidity(liquidity, sqrt_lower, sqrt_current),
        )
    } else {
        (
            0,
            token_amount_b_from_liquidity(liquidity, sqrt_lower, sqrt_upper),
        )
    }
}

/// Liquidity supported by `amount_a` alone: `a * sa * sb / ((sb - sa) * Q64)`.
pub fn liquidity_from_amount_a(amount_a: u64, sqrt_a: u128, sqrt_b: u128) -> u128 {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if amount_a == 0 || sqrt_a == sqrt_b {
        return 0;
    }
    let numerator = (U256::from(amount_a) * U256::from(sqrt_a)).full_mul(U256::from(sqrt_b));
    let denominator = U256::from(sqrt_b - sqrt_a) * U256::from(Q64);
    saturate_u128(numerator / U512::from(denominator))
}

/// Liquidity supported by `amount_b` alone: `b * Q64 / (sb - sa)`.
pub fn liquidity_from_amount_b(amount_b: u64, sqrt_a: u128, sqrt_b: u128) -> u128 {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if amount_b == 0 || sqrt_a == sqrt_b {
        return 0;
    }
    let liquidity =
        U256::from(amount_b).full_mul(U256::from(Q64)) / U512::from(sqrt_b - sqrt_a);
    saturate_u128(liquidity)
}

/// Liquidity achievable with both amounts at the current price. In range the
/// result is the minimum of what each amount alone supports, so the deposit
/// can never exceed either declared amount.
pub fn liquidity_from_amounts(
    amount_a: u64,
    amount_b: u64,
    sqrt_current: u128,
    sqrt_lower: u128,
    sqrt_upper: u128,
) -> u128 {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_lower, sqrt_upper);
    if sqrt_current <= sqrt_lower {
        liquidity_from_amount_a(amount_a, sqrt_lower, sqrt_upper)
    } else if sqrt_current < sqrt_upper {
        let by_a = liquidity_from_amount_a(amount_a, sqrt_current, sqrt_upper);
        let by_b = liquidity_from_amount_b(amount_b, sqrt_lower, sqrt_current);
        by_a.min(by_b)
    } else {
        liquidity_from_amount_b(amount_b, sqrt_lower, sqrt_upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_zero_is_unit_sqrt_price() {
        assert_eq!(tick_to_sqrt_price_x64(0).unwrap(), Q64);
    }

    #[test]
    fn min_tick_sqrt_price_matches_the_protocol_constant() {
        let sqrt_min = tick_to_sqrt_price_x64(MIN_TICK).unwrap();
        // the table is truncated at 64 bits, allow a final-unit wobble
        assert!(
            (sqrt_min as i128 - MIN_SQRT_PRICE_X64 as i128).abs() <= 1,
            "sqrt price at MIN_TICK drifted: {sqrt_min}"
        );
    }

    #[test]
    fn sqrt_price_is_strictly_monotonic() {
        let ticks = [MIN_TICK, -100_000, -100, -1, 0, 1, 100, 100_000, MAX_TICK];
        let prices: Vec<u128> = ticks
            .iter()
            .map(|&t| tick_to_sqrt_price_x64(t).unwrap())
            .collect();
        for pair in prices.windows(2) {
            assert!(pair[0] < pair[1], "sqrt price must increase with tick");
        }
    }

    #[test]
    fn out_of_range_ticks_are_rejected() {
        assert!(tick_to_sqrt_price_x64(MIN_TICK - 1).is_err());
        assert!(tick_to_sqrt_price_x64(MAX_TICK + 1).is_err());
    }

    #[test]
    fn positive_and_negative_ticks_are_reciprocal() {
        // 1.0001^t * 1.0001^-t == 1, up to fixed-point truncation
        for tick in [1, 100, 10_000, 250_000] {
            let pos = tick_to_sqrt_price_x64(tick).unwrap();
            let neg = tick_to_sqrt_price_x64(-tick).unwrap();
            let product = U256::from(pos) * U256::from(neg) >> 128;
            assert!(
                product == U256::zero() || product == U256::one(),
                "tick {tick}: product {product}"
            );
        }
    }

    #[test]
    fn tick_price_round_trip_within_spacing() {
        for spacing in [1u16, 10, 60] {
            for tick in [-30_000, -600, -60, 0, 60, 600, 30_000] {
                let price = tick_to_price(tick, 9, 6).unwrap();
                let recovered = price_to_tick(price, 9, 6, spacing).unwrap();
                assert!(
                    (recovered - tick).abs() <= spacing as i32,
                    "tick {tick} spacing {spacing}: recovered {recovered}"
                );
            }
        }
    }

    #[test]
    fn price_to_tick_aligns_to_spacing() {
        let price = tick_to_price(12_345, 6, 6).unwrap();
        let tick = price_to_tick(price, 6, 6, 10).unwrap();
        assert_eq!(tick % 10, 0);
    }

    #[test]
    fn one_tick_range_floors_toward_negative_infinity() {
        assert_eq!(one_tick_range(100, 1), (100, 101));
        assert_eq!(one_tick_range(105, 10), (100, 110));
        assert_eq!(one_tick_range(-105, 10), (-110, -100));
    }

    #[test]
    fn tick_array_start_floors_toward_negative_infinity() {
        assert_eq!(tick_array_start_index(0, 10), 0);
        assert_eq!(tick_array_start_index(599, 10), 0);
        assert_eq!(tick_array_start_index(600, 10), 600);
        assert_eq!(tick_array_start_index(-1, 10), -600);
        assert_eq!(tick_array_start_index(-600, 10), -600);
        assert_eq!(tick_array_start_index(-601, 10), -1200);
    }

    #[test]
    fn amounts_split_by_price_regime() {
        let sqrt_lower = tick_to_sqrt_price_x64(0).unwrap();
        let sqrt_upper = tick_to_sqrt_price_x64(10_000).unwrap();
        let liquidity = 1_000_000_000_000u128;

        let below = tick_to_sqrt_price_x64(-5_000).unwrap();
        let (a, b) = amounts_from_liquidity(liquidity, below, sqrt_lower, sqrt_upper);
        assert!(a > 0 && b == 0, "below range holds only token A");

        let inside = tick_to_sqrt_price_x64(5_000).unwrap();
        let (a, b) = amounts_from_liquidity(liquidity, inside, sqrt_lower, sqrt_upper);
        assert!(a > 0 && b > 0, "in range holds both tokens");

        let above = tick_to_sqrt_price_x64(15_000).unwrap();
        let (a, b) = amounts_from_liquidity(liquidity, above, sqrt_lower, sqrt_upper);
        assert!(a == 0 && b > 0, "above range holds only token B");
    }

    #[test]
    fn liquidity_round_trip_never_exceeds_inputs() {
        let sqrt_lower = tick_to_sqrt_price_x64(-10_000).unwrap();
        let sqrt_upper = tick_to_sqrt_price_x64(10_000).unwrap();
        let sqrt_current = tick_to_sqrt_price_x64(250).unwrap();

        let amount_a = 5_000_000_000u64;
        let amount_b = 3_000_000_000u64;
        let liquidity =
            liquidity_from_amounts(amount_a, amount_b, sqrt_current, sqrt_lower, sqrt_upper);
        assert!(liquidity > 0);

        let (back_a, back_b) =
            amounts_from_liquidity(liquidity, sqrt_current, sqrt_lower, sqrt_upper);
        assert!(back_a <= amount_a, "{back_a} > {amount_a}");
        assert!(back_b <= amount_b, "{back_b} > {amount_b}");
    }

    #[test]
    fn zero_liquidity_and_degenerate_ranges_yield_zero() {
        let sqrt = tick_to_sqrt_price_x64(100).unwrap();
        assert_eq!(token_amount_a_from_liquidity(0, sqrt, sqrt * 2), 0);
        assert_eq!(token_amount_b_from_liquidity(10, sqrt, sqrt), 0);
        assert_eq!(liquidity_from_amount_a(0, sqrt, sqrt * 2), 0);
        assert_eq!(liquidity_from_amount_b(10, sqrt, sqrt), 0);
    }
}
