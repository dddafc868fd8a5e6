use crate::error::StateError;
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

const fn q128(x: u128) -> U256 {
    U256::from_limbs([x as u64, (x >> 64) as u64, 0, 0])
}

// 1/sqrt(1.0001)^(2^i) in Q128.128 for i = 1..=19; bit 0 seeds the ratio.
const RATIO_BIT_0: U256 = q128(0xfffcb933bd6fad37aa2d162d1a594001);
const RATIO_MULTIPLIERS: [(u32, U256); 19] = [
    (0x2, q128(0xfff97272373d413259a46990580e213a)),
    (0x4, q128(0xfff2e50f5f656932ef12357cf3c7fdcc)),
    (0x8, q128(0xffe5caca7e10e4e61c3624eaa0941cd0)),
    (0x10, q128(0xffcb9843d60f6159c9db58835c926644)),
    (0x20, q128(0xff973b41fa98c081472e6896dfb254c0)),
    (0x40, q128(0xff2ea16466c96a3843ec78b326b52861)),
    (0x80, q128(0xfe5dee046a99a2a811c461f1969c3053)),
    (0x100, q128(0xfcbe86c7900a88aedcffc83b479aa3a4)),
    (0x200, q128(0xf987a7253ac413176f2b074cf7815e54)),
    (0x400, q128(0xf3392b0822b70005940c7a398e4b70f3)),
    (0x800, q128(0xe7159475a2c29b7443b29c7fa6e889d9)),
    (0x1000, q128(0xd097f3bdfd2022b8845ad8f792aa5825)),
    (0x2000, q128(0xa9f746462d870fdf8a65dc1f90e061e5)),
    (0x4000, q128(0x70d869a156d2a1b890bb3df62baf32f7)),
    (0x8000, q128(0x31be135f97d08fd981231505542fcfa6)),
    (0x10000, q128(0x9aa508b5b7a84e1c677de54f3e99bc9)),
    (0x20000, q128(0x5d6af8dedb81196699c329225ee604)),
    (0x40000, q128(0x2216e584f5fa1ea926041bedfe98)),
    (0x80000, q128(0x48a170391f7dc42444e8fa2)),
];

// log_sqrt(1.0001)(2) in Q128.128 and the error bounds of the log approximation.
const LOG_SQRT_10001: I256 = I256::from_raw(q128(255738958999603826347141));
const TICK_LOW_ERROR: I256 = I256::from_raw(q128(3402992956809132418596140100660247210));
const TICK_HIGH_ERROR: I256 = I256::from_raw(q128(291339464771989622907027621153398088495));

/// Returns the sqrt price (Q64.96) at `tick`, i.e. `sqrt(1.0001^tick) * 2^96`
/// rounded up, or `StateError::TickOutOfBounds` outside `[MIN_TICK, MAX_TICK]`.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 0x1 != 0 {
        RATIO_BIT_0
    } else {
        U256::ONE << 128usize
    };
    for (bit, multiplier) in RATIO_MULTIPLIERS {
        if abs_tick & bit != 0 {
            ratio = ratio.wrapping_mul(multiplier) >> 128usize;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so that get_tick_at_sqrt_ratio stays consistent.
    let rounding = (ratio.as_limbs()[0] & 0xFFFF_FFFF) != 0;
    Ok((ratio >> 32usize) + U256::from(rounding as u8))
}

/// Returns the greatest tick whose sqrt price is `<= sqrt_price_x96`.
///
/// Fails with `StateError::SqrtPriceOutOfBounds` outside
/// `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << 32usize;
    let msb = 255 - ratio.leading_zeros();

    // Normalize to a 128-bit mantissa in [2^127, 2^128).
    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256::from(128u8))) << 64usize;

    // 14 fractional bits of log2 by repeated squaring.
    for shift in (50..=63usize).rev() {
        r = r.wrapping_mul(r) >> 127usize;
        let f = (r >> 128usize).as_limbs()[0] as usize;
        log_2 |= I256::from_raw(U256::from(f) << shift);
        r >>= f;
    }

    let log_sqrt10001 = log_2.wrapping_mul(LOG_SQRT_10001);
    let tick_low = (log_sqrt10001 - TICK_LOW_ERROR).asr(128).low_i32();
    let tick_high = (log_sqrt10001 + TICK_HIGH_ERROR).asr(128).low_i32();

    if tick_low == tick_high || get_sqrt_ratio_at_tick(tick_high)? > sqrt_price_x96 {
        Ok(tick_low)
    } else {
        Ok(tick_high)
    }
}
