use crate::FastMap;
use crate::error::{Error, StateError};
use crate::math::liquidity_math::apply_liquidity_delta;
use crate::pool::snapshot::TickRecord;
use crate::pool::tick_index::TickIndex;
use alloy_primitives::U256;
use tracing::trace;

/// Crosses the initialized `tick` in the given direction.
///
/// Flips the tick's outside accumulators against the globals and applies its
/// `liquidity_net` to `liquidity`. `liquidity_net` is stored as the change
/// when crossing upwards, so it is negated here when falling; nowhere else
/// deals with that sign.
///
/// Returns the new active liquidity and the next initialized tick in the
/// direction of travel.
pub fn cross_tick(
    ticks: &mut FastMap<i32, TickRecord>,
    index: &TickIndex,
    tick: i32,
    liquidity: u128,
    fee_growth_global: U256,
    seconds_per_liquidity_global: u128,
    rising: bool,
) -> Result<(u128, i32), Error> {
    let next_tick = index.advance(tick, rising)?;
    let record = ticks
        .get_mut(&tick)
        .ok_or(StateError::TickNotInitialized(tick))?;

    record.fee_growth_outside = fee_growth_global.wrapping_sub(record.fee_growth_outside);
    record.seconds_per_liquidity_outside =
        seconds_per_liquidity_global.wrapping_sub(record.seconds_per_liquidity_outside);

    // the stored sign is for crossing upwards; falling flips it
    let magnitude = record.liquidity_net.unsigned_abs();
    let is_add = if rising {
        record.liquidity_net >= 0
    } else {
        record.liquidity_net < 0
    };
    let new_liquidity = apply_liquidity_delta(liquidity, magnitude, is_add)?;

    trace!(
        tick,
        rising,
        liquidity = new_liquidity,
        fee_growth_outside = %record.fee_growth_outside,
        next_tick,
        "crossed tick"
    );

    Ok((new_liquidity, next_tick))
}
