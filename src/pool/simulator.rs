//! Tick-by-tick swap loop.
//!
//! [`simulate`] advances a [`SimulationState`] through as many tick ranges as
//! the specified amount allows, crossing initialized ticks on the way. It
//! mutates the working tick map in place and hands back a checkpoint of the
//! last fully completed cycle, which is what a larger trade of the same batch
//! resumes from.

use crate::FastMap;
use crate::error::{Error, StateError, SwapError};
use crate::math::full_math::{mul_div_floor, unlikely};
use crate::math::reinvestment_math::calc_r_mint_qty;
use crate::math::safe_math::{safe_add_i256, safe_add_u256, safe_sub_i256, truncate_u128};
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MIN_SQRT_RATIO, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio,
};
use crate::pool::snapshot::{PoolSnapshot, TickRecord};
use crate::pool::tick_cross::cross_tick;
use crate::pool::tick_index::TickIndex;
use crate::{FEE_UNITS, MAX_TICK_DISTANCE, TWO_POW_96};
use alloy_primitives::{I256, U256};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwapPhase {
    /// Still stepping through ranges.
    Advancing,
    /// Stopped at the price limit with part of the amount left.
    PriceLimited,
    /// The whole specified amount was used.
    FullyConsumed,
}

/// Direction, fees and limit of one swap. Fixed for the whole simulation.
#[derive(Copy, Clone, Debug)]
pub struct SwapContext {
    pub is_token0: bool,
    pub is_exact_input: bool,
    pub will_up_tick: bool,
    pub limit_sqrt_p: U256,
    pub swap_fee_units: U256,
    pub government_fee_units: U256,
    pub block_timestamp: u32,
}

impl SwapContext {
    /// Context for a swap on `pool`. `limit_sqrt_p` defaults to one unit
    /// inside the price bounds in the direction of travel.
    pub fn new(
        pool: &PoolSnapshot,
        is_token0: bool,
        is_exact_input: bool,
        limit_sqrt_p: Option<U256>,
    ) -> Result<Self, Error> {
        let will_up_tick = is_exact_input != is_token0;
        let limit_sqrt_p = limit_sqrt_p.unwrap_or(default_limit(will_up_tick));

        let in_bounds = if will_up_tick {
            limit_sqrt_p > pool.sqrt_price && limit_sqrt_p < MAX_SQRT_RATIO
        } else {
            limit_sqrt_p < pool.sqrt_price && limit_sqrt_p > MIN_SQRT_RATIO
        };
        if unlikely(!in_bounds) {
            return Err(SwapError::InvalidPriceLimit.into());
        }

        Ok(Self {
            is_token0,
            is_exact_input,
            will_up_tick,
            limit_sqrt_p,
            swap_fee_units: U256::from(pool.swap_fee_units),
            government_fee_units: U256::from(pool.government_fee_units),
            block_timestamp: pool.block_timestamp,
        })
    }
}

/// Furthest usable limit in a direction.
#[inline]
pub fn default_limit(will_up_tick: bool) -> U256 {
    if will_up_tick {
        MAX_SQRT_RATIO - U256::ONE
    } else {
        MIN_SQRT_RATIO + U256::ONE
    }
}

/// Working state of one swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationState {
    /// Part of the specified amount not yet used, signed like the input.
    pub specified: I256,
    /// Accumulated amount of the other token.
    pub returned: I256,
    pub sqrt_p: U256,
    pub current_tick: i32,
    /// Next initialized tick in the direction of travel.
    pub next_tick: i32,
    pub base_l: u128,
    pub reinvest_l: u128,
    pub reinvest_l_last: u128,
    pub fee_growth_global: U256,
    pub seconds_per_liquidity_global: u128,
    pub seconds_per_liquidity_update_time: u32,
    pub r_token_supply: U256,
    pub government_fee: U256,
    pub lp_fee: U256,
    pub tick_count: u32,
    pub phase: SwapPhase,
}

impl SimulationState {
    /// Entry state for a swap of `specified` starting from `pool`.
    pub fn from_snapshot(
        pool: &PoolSnapshot,
        will_up_tick: bool,
        specified: I256,
    ) -> Result<Self, Error> {
        let next_tick = if will_up_tick {
            pool.initialized_ticks.next(pool.nearest_current_tick)?
        } else {
            pool.nearest_current_tick
        };

        Ok(Self {
            specified,
            returned: I256::ZERO,
            sqrt_p: pool.sqrt_price,
            current_tick: pool.current_tick,
            next_tick,
            base_l: pool.base_l,
            reinvest_l: pool.reinvest_l,
            reinvest_l_last: pool.reinvest_l_last,
            fee_growth_global: pool.fee_growth_global,
            seconds_per_liquidity_global: pool.seconds_per_liquidity_global,
            seconds_per_liquidity_update_time: pool.seconds_per_liquidity_update_time,
            r_token_supply: pool.r_token_supply,
            government_fee: U256::ZERO,
            lp_fee: U256::ZERO,
            tick_count: 0,
            phase: SwapPhase::Advancing,
        })
    }

    /// The swap ended without trading anything usable: it ran into the price
    /// limit, or used its whole amount for nothing in return.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.phase == SwapPhase::PriceLimited || self.returned.is_zero()
    }

    /// Greatest initialized tick at or below the final current tick.
    pub fn nearest_current_tick(&self, index: &TickIndex) -> Result<i32, StateError> {
        if self.next_tick > self.current_tick {
            index.previous(self.next_tick)
        } else {
            Ok(self.next_tick)
        }
    }

    /// Brings the time-weighted liquidity accumulator up to the block
    /// timestamp. Only the first call per timestamp adds anything.
    fn sync_seconds_per_liquidity(&mut self, block_timestamp: u32) {
        if block_timestamp <= self.seconds_per_liquidity_update_time {
            return;
        }
        let elapsed = block_timestamp - self.seconds_per_liquidity_update_time;
        self.seconds_per_liquidity_update_time = block_timestamp;
        if self.base_l > 0 {
            let delta = (U256::from(elapsed) << 96usize) / U256::from(self.base_l);
            self.seconds_per_liquidity_global = self
                .seconds_per_liquidity_global
                .wrapping_add(truncate_u128(delta));
        }
    }

    /// Mints reinvestment tokens for the fees collected since the last mint
    /// and moves the LP share into the fee growth accumulator.
    fn mint_fees(&mut self, government_fee_units: U256) -> Result<(), Error> {
        if unlikely(self.r_token_supply.is_zero()) {
            return Err(StateError::ReinvestmentSupplyIsZero.into());
        }
        let r_mint_qty = calc_r_mint_qty(
            U256::from(self.reinvest_l),
            U256::from(self.reinvest_l_last),
            U256::from(self.base_l),
            self.r_token_supply,
        )?;

        if !r_mint_qty.is_zero() {
            self.r_token_supply = safe_add_u256(self.r_token_supply, r_mint_qty)?;
            let government_fee = r_mint_qty.wrapping_mul(government_fee_units) / FEE_UNITS;
            self.government_fee = self.government_fee.wrapping_add(government_fee);
            let lp_fee = r_mint_qty.wrapping_sub(government_fee);
            self.lp_fee = self.lp_fee.wrapping_add(lp_fee);
            self.fee_growth_global = self.fee_growth_global.wrapping_add(mul_div_floor(
                lp_fee,
                TWO_POW_96,
                U256::from(self.base_l),
            )?);
        }
        self.reinvest_l_last = self.reinvest_l;
        Ok(())
    }
}

/// Runs the swap loop on `state` until the specified amount is used up or
/// the price reaches `ctx.limit_sqrt_p`.
///
/// Returns the checkpoint: a copy of `state` after the last step that reached
/// its bounded tick, or the entry state if no step did.
pub fn simulate(
    state: &mut SimulationState,
    ctx: &SwapContext,
    ticks: &mut FastMap<i32, TickRecord>,
    index: &TickIndex,
) -> Result<SimulationState, Error> {
    let mut checkpoint = state.clone();
    state.phase = SwapPhase::Advancing;

    while !state.specified.is_zero() && state.sqrt_p != ctx.limit_sqrt_p {
        // keep each step within MAX_TICK_DISTANCE of the current tick
        let mut temp_next_tick = state.next_tick;
        if ctx.will_up_tick && temp_next_tick > state.current_tick + MAX_TICK_DISTANCE {
            temp_next_tick = state.current_tick + MAX_TICK_DISTANCE;
        } else if !ctx.will_up_tick && temp_next_tick < state.current_tick - MAX_TICK_DISTANCE {
            temp_next_tick = state.current_tick - MAX_TICK_DISTANCE;
        }

        let start_sqrt_p = state.sqrt_p;
        let next_sqrt_p = get_sqrt_ratio_at_tick(temp_next_tick)?;
        let target_sqrt_p = if ctx.will_up_tick == (next_sqrt_p > ctx.limit_sqrt_p) {
            ctx.limit_sqrt_p
        } else {
            next_sqrt_p
        };

        let step = compute_swap_step(
            U256::from(state.base_l) + U256::from(state.reinvest_l),
            state.sqrt_p,
            target_sqrt_p,
            ctx.swap_fee_units,
            state.specified,
            ctx.is_exact_input,
            ctx.is_token0,
        )?;

        let remaining = safe_sub_i256(state.specified, step.used_amount)?;
        if unlikely(!remaining.is_zero() && remaining.is_negative() != state.specified.is_negative()) {
            return Err(SwapError::SpecifiedAmountSignFlipped.into());
        }
        state.specified = remaining;
        state.returned = safe_add_i256(state.returned, step.returned_amount)?;
        state.reinvest_l = state.reinvest_l.wrapping_add(truncate_u128(step.delta_l));
        state.sqrt_p = step.next_sqrt_p;

        // stopped inside the range
        if state.sqrt_p != next_sqrt_p {
            if state.sqrt_p != start_sqrt_p {
                state.current_tick = get_tick_at_sqrt_ratio(state.sqrt_p)?;
            }
            break;
        }

        state.current_tick = if ctx.will_up_tick {
            temp_next_tick
        } else {
            temp_next_tick - 1
        };

        // reached a bounded tick that is not initialized
        if temp_next_tick != state.next_tick {
            checkpoint = state.clone();
            continue;
        }

        state.sync_seconds_per_liquidity(ctx.block_timestamp);
        state.mint_fees(ctx.government_fee_units)?;

        let (base_l, next_tick) = cross_tick(
            ticks,
            index,
            state.next_tick,
            state.base_l,
            state.fee_growth_global,
            state.seconds_per_liquidity_global,
            ctx.will_up_tick,
        )?;
        state.base_l = base_l;
        state.next_tick = next_tick;
        state.tick_count += 1;

        checkpoint = state.clone();
    }

    state.phase = if state.specified.is_zero() {
        SwapPhase::FullyConsumed
    } else {
        SwapPhase::PriceLimited
    };
    Ok(checkpoint)
}
