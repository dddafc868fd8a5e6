use crate::error::{Error, MathError, SwapError};
use crate::math::full_math::{mul_div_floor, unlikely};
use crate::math::safe_math::safe_sub_i256;
use crate::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::pool::simulator::{SimulationState, SwapContext, SwapPhase, simulate};
use crate::pool::snapshot::PoolSnapshot;
use alloy_primitives::{I256, U256};
use tracing::trace;

const BPS_DENOMINATOR: u32 = 10_000;

/// Computes a `limit_sqrt_p` that is `slippage_bps` basis points away from
/// `sqrt_price_x96` in the direction of travel.
///
/// The tolerance is applied to the sqrt price and the result is clamped to
/// the open interval `(MIN_SQRT_RATIO, MAX_SQRT_RATIO)`, so it is always a
/// valid limit for a price that can still move that way.
pub fn sqrt_price_limit_from_bps(
    sqrt_price_x96: U256,
    will_up_tick: bool,
    slippage_bps: u32,
) -> Result<U256, MathError> {
    let factor = if will_up_tick {
        BPS_DENOMINATOR.saturating_add(slippage_bps)
    } else {
        BPS_DENOMINATOR.saturating_sub(slippage_bps)
    };
    let limit = mul_div_floor(
        sqrt_price_x96,
        U256::from(factor),
        U256::from(BPS_DENOMINATOR),
    )?;
    Ok(limit.clamp(MIN_SQRT_RATIO + U256::ONE, MAX_SQRT_RATIO - U256::ONE))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Whether `swap_qty` is denominated in token0.
    pub is_token0: bool,
    /// Positive for exact input, negative for exact output.
    pub swap_qty: I256,
    /// Sqrt‑price limit in Q96 that bounds how far the price is allowed to move.
    ///
    /// Use [`sqrt_price_limit_from_bps`] to derive this from a slippage tolerance.
    pub limit_sqrt_p: U256,
}

impl SwapParams {
    #[inline]
    pub fn new(is_token0: bool, swap_qty: I256, limit_sqrt_p: U256) -> Self {
        Self {
            is_token0,
            swap_qty,
            limit_sqrt_p,
        }
    }

    /// Swap with the widest limit allowed in its direction.
    #[inline]
    pub fn with_default_limit(is_token0: bool, swap_qty: I256) -> Self {
        let will_up_tick = swap_qty.is_positive() != is_token0;
        Self::new(
            is_token0,
            swap_qty,
            crate::pool::simulator::default_limit(will_up_tick),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    /// Token deltas from the pool's side: positive flows in, negative out.
    pub amount0: I256,
    pub amount1: I256,
    pub ticks_crossed: u32,
    pub phase: SwapPhase,
    /// The pool after the swap.
    pub state: PoolSnapshot,
}

impl PoolSnapshot {
    /// Runs a single swap against the snapshot.
    ///
    /// A swap that reaches `limit_sqrt_p` is a partial fill; the deltas cover
    /// what was actually swapped.
    pub fn swap(&self, params: SwapParams) -> Result<SwapResult, Error> {
        if unlikely(params.swap_qty.is_zero()) {
            return Err(SwapError::AmountSpecifiedIsZero.into());
        }
        self.validate()?;

        let is_exact_input = params.swap_qty.is_positive();
        let ctx = SwapContext::new(
            self,
            params.is_token0,
            is_exact_input,
            Some(params.limit_sqrt_p),
        )?;

        let mut ticks = self.ticks.clone();
        let mut state = SimulationState::from_snapshot(self, ctx.will_up_tick, params.swap_qty)?;
        simulate(&mut state, &ctx, &mut ticks, &self.initialized_ticks)?;

        let used = safe_sub_i256(params.swap_qty, state.specified)?;
        let (amount0, amount1) = if params.is_token0 {
            (used, state.returned)
        } else {
            (state.returned, used)
        };
        trace!(
            %amount0,
            %amount1,
            ticks_crossed = state.tick_count,
            phase = ?state.phase,
            "swap"
        );

        let nearest_current_tick = state.nearest_current_tick(&self.initialized_ticks)?;
        let post = PoolSnapshot {
            swap_fee_units: self.swap_fee_units,
            sqrt_price: state.sqrt_p,
            current_tick: state.current_tick,
            nearest_current_tick,
            base_l: state.base_l,
            reinvest_l: state.reinvest_l,
            reinvest_l_last: state.reinvest_l_last,
            fee_growth_global: state.fee_growth_global,
            seconds_per_liquidity_global: state.seconds_per_liquidity_global,
            seconds_per_liquidity_update_time: state.seconds_per_liquidity_update_time,
            block_timestamp: self.block_timestamp,
            r_token_supply: state.r_token_supply,
            government_fee_units: self.government_fee_units,
            ticks,
            initialized_ticks: self.initialized_ticks.clone(),
        };

        Ok(SwapResult {
            amount0,
            amount1,
            ticks_crossed: state.tick_count,
            phase: state.phase,
            state: post,
        })
    }
}
