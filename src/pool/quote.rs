use crate::error::{Error, SwapError};
use crate::math::safe_math::{safe_sub_i256, to_int256};
use crate::pool::simulator::{SimulationState, SwapContext, simulate};
use crate::pool::snapshot::PoolSnapshot;
use alloy_primitives::{I256, U256};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Which leg of the trade the quoted amounts fix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwapSide {
    /// Amounts are exact inputs; outputs are amounts received.
    Sell,
    /// Amounts are exact outputs; outputs are amounts paid.
    Buy,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOutputs {
    pub outputs: Vec<U256>,
    /// Ticks crossed by the whole trade of each amount.
    pub tick_counts: Vec<u32>,
}

impl QueryOutputs {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            outputs: Vec::with_capacity(capacity),
            tick_counts: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, output: U256, tick_count: u32) {
        self.outputs.push(output);
        self.tick_counts.push(tick_count);
    }
}

impl PoolSnapshot {
    /// Quotes a batch of trade sizes in one direction.
    ///
    /// `amounts` are magnitudes of the token picked by `is_token0` (input for
    /// [`SwapSide::Sell`], output for [`SwapSide::Buy`]) and must not
    /// decrease, zeros aside. Each amount continues the simulation of the
    /// previous one instead of starting over, so the batch costs about as
    /// much as swapping the largest amount once.
    ///
    /// Once the pool cannot fill an amount (it runs into the price limit or
    /// gives nothing back) that amount and every later one quote zero.
    pub fn query_outputs(
        &self,
        amounts: &[U256],
        is_token0: bool,
        side: SwapSide,
    ) -> Result<QueryOutputs, Error> {
        self.validate()?;
        let specified_amounts = signed_amounts(amounts, side)?;
        // nothing to simulate, so the price limit is never checked
        if specified_amounts.iter().all(|amount| amount.is_zero()) {
            return Ok(QueryOutputs {
                outputs: vec![U256::ZERO; amounts.len()],
                tick_counts: vec![0; amounts.len()],
            });
        }

        let is_exact_input = side == SwapSide::Sell;
        let ctx = SwapContext::new(self, is_token0, is_exact_input, None)?;
        debug!(
            amounts = amounts.len(),
            is_token0,
            ?side,
            will_up_tick = ctx.will_up_tick,
            "quoting batch"
        );

        let mut ticks = self.ticks.clone();
        let mut result = QueryOutputs::with_capacity(amounts.len());
        // (specified amount of the last filled trade, its checkpoint)
        let mut previous: Option<(I256, SimulationState)> = None;
        let mut out_of_range = false;

        for (index, specified) in specified_amounts.into_iter().enumerate() {
            if specified.is_zero() || out_of_range {
                result.push(U256::ZERO, 0);
                continue;
            }

            let mut state = match &previous {
                None => SimulationState::from_snapshot(self, ctx.will_up_tick, specified)?,
                Some((previous_specified, checkpoint)) => {
                    let consumed = safe_sub_i256(*previous_specified, checkpoint.specified)?;
                    SimulationState {
                        specified: safe_sub_i256(specified, consumed)?,
                        ..checkpoint.clone()
                    }
                }
            };

            let checkpoint = simulate(&mut state, &ctx, &mut ticks, &self.initialized_ticks)?;
            if state.is_degenerate() {
                debug!(index, phase = ?state.phase, "pool out of range, quoting zero from here");
                out_of_range = true;
                result.push(U256::ZERO, 0);
                continue;
            }

            let used = safe_sub_i256(specified, state.specified)?;
            let (amount0, amount1) = if is_token0 {
                (used, state.returned)
            } else {
                (state.returned, used)
            };
            let other_leg = if is_token0 { amount1 } else { amount0 };
            let output = match side {
                SwapSide::Sell => other_leg.checked_neg().ok_or(SwapError::UnexpectedSign)?,
                SwapSide::Buy => other_leg,
            };
            if output.is_negative() {
                return Err(SwapError::UnexpectedSign.into());
            }

            trace!(index, output = %output, tick_count = state.tick_count, "quoted amount");
            result.push(output.into_raw(), state.tick_count);
            previous = Some((specified, checkpoint));
        }

        Ok(result)
    }
}

/// Signs `amounts` for `side` and checks they do not decrease.
fn signed_amounts(amounts: &[U256], side: SwapSide) -> Result<Vec<I256>, SwapError> {
    let mut largest = U256::ZERO;
    amounts
        .iter()
        .enumerate()
        .map(|(index, &amount)| {
            if amount.is_zero() {
                return Ok(I256::ZERO);
            }
            if amount < largest {
                return Err(SwapError::AmountsNotAscending { index });
            }
            largest = amount;

            let magnitude = to_int256(amount).map_err(|_| SwapError::AmountOverflow { index })?;
            Ok(match side {
                SwapSide::Sell => magnitude,
                SwapSide::Buy => -magnitude,
            })
        })
        .collect()
}
