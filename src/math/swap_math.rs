//! Single-range swap step for pools that compound swap fees into
//! reinvestment liquidity.
//!
//! Fees are not taken out of the input amount. Instead every step returns a
//! `delta_l`, the liquidity minted from the fee, which the caller adds to the
//! pool's reinvestment liquidity. Sign conventions follow the pool contract:
//! amounts flowing into the pool are positive, amounts leaving it negative.
//! `used_amount` is in the specified token and `returned_amount` in the other.

use crate::error::Error;
use crate::math::full_math::{mul_div_ceiling, mul_div_floor};
use crate::math::quad_math::get_smaller_root_of_quad_eqn;
use crate::math::safe_math::{
    rev_to_int256, safe_add_i256, safe_add_u256, safe_div_u256, safe_mul_u256, safe_sub_u256,
    to_int256, to_uint160,
};
use crate::{FEE_UNITS, RESOLUTION, TWO_FEE_UNITS, TWO_POW_96};
use alloy_primitives::{I256, U256};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapStep {
    /// Price at the end of the step.
    pub next_sqrt_p: U256,
    /// Part of the specified amount consumed by this step.
    pub used_amount: I256,
    /// Amount of the other token, signed from the pool's point of view.
    pub returned_amount: I256,
    /// Liquidity minted from the swap fee.
    pub delta_l: U256,
}

/// Computes one swap step from `current_sqrt_p` towards `target_sqrt_p`.
///
/// The step reaches the target only if `specified_amount` is large enough;
/// otherwise it consumes the whole amount and stops inside the range. All
/// roundings favour the pool.
pub fn compute_swap_step(
    liquidity: U256,
    current_sqrt_p: U256,
    target_sqrt_p: U256,
    fee_in_fee_units: U256,
    specified_amount: I256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<SwapStep, Error> {
    // happens when a price limit sits exactly on an initialized tick
    if current_sqrt_p == target_sqrt_p {
        return Ok(SwapStep {
            next_sqrt_p: current_sqrt_p,
            used_amount: I256::ZERO,
            returned_amount: I256::ZERO,
            delta_l: U256::ZERO,
        });
    }

    let mut used_amount = calc_reach_amount(
        liquidity,
        current_sqrt_p,
        target_sqrt_p,
        fee_in_fee_units,
        is_exact_input,
        is_token0,
    )?;

    let reaches_target = if is_exact_input {
        used_amount <= specified_amount
    } else {
        used_amount > specified_amount
    };
    if !reaches_target {
        used_amount = specified_amount;
    }

    let abs_delta = used_amount.unsigned_abs();
    let (next_sqrt_p, delta_l) = if reaches_target {
        let delta_l = calc_incremental_liquidity(
            abs_delta,
            liquidity,
            current_sqrt_p,
            target_sqrt_p,
            is_exact_input,
            is_token0,
        )?;
        (target_sqrt_p, delta_l)
    } else {
        let delta_l = estimate_incremental_liquidity(
            abs_delta,
            liquidity,
            current_sqrt_p,
            fee_in_fee_units,
            is_exact_input,
            is_token0,
        )?;
        let next_sqrt_p = calc_final_price(
            abs_delta,
            liquidity,
            delta_l,
            current_sqrt_p,
            is_exact_input,
            is_token0,
        )?;
        (to_uint160(next_sqrt_p)?, delta_l)
    };

    let returned_amount = calc_returned_amount(
        liquidity,
        current_sqrt_p,
        next_sqrt_p,
        delta_l,
        is_exact_input,
        is_token0,
    )?;

    Ok(SwapStep {
        next_sqrt_p,
        used_amount,
        returned_amount,
        delta_l,
    })
}

/// Amount of the specified token needed to move the price from
/// `current_sqrt_p` to `target_sqrt_p`, fee included.
///
/// Rounded down so that slightly less is required to cross into the next
/// range. Negative for exact output.
pub fn calc_reach_amount(
    liquidity: U256,
    current_sqrt_p: U256,
    target_sqrt_p: U256,
    fee_in_fee_units: U256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<I256, Error> {
    let abs_price_diff = current_sqrt_p.abs_diff(target_sqrt_p);

    if is_exact_input {
        if is_token0 {
            // 2 * L * diff / (sqrtPc * (2 * sqrtPt - fee * sqrtPc))
            let denominator = safe_sub_u256(
                safe_mul_u256(TWO_FEE_UNITS, target_sqrt_p)?,
                safe_mul_u256(fee_in_fee_units, current_sqrt_p)?,
            )?;
            let numerator = mul_div_floor(
                liquidity,
                safe_mul_u256(TWO_FEE_UNITS, abs_price_diff)?,
                denominator,
            )?;
            Ok(to_int256(mul_div_floor(numerator, TWO_POW_96, current_sqrt_p)?)?)
        } else {
            // 2 * L * diff * sqrtPc / (2 * sqrtPc - fee * sqrtPt)
            let denominator = safe_sub_u256(
                safe_mul_u256(TWO_FEE_UNITS, current_sqrt_p)?,
                safe_mul_u256(fee_in_fee_units, target_sqrt_p)?,
            )?;
            let numerator = mul_div_floor(
                liquidity,
                safe_mul_u256(TWO_FEE_UNITS, abs_price_diff)?,
                denominator,
            )?;
            Ok(to_int256(mul_div_floor(numerator, current_sqrt_p, TWO_POW_96)?)?)
        }
    } else if is_token0 {
        // L * diff * (2 * sqrtPc - fee * (sqrtPc + sqrtPt))
        //   / (sqrtPc * sqrtPt * (2 * sqrtPc - fee * sqrtPt))
        let denominator = safe_sub_u256(
            safe_mul_u256(TWO_FEE_UNITS, current_sqrt_p)?,
            safe_mul_u256(fee_in_fee_units, target_sqrt_p)?,
        )?;
        let numerator = safe_sub_u256(
            denominator,
            safe_mul_u256(fee_in_fee_units, current_sqrt_p)?,
        )?;
        let numerator = mul_div_floor(liquidity << RESOLUTION, numerator, denominator)?;
        let amount = safe_div_u256(
            mul_div_floor(numerator, abs_price_diff, current_sqrt_p)?,
            target_sqrt_p,
        )?;
        Ok(rev_to_int256(amount)?)
    } else {
        // L * diff * (2 * sqrtPt - fee * (sqrtPt + sqrtPc)) / (2 * sqrtPt - fee * sqrtPc)
        let denominator = safe_sub_u256(
            safe_mul_u256(TWO_FEE_UNITS, target_sqrt_p)?,
            safe_mul_u256(fee_in_fee_units, current_sqrt_p)?,
        )?;
        let numerator = safe_sub_u256(
            denominator,
            safe_mul_u256(fee_in_fee_units, target_sqrt_p)?,
        )?;
        let numerator = mul_div_floor(liquidity, numerator, denominator)?;
        Ok(rev_to_int256(mul_div_floor(numerator, abs_price_diff, TWO_POW_96)?)?)
    }
}

/// Fee liquidity for a final step that stops inside the range.
pub fn estimate_incremental_liquidity(
    abs_delta: U256,
    liquidity: U256,
    current_sqrt_p: U256,
    fee_in_fee_units: U256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<U256, Error> {
    let fee_amount = safe_mul_u256(abs_delta, fee_in_fee_units)?;

    if is_exact_input {
        return if is_token0 {
            // fee * delta * sqrtPc / 2
            Ok(mul_div_floor(
                current_sqrt_p,
                fee_amount,
                TWO_FEE_UNITS << RESOLUTION,
            )?)
        } else {
            // fee * delta / (2 * sqrtPc)
            Ok(mul_div_floor(
                TWO_POW_96,
                fee_amount,
                safe_mul_u256(TWO_FEE_UNITS, current_sqrt_p)?,
            )?)
        };
    }

    // smaller root of a*x^2 - 2*b*x + c = 0, x = deltaL
    let a = fee_in_fee_units;
    let mut b = safe_mul_u256(safe_sub_u256(FEE_UNITS, fee_in_fee_units)?, liquidity)?;
    let mut c = safe_mul_u256(fee_amount, liquidity)?;
    let scaled_delta = safe_mul_u256(FEE_UNITS, abs_delta)?;
    if is_token0 {
        b = safe_sub_u256(b, mul_div_floor(scaled_delta, current_sqrt_p, TWO_POW_96)?)?;
        c = mul_div_floor(c, current_sqrt_p, TWO_POW_96)?;
    } else {
        b = safe_sub_u256(b, mul_div_floor(scaled_delta, TWO_POW_96, current_sqrt_p)?)?;
        c = mul_div_floor(c, TWO_POW_96, current_sqrt_p)?;
    }
    Ok(get_smaller_root_of_quad_eqn(a, b, c)?)
}

/// Fee liquidity for a step that reaches `next_sqrt_p`.
///
/// Can come out as zero when rounding makes the new virtual reserve smaller
/// than `liquidity`.
pub fn calc_incremental_liquidity(
    abs_delta: U256,
    liquidity: U256,
    current_sqrt_p: U256,
    next_sqrt_p: U256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<U256, Error> {
    let total = if is_token0 {
        // sqrtPn * (L / sqrtPc +/- delta)
        let reserve = mul_div_floor(liquidity, TWO_POW_96, current_sqrt_p)?;
        let reserve = if is_exact_input {
            safe_add_u256(reserve, abs_delta)?
        } else {
            safe_sub_u256(reserve, abs_delta)?
        };
        mul_div_floor(next_sqrt_p, reserve, TWO_POW_96)?
    } else {
        // (L * sqrtPc +/- delta) / sqrtPn
        let reserve = mul_div_floor(liquidity, current_sqrt_p, TWO_POW_96)?;
        let reserve = if is_exact_input {
            safe_add_u256(reserve, abs_delta)?
        } else {
            safe_sub_u256(reserve, abs_delta)?
        };
        mul_div_floor(reserve, TWO_POW_96, next_sqrt_p)?
    };

    Ok(total.saturating_sub(liquidity))
}

/// End price of a step that stops inside the range.
///
/// Rounded so the price moves slightly less than the exact value: up when
/// the price is falling and down when it is rising.
pub fn calc_final_price(
    abs_delta: U256,
    liquidity: U256,
    delta_l: U256,
    current_sqrt_p: U256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<U256, Error> {
    let grown = safe_add_u256(liquidity, delta_l)?;

    if is_token0 {
        let tmp = mul_div_floor(abs_delta, current_sqrt_p, TWO_POW_96)?;
        if is_exact_input {
            Ok(mul_div_ceiling(grown, current_sqrt_p, safe_add_u256(liquidity, tmp)?)?)
        } else {
            Ok(mul_div_floor(grown, current_sqrt_p, safe_sub_u256(liquidity, tmp)?)?)
        }
    } else {
        let tmp = mul_div_floor(abs_delta, TWO_POW_96, current_sqrt_p)?;
        if is_exact_input {
            Ok(mul_div_floor(safe_add_u256(liquidity, tmp)?, current_sqrt_p, grown)?)
        } else {
            Ok(mul_div_ceiling(safe_sub_u256(liquidity, tmp)?, current_sqrt_p, grown)?)
        }
    }
}

/// Amount of the non-specified token exchanged by a step.
///
/// Output (exact input) is rounded towards zero and input (exact output)
/// away from zero. An exact-input result of exactly `1` is a rounding
/// artifact and is dropped.
pub fn calc_returned_amount(
    liquidity: U256,
    current_sqrt_p: U256,
    next_sqrt_p: U256,
    delta_l: U256,
    is_exact_input: bool,
    is_token0: bool,
) -> Result<I256, Error> {
    let returned_amount = if is_token0 {
        let fee_part = to_int256(mul_div_ceiling(delta_l, next_sqrt_p, TWO_POW_96)?)?;
        let price_part = if is_exact_input {
            // deltaL * sqrtPn - L * (sqrtPc - sqrtPn)
            rev_to_int256(mul_div_floor(
                liquidity,
                safe_sub_u256(current_sqrt_p, next_sqrt_p)?,
                TWO_POW_96,
            )?)?
        } else {
            // deltaL * sqrtPn + L * (sqrtPn - sqrtPc)
            to_int256(mul_div_ceiling(
                liquidity,
                safe_sub_u256(next_sqrt_p, current_sqrt_p)?,
                TWO_POW_96,
            )?)?
        };
        safe_add_i256(fee_part, price_part)?
    } else {
        // (L + deltaL) / sqrtPn - L / sqrtPc
        let after = to_int256(mul_div_ceiling(
            safe_add_u256(liquidity, delta_l)?,
            TWO_POW_96,
            next_sqrt_p,
        )?)?;
        let before = rev_to_int256(mul_div_floor(liquidity, TWO_POW_96, current_sqrt_p)?)?;
        safe_add_i256(after, before)?
    };

    if is_exact_input && returned_amount == I256::ONE {
        return Ok(I256::ZERO);
    }
    Ok(returned_amount)
}
