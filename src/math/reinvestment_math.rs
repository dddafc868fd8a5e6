use crate::error::MathError;
use crate::math::full_math::mul_div_floor;
use crate::math::safe_math::{safe_add_u256, safe_sub_u256};
use alloy_primitives::U256;

/// Reinvestment tokens to mint for the fees collected since the last mint.
///
/// The growth `reinvest_l - reinvest_l_last` is shared between base and
/// reinvestment liquidity; only the base share is minted, pro rata to the
/// current supply:
///
/// ```text
/// lp_contribution = base_l * (reinvest_l - reinvest_l_last) / (base_l + reinvest_l)
/// minted          = r_total_supply * lp_contribution / reinvest_l_last
/// ```
pub fn calc_r_mint_qty(
    reinvest_l: U256,
    reinvest_l_last: U256,
    base_l: U256,
    r_total_supply: U256,
) -> Result<U256, MathError> {
    let lp_contribution = mul_div_floor(
        base_l,
        safe_sub_u256(reinvest_l, reinvest_l_last)?,
        safe_add_u256(base_l, reinvest_l)?,
    )?;
    mul_div_floor(r_total_supply, lp_contribution, reinvest_l_last)
}
