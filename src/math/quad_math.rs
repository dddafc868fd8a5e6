use crate::error::MathError;
use crate::math::safe_math::{safe_div_u256, safe_mul_u256, safe_sub_u256};
use alloy_primitives::U256;

const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Integer square root, rounded down (Babylonian method).
pub fn sqrt(y: U256) -> U256 {
    if y > U256_THREE {
        let mut z = y;
        let mut x = (y >> 1usize) + U256::ONE;
        while x < z {
            z = x;
            x = (y / x + x) >> 1usize;
        }
        z
    } else if !y.is_zero() {
        U256::ONE
    } else {
        U256::ZERO
    }
}

/// Smaller root of `a·x² − 2b·x + c = 0`, i.e. `(b − sqrt(b² − a·c)) / a`.
///
/// Every intermediate is checked: the squared term and the product `a·c`
/// can overflow for very deep pools, which reverts on-chain as well.
pub fn get_smaller_root_of_quad_eqn(a: U256, b: U256, c: U256) -> Result<U256, MathError> {
    let discriminant = safe_sub_u256(safe_mul_u256(b, b)?, safe_mul_u256(a, c)?)?;
    safe_div_u256(safe_sub_u256(b, sqrt(discriminant))?, a)
}
