//! Checked arithmetic and width conversions between the protocol's integer
//! types. Operations that revert on-chain return a [`MathError`]; the
//! `truncate_*` helpers mirror explicit narrowing casts and never fail.

use crate::error::MathError;
use alloy_primitives::{I256, U256};

/// `2^160 - 1`, the largest value a `uint160` sqrt price may hold.
pub const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);

#[inline]
pub fn safe_add_u256(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn safe_sub_u256(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

#[inline]
pub fn safe_mul_u256(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn safe_div_u256(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

#[inline]
pub fn safe_add_i256(a: I256, b: I256) -> Result<I256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn safe_sub_i256(a: I256, b: I256) -> Result<I256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Reinterprets `value` as a non-negative `I256`, failing above `I256::MAX`.
#[inline]
pub fn to_int256(value: U256) -> Result<I256, MathError> {
    if value > I256::MAX.into_raw() {
        return Err(MathError::Overflow);
    }
    Ok(I256::from_raw(value))
}

/// Returns `-value` as an `I256`, failing above `I256::MAX`.
#[inline]
pub fn rev_to_int256(value: U256) -> Result<I256, MathError> {
    Ok(-to_int256(value)?)
}

/// Ensures `value` fits in a `uint160`.
#[inline]
pub fn to_uint160(value: U256) -> Result<U256, MathError> {
    if value > U160_MAX {
        return Err(MathError::Overflow);
    }
    Ok(value)
}

/// Keeps the low 128 bits of `value`, like a `uint128(x)` cast.
#[inline]
pub fn truncate_u128(value: U256) -> u128 {
    let limbs = value.as_limbs();
    ((limbs[1] as u128) << 64) | limbs[0] as u128
}
