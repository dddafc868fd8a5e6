use crate::error::MathError;

/// Adds or removes `delta` from `liquidity`.
///
/// Callers pass the magnitude of a signed `liquidity_net` together with its
/// sign, so the subtraction can never be asked to remove `i128::MIN`.
pub fn apply_liquidity_delta(liquidity: u128, delta: u128, is_add: bool) -> Result<u128, MathError> {
    if is_add {
        liquidity.checked_add(delta).ok_or(MathError::Overflow)
    } else {
        liquidity.checked_sub(delta).ok_or(MathError::Underflow)
    }
}
