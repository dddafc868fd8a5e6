use crate::error::MathError;
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

#[cold]
#[inline(never)]
fn cold_path() {}

/// Branch hint for error paths. Stable replacement for `core::intrinsics::unlikely`.
#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
    }
    b
}

/// Returns `floor(a * b / denominator)` with a full 512‑bit intermediate
/// product, so `a * b` may exceed 256 bits as long as the quotient fits.
///
/// Errors with `DivisionByZero` for a zero denominator and `Overflow`
/// when the quotient does not fit in 256 bits.
pub fn mul_div_floor(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    // 512-bit product split into [prod1 prod0] via the Chinese remainder theorem.
    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);
    let mut prod1 = mm
        .wrapping_sub(prod0)
        .wrapping_sub(U256::from((mm < prod0) as u8));

    if prod1.is_zero() {
        if unlikely(denominator.is_zero()) {
            return Err(MathError::DivisionByZero);
        }
        return Ok(prod0 / denominator);
    }

    if unlikely(denominator <= prod1) {
        return Err(if denominator.is_zero() {
            MathError::DivisionByZero
        } else {
            MathError::Overflow
        });
    }

    // Make the division exact by subtracting the remainder from [prod1 prod0].
    let remainder = a.mul_mod(b, denominator);
    prod1 = prod1.wrapping_sub(U256::from((remainder > prod0) as u8));
    prod0 = prod0.wrapping_sub(remainder);

    // Factor the largest power of two out of the denominator.
    let mut twos = denominator.wrapping_neg() & denominator;
    denominator /= twos;
    prod0 /= twos;

    // Shift bits from prod1 into prod0; twos becomes 2^256 / twos.
    twos = (twos.wrapping_neg() / twos).wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(twos);

    // Newton-Raphson inverse of the (now odd) denominator modulo 2^256,
    // seeded correct to four bits and doubled six times.
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Returns `ceil(a * b / denominator)`; see [`mul_div_floor`].
pub fn mul_div_ceiling(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div_floor(a, b, denominator)?;

    if a.mul_mod(b, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // ------------------------- mul_div_floor tests -------------------------

    #[test]
    fn mul_div_floor_simple_division() {
        let result = mul_div_floor(U256::from(10u8), U256::from(20u8), U256::from(5u8)).unwrap();
        assert_eq!(result, U256::from(40u8));
    }

    #[test]
    fn mul_div_floor_rounds_down() {
        // 7 * 10 / 8 = 8.75
        let result = mul_div_floor(U256::from(7u8), U256::from(10u8), U256::from(8u8)).unwrap();
        assert_eq!(result, U256::from(8u8));
    }

    #[test]
    fn mul_div_floor_division_by_zero() {
        let result = mul_div_floor(U256::from(10u8), U256::from(20u8), U256::ZERO);
        assert!(matches!(result, Err(MathError::DivisionByZero)));

        // wide product takes the 512-bit branch
        let result = mul_div_floor(U256::MAX, U256::MAX, U256::ZERO);
        assert!(matches!(result, Err(MathError::DivisionByZero)));
    }

    #[test]
    fn mul_div_floor_wide_intermediate() {
        // (2^256 - 1)^2 / (2^256 - 1) = 2^256 - 1
        let result = mul_div_floor(U256::MAX, U256::MAX, U256::MAX).unwrap();
        assert_eq!(result, U256::MAX);
    }

    #[test]
    fn mul_div_floor_q96_scaling() {
        // 2^200 * 2^96 / 2^100 = 2^196, product needs 296 bits
        let a = U256::ONE << 200usize;
        let b = U256::ONE << 96usize;
        let d = U256::ONE << 100usize;
        assert_eq!(mul_div_floor(a, b, d).unwrap(), U256::ONE << 196usize);
    }

    #[test]
    fn mul_div_floor_wide_odd_denominator() {
        // 2^255 * 6 / 3 = 2^256, one past the maximum
        let result = mul_div_floor(U256::ONE << 255usize, U256::from(6u8), U256::from(3u8));
        assert!(matches!(result, Err(MathError::Overflow)));

        // 2^255 * 3 / 3 = 2^255
        let result = mul_div_floor(U256::ONE << 255usize, U256::from(3u8), U256::from(3u8)).unwrap();
        assert_eq!(result, U256::ONE << 255usize);
    }

    #[test]
    fn mul_div_floor_known_value() {
        let a = U256::from_str("79228162514264337593543950336000000").unwrap(); // 2^96 * 1e6
        let b = U256::from_str("1461446703485210103287273052203988822378723970342").unwrap();
        let d = U256::from_str("79228162514264337593543950336").unwrap(); // 2^96
        assert_eq!(mul_div_floor(a, b, d).unwrap(), b * U256::from(1_000_000u32));
    }

    #[test]
    fn mul_div_floor_result_overflow() {
        let result = mul_div_floor(U256::MAX, U256::from(2u8), U256::ONE);
        assert!(matches!(result, Err(MathError::Overflow)));
    }

    // ------------------------- mul_div_ceiling tests -------------------------

    #[test]
    fn mul_div_ceiling_exact_division() {
        let result = mul_div_ceiling(U256::from(20u8), U256::from(10u8), U256::from(5u8)).unwrap();
        assert_eq!(result, U256::from(40u8));
    }

    #[test]
    fn mul_div_ceiling_non_exact() {
        // 70 / 3 = 23.33
        let result = mul_div_ceiling(U256::from(7u8), U256::from(10u8), U256::from(3u8)).unwrap();
        assert_eq!(result, U256::from(24u8));
    }

    #[test]
    fn mul_div_ceiling_at_max() {
        // floor is exactly U256::MAX with a zero remainder
        let a = U256::MAX;
        let b = U256::MAX - U256::ONE;
        let d = U256::MAX - U256::ONE;
        assert_eq!(mul_div_floor(a, b, d).unwrap(), U256::MAX);
        assert_eq!(mul_div_ceiling(a, b, d).unwrap(), U256::MAX);

        let result = mul_div_ceiling(U256::MAX, U256::from(3u8), U256::from(2u8));
        assert!(matches!(result, Err(MathError::Overflow)));
    }

    #[test]
    fn mul_div_ceiling_division_by_zero() {
        let result = mul_div_ceiling(U256::from(10u8), U256::from(20u8), U256::ZERO);
        assert!(matches!(result, Err(MathError::DivisionByZero)));
    }
}
