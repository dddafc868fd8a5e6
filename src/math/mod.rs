pub mod full_math;
pub mod liquidity_math;
pub mod quad_math;
pub mod reinvestment_math;
pub mod safe_math;
pub mod swap_math;
pub mod tick_math;
