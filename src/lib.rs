//! Off-chain swap math for concentrated-liquidity pools that reinvest their
//! swap fees (KyberSwap Elastic style).
//!
//! This crate exposes:
//! - Low‑level math primitives (`math::*`) for ticks, prices, swap steps and
//!   reinvestment minting, all in fixed-width integer arithmetic.
//! - An immutable [`PoolSnapshot`] with a sparse linked index of initialized
//!   ticks.
//! - A batch quoting engine ([`PoolSnapshot::query_outputs`]) that prices an
//!   ascending list of trade sizes in one pass, and a single-swap entry point
//!   ([`PoolSnapshot::swap`]).
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use elastic_swap_math::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert_eq!(sqrt_price, U256::ONE << 96);
//! assert_eq!(RESOLUTION, 96);
//! ```
//!
//! ## Quoting a batch of trade sizes
//! ```
//! use elastic_swap_math::{
//!     math::tick_math::get_sqrt_ratio_at_tick, PoolSnapshot, SwapSide, U256,
//! };
//!
//! // 0.05% fee, price 1.0, one position over [-600, 600)
//! let mut pool = PoolSnapshot::new(50, get_sqrt_ratio_at_tick(0).unwrap()).unwrap();
//! pool.add_position(-600, 600, 1_000_000_000).unwrap();
//!
//! let amounts = [U256::ZERO, U256::from(1_000u32), U256::from(10_000u32)];
//! let quote = pool.query_outputs(&amounts, true, SwapSide::Sell).unwrap();
//! assert_eq!(quote.outputs[0], U256::ZERO);
//! assert!(quote.outputs[2] > quote.outputs[1]);
//! ```

pub use alloy_primitives::{I256, U256};

pub mod error;
mod hash;
pub mod math;

pub use hash::{FastMap, fast_map_with_capacity};

pub mod pool;

pub use pool::quote::{QueryOutputs, SwapSide};
pub use pool::simulator::SwapPhase;
pub use pool::snapshot::{PoolSnapshot, TickRecord};
pub use pool::swap::{SwapParams, SwapResult, sqrt_price_limit_from_bps};
pub use pool::tick_index::{LinkedTick, TickIndex};

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
/// Alias of [`Q96`] under the name the pool contracts use.
pub const TWO_POW_96: U256 = Q96;

/// Denominator of `swap_fee_units` and `government_fee_units`.
pub const FEE_UNITS: U256 = U256::from_limbs([100_000, 0, 0, 0]);
pub const TWO_FEE_UNITS: U256 = U256::from_limbs([200_000, 0, 0, 0]);
/// `FEE_UNITS` as a plain integer, for validating `u32` fee fields.
pub const FEE_UNITS_U32: u32 = 100_000;

/// Largest price move, in ticks, a single swap step may cover.
pub const MAX_TICK_DISTANCE: i32 = 480;
