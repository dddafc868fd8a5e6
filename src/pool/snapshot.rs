use crate::FastMap;
use crate::error::{Error, MathError, StateError};
use crate::math::liquidity_math::apply_liquidity_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_tick_at_sqrt_ratio};
use crate::pool::tick_index::TickIndex;
use crate::FEE_UNITS_U32;
use alloy_primitives::U256;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Liquidity minted into a pool when it is unlocked. It backs the
/// reinvestment token supply and is never withdrawn.
pub const MIN_LIQUIDITY: u128 = 100_000;

/// Per-tick accumulators.
///
/// The `*_outside` values hold the growth on the side of the tick opposite
/// to the current price, relative to the globals at the last crossing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickRecord {
    /// Change in active liquidity when the price crosses this tick upwards.
    pub liquidity_net: i128,
    pub fee_growth_outside: U256,
    pub seconds_per_liquidity_outside: u128,
}

/// Immutable mirror of a pool's state, as the state-sync layer hands it over.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolSnapshot {
    /// Swap fee out of `FEE_UNITS`.
    pub swap_fee_units: u32,
    /// Current sqrt price, Q64.96.
    pub sqrt_price: U256,
    pub current_tick: i32,
    /// Greatest initialized tick `<= current_tick`.
    pub nearest_current_tick: i32,
    pub base_l: u128,
    pub reinvest_l: u128,
    /// `reinvest_l` at the last reinvestment token mint.
    pub reinvest_l_last: u128,
    pub fee_growth_global: U256,
    pub seconds_per_liquidity_global: u128,
    pub seconds_per_liquidity_update_time: u32,
    /// Timestamp of the block the quote is evaluated at.
    pub block_timestamp: u32,
    pub r_token_supply: U256,
    /// Share of minted fees going to the protocol, out of `FEE_UNITS`.
    pub government_fee_units: u32,
    pub ticks: FastMap<i32, TickRecord>,
    pub initialized_ticks: TickIndex,
}

impl PoolSnapshot {
    /// A freshly unlocked pool at `sqrt_price` with no positions.
    ///
    /// Reinvestment liquidity and supply start at [`MIN_LIQUIDITY`], the
    /// same as the pool contract locks in on unlock.
    pub fn new(swap_fee_units: u32, sqrt_price: U256) -> Result<Self, Error> {
        if swap_fee_units >= FEE_UNITS_U32 {
            return Err(StateError::InvalidFeeUnits(swap_fee_units).into());
        }
        let current_tick = get_tick_at_sqrt_ratio(sqrt_price)?;

        Ok(Self {
            swap_fee_units,
            sqrt_price,
            current_tick,
            nearest_current_tick: MIN_TICK,
            base_l: 0,
            reinvest_l: MIN_LIQUIDITY,
            reinvest_l_last: MIN_LIQUIDITY,
            fee_growth_global: U256::ZERO,
            seconds_per_liquidity_global: 0,
            seconds_per_liquidity_update_time: 0,
            block_timestamp: 0,
            r_token_supply: U256::from(MIN_LIQUIDITY),
            government_fee_units: 0,
            ticks: FastMap::default(),
            initialized_ticks: TickIndex::new(),
        })
    }

    /// Adds `liquidity` over `[tick_lower, tick_upper)`.
    ///
    /// New boundary ticks are linked into the index with their outside
    /// accumulators set to the globals when they sit at or below the current
    /// tick, and to zero otherwise.
    pub fn add_position(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(), Error> {
        if tick_lower >= tick_upper || tick_lower <= MIN_TICK || tick_upper >= MAX_TICK {
            return Err(StateError::TickOutOfBounds.into());
        }
        let liquidity_net = i128::try_from(liquidity).map_err(|_| MathError::Overflow)?;

        self.update_tick(tick_lower, liquidity_net)?;
        self.update_tick(tick_upper, -liquidity_net)?;

        if tick_lower <= self.current_tick && self.current_tick < tick_upper {
            self.base_l = apply_liquidity_delta(self.base_l, liquidity, true)?;
        }
        self.nearest_current_tick = self
            .initialized_ticks
            .nearest_at_or_below(self.current_tick)?;
        Ok(())
    }

    fn update_tick(&mut self, tick: i32, liquidity_net: i128) -> Result<(), Error> {
        let below_price = tick <= self.current_tick;
        let (fee_growth_global, seconds_per_liquidity_global) =
            (self.fee_growth_global, self.seconds_per_liquidity_global);

        let record = self.ticks.entry(tick).or_insert_with(|| {
            if below_price {
                TickRecord {
                    liquidity_net: 0,
                    fee_growth_outside: fee_growth_global,
                    seconds_per_liquidity_outside: seconds_per_liquidity_global,
                }
            } else {
                TickRecord::default()
            }
        });
        record.liquidity_net = record
            .liquidity_net
            .checked_add(liquidity_net)
            .ok_or(if liquidity_net > 0 {
                MathError::Overflow
            } else {
                MathError::Underflow
            })?;

        self.initialized_ticks.insert(tick)?;
        Ok(())
    }

    /// Rejects snapshots the simulator cannot run on.
    pub fn validate(&self) -> Result<(), Error> {
        self.check().inspect_err(|err| debug!(%err, "invalid pool snapshot"))
    }

    fn check(&self) -> Result<(), Error> {
        get_tick_at_sqrt_ratio(self.sqrt_price)?;
        if self.swap_fee_units >= FEE_UNITS_U32 {
            return Err(StateError::InvalidFeeUnits(self.swap_fee_units).into());
        }
        if self.government_fee_units > FEE_UNITS_U32 {
            return Err(StateError::InvalidFeeUnits(self.government_fee_units).into());
        }
        self.initialized_ticks.validate()?;
        if !self.initialized_ticks.contains(self.nearest_current_tick) {
            return Err(StateError::TickNotInitialized(self.nearest_current_tick).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;

    fn pool_at(tick: i32) -> PoolSnapshot {
        PoolSnapshot::new(50, get_sqrt_ratio_at_tick(tick).unwrap()).unwrap()
    }

    // ---------------- construction ----------------

    #[test]
    fn new_derives_tick_and_sentinels() {
        let pool = pool_at(100);
        assert_eq!(pool.current_tick, 100);
        assert_eq!(pool.nearest_current_tick, MIN_TICK);
        assert_eq!(pool.initialized_ticks.len(), 2);
        assert_eq!(pool.reinvest_l, MIN_LIQUIDITY);
        assert_eq!(pool.r_token_supply, U256::from(MIN_LIQUIDITY));
        pool.validate().unwrap();
    }

    #[test]
    fn new_rejects_bad_inputs() {
        assert!(matches!(
            PoolSnapshot::new(100_000, get_sqrt_ratio_at_tick(0).unwrap()),
            Err(Error::StateError(StateError::InvalidFeeUnits(100_000)))
        ));
        assert!(matches!(
            PoolSnapshot::new(50, U256::ZERO),
            Err(Error::StateError(StateError::SqrtPriceOutOfBounds))
        ));
    }

    // ---------------- add_position ----------------

    #[test]
    fn active_position_adds_base_liquidity() {
        let mut pool = pool_at(0);
        pool.add_position(-600, 600, 1_000).unwrap();

        assert_eq!(pool.base_l, 1_000);
        assert_eq!(pool.ticks[&-600].liquidity_net, 1_000);
        assert_eq!(pool.ticks[&600].liquidity_net, -1_000);
        assert_eq!(pool.nearest_current_tick, -600);
        pool.validate().unwrap();
    }

    #[test]
    fn inactive_position_only_links_ticks() {
        let mut pool = pool_at(0);
        pool.add_position(60, 120, 1_000).unwrap();

        assert_eq!(pool.base_l, 0);
        assert_eq!(pool.nearest_current_tick, MIN_TICK);
        assert_eq!(pool.initialized_ticks.next(MIN_TICK).unwrap(), 60);
    }

    #[test]
    fn upper_tick_is_exclusive() {
        let mut pool = pool_at(0);
        pool.add_position(-60, 0, 1_000).unwrap();
        assert_eq!(pool.base_l, 0);

        pool.add_position(0, 60, 500).unwrap();
        assert_eq!(pool.base_l, 500);
        assert_eq!(pool.ticks[&0].liquidity_net, -500);
        assert_eq!(pool.nearest_current_tick, 0);
    }

    #[test]
    fn overlapping_positions_accumulate() {
        let mut pool = pool_at(0);
        pool.add_position(-600, 600, 1_000).unwrap();
        pool.add_position(-600, 60, 250).unwrap();

        assert_eq!(pool.base_l, 1_250);
        assert_eq!(pool.ticks[&-600].liquidity_net, 1_250);
        assert_eq!(pool.ticks[&60].liquidity_net, -250);
        assert_eq!(pool.initialized_ticks.iter().count(), 5);
    }

    #[test]
    fn outside_accumulators_start_from_globals_below_price() {
        let mut pool = pool_at(0);
        pool.fee_growth_global = U256::from(777u32);
        pool.seconds_per_liquidity_global = 55;
        pool.add_position(-60, 60, 1_000).unwrap();

        assert_eq!(pool.ticks[&-60].fee_growth_outside, U256::from(777u32));
        assert_eq!(pool.ticks[&-60].seconds_per_liquidity_outside, 55);
        assert_eq!(pool.ticks[&60].fee_growth_outside, U256::ZERO);
        assert_eq!(pool.ticks[&60].seconds_per_liquidity_outside, 0);
    }

    #[test]
    fn add_position_rejects_bad_ranges() {
        let mut pool = pool_at(0);
        assert!(matches!(
            pool.add_position(60, 60, 1),
            Err(Error::StateError(StateError::TickOutOfBounds))
        ));
        assert!(matches!(
            pool.add_position(MIN_TICK, 0, 1),
            Err(Error::StateError(StateError::TickOutOfBounds))
        ));
        assert!(matches!(
            pool.add_position(-60, 60, u128::MAX),
            Err(Error::MathError(MathError::Overflow))
        ));
    }

    // ---------------- validate ----------------

    #[test]
    fn validate_rejects_fee_units() {
        let mut pool = pool_at(0);
        pool.government_fee_units = 100_001;
        assert!(matches!(
            pool.validate(),
            Err(Error::StateError(StateError::InvalidFeeUnits(100_001)))
        ));

        let mut pool = pool_at(0);
        pool.swap_fee_units = 100_000;
        assert!(matches!(
            pool.validate(),
            Err(Error::StateError(StateError::InvalidFeeUnits(100_000)))
        ));
    }

    #[test]
    fn validate_rejects_price_out_of_bounds() {
        let mut pool = pool_at(0);
        pool.sqrt_price = crate::math::tick_math::MAX_SQRT_RATIO;
        assert!(matches!(
            pool.validate(),
            Err(Error::StateError(StateError::SqrtPriceOutOfBounds))
        ));
    }

    #[test]
    fn validate_rejects_unknown_nearest_tick() {
        let mut pool = pool_at(0);
        pool.add_position(-60, 60, 1_000).unwrap();
        pool.nearest_current_tick = -30;
        assert!(matches!(
            pool.validate(),
            Err(Error::StateError(StateError::TickNotInitialized(-30)))
        ));
    }

    #[test]
    fn snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PoolSnapshot>();
    }
}
