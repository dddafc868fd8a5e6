//! Sparse doubly-linked list over the initialized ticks of a pool.
//!
//! The list always holds the `MIN_TICK` and `MAX_TICK` sentinels, linked to
//! themselves at the ends, so every initialized tick has a neighbour on both
//! sides and traversal never scans empty ticks.

use crate::FastMap;
use crate::error::StateError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkedTick {
    pub previous: i32,
    pub next: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TickIndex {
    links: FastMap<i32, LinkedTick>,
}

impl Default for TickIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TickIndex {
    /// An index holding only the two sentinels.
    pub fn new() -> Self {
        let mut links = FastMap::default();
        links.insert(
            MIN_TICK,
            LinkedTick {
                previous: MIN_TICK,
                next: MAX_TICK,
            },
        );
        links.insert(
            MAX_TICK,
            LinkedTick {
                previous: MIN_TICK,
                next: MAX_TICK,
            },
        );
        Self { links }
    }

    /// Builds an index from unordered initialized ticks. Sentinels are added
    /// automatically and duplicates are ignored.
    pub fn from_ticks<I>(ticks: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut sorted: Vec<i32> = ticks.into_iter().collect();
        if sorted.iter().any(|tick| !(MIN_TICK..=MAX_TICK).contains(tick)) {
            return Err(StateError::TickOutOfBounds);
        }
        sorted.extend([MIN_TICK, MAX_TICK]);
        sorted.sort_unstable();
        sorted.dedup();

        let mut links = crate::fast_map_with_capacity(sorted.len());
        for (i, &tick) in sorted.iter().enumerate() {
            let previous = if i == 0 { tick } else { sorted[i - 1] };
            let next = sorted.get(i + 1).copied().unwrap_or(tick);
            links.insert(tick, LinkedTick { previous, next });
        }
        Ok(Self { links })
    }

    #[inline]
    pub fn get(&self, tick: i32) -> Option<&LinkedTick> {
        self.links.get(&tick)
    }

    #[inline]
    pub fn contains(&self, tick: i32) -> bool {
        self.links.contains_key(&tick)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn next(&self, tick: i32) -> Result<i32, StateError> {
        self.get(tick)
            .map(|link| link.next)
            .ok_or(StateError::TickNotInitialized(tick))
    }

    pub fn previous(&self, tick: i32) -> Result<i32, StateError> {
        self.get(tick)
            .map(|link| link.previous)
            .ok_or(StateError::TickNotInitialized(tick))
    }

    /// Neighbour of `tick` in the direction of travel.
    ///
    /// Fails with `TickIndexExhausted` when the pointer does not move
    /// strictly that way, which only happens at the sentinels or in a
    /// corrupted index.
    pub fn advance(&self, tick: i32, rising: bool) -> Result<i32, StateError> {
        let link = self.get(tick).ok_or(StateError::TickNotInitialized(tick))?;
        let neighbour = if rising { link.next } else { link.previous };
        let moved = if rising {
            neighbour > tick
        } else {
            neighbour < tick
        };
        if !moved {
            return Err(StateError::TickIndexExhausted { tick, rising });
        }
        Ok(neighbour)
    }

    /// Greatest initialized tick `<= tick`.
    pub fn nearest_at_or_below(&self, tick: i32) -> Result<i32, StateError> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(StateError::TickOutOfBounds);
        }
        self.links
            .keys()
            .copied()
            .filter(|&t| t <= tick)
            .max()
            .ok_or(StateError::TickNotInitialized(MIN_TICK))
    }

    /// Links `tick` between its neighbours. Returns `false` if it was
    /// already present.
    pub fn insert(&mut self, tick: i32) -> Result<bool, StateError> {
        if tick <= MIN_TICK || tick >= MAX_TICK {
            return Err(StateError::TickOutOfBounds);
        }
        if self.contains(tick) {
            return Ok(false);
        }

        let previous = self.nearest_at_or_below(tick)?;
        let next = self.next(previous)?;
        self.links.insert(tick, LinkedTick { previous, next });
        if let Some(link) = self.links.get_mut(&previous) {
            link.next = tick;
        }
        if let Some(link) = self.links.get_mut(&next) {
            link.previous = tick;
        }
        Ok(true)
    }

    /// Ticks in ascending order, sentinels included.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        let mut cursor = Some(MIN_TICK).filter(|tick| self.contains(*tick));
        std::iter::from_fn(move || {
            let tick = cursor?;
            cursor = self.get(tick).map(|link| link.next).filter(|&next| next > tick);
            Some(tick)
        })
    }

    /// Checks that the list is sorted ascending, symmetrically linked, and
    /// reaches every entry from `MIN_TICK` to `MAX_TICK`.
    pub fn validate(&self) -> Result<(), StateError> {
        let head = self
            .get(MIN_TICK)
            .ok_or(StateError::TickNotInitialized(MIN_TICK))?;
        let tail = self
            .get(MAX_TICK)
            .ok_or(StateError::TickNotInitialized(MAX_TICK))?;
        if head.previous != MIN_TICK {
            return Err(StateError::BrokenTickLink { tick: MIN_TICK });
        }
        if tail.next != MAX_TICK {
            return Err(StateError::BrokenTickLink { tick: MAX_TICK });
        }

        let mut tick = MIN_TICK;
        let mut visited = 1usize;
        while tick != MAX_TICK {
            let next = self.next(tick)?;
            if next <= tick {
                return Err(StateError::UnsortedTickIndex { tick });
            }
            if self.previous(next)? != tick {
                return Err(StateError::BrokenTickLink { tick: next });
            }
            tick = next;
            visited += 1;
        }

        if visited != self.links.len() {
            // some entry is not reachable from the head
            let orphan = self
                .links
                .iter()
                .find(|(t, link)| {
                    **t != MIN_TICK && self.get(link.previous).map(|p| p.next) != Some(**t)
                })
                .map(|(t, _)| *t)
                .unwrap_or(MAX_TICK);
            return Err(StateError::BrokenTickLink { tick: orphan });
        }
        Ok(())
    }
}
