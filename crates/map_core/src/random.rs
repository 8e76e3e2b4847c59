//! Deterministic random number sources.
//!
//! Every random decision the map makes (crate placement, ore sampling,
//! spread direction) draws from a [`RandomSource`] supplied by the caller,
//! so replays and lockstep peers stay in sync as long as they share a seed.

use serde::{Deserialize, Serialize};

/// Source of deterministic random integers.
pub trait RandomSource {
    /// Random value in `[min, max]`, inclusive on both ends.
    ///
    /// Returns `min` when `max <= min`.
    fn random_between(&mut self, min: i32, max: i32) -> i32;

    /// Random index into a collection of `len` items; 0 when `len <= 1`.
    fn random_index(&mut self, len: usize) -> usize {
        let max = i32::try_from(len.saturating_sub(1)).unwrap_or(i32::MAX);
        usize::try_from(self.random_between(0, max)).unwrap_or(0)
    }
}

/// Seeded linear congruential generator for scenario logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioRandom {
    state: u64,
}

impl ScenarioRandom {
    /// Create a generator from a game seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next_raw(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // Low bits of an LCG cycle quickly.
        self.state >> 16
    }
}

impl RandomSource for ScenarioRandom {
    fn random_between(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max.abs_diff(min)) + 1;
        let offset = u32::try_from(self.next_raw() % span).unwrap_or(0);
        min.wrapping_add_unsigned(offset)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn random_between(&mut self, min: i32, max: i32) -> i32 {
        (**self).random_between(min, max)
    }
}
