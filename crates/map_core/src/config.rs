//! Map rules loaded from data files.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Tunable rules for sight, ore and crates.
///
/// # Example RON
///
/// ```ron
/// MapRules(
///     gap_radius: 10,
///     ore_grows: true,
///     ore_spreads: true,
///     growth_rate: 1,
///     ticks_per_minute: 900,
///     crate_minutes: 10,
///     gold_value: 25,
///     gem_value: 50,
///     reservoir_capacity: 50,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapRules {
    /// Largest radius for shroud and jam effects.
    pub gap_radius: u8,
    /// Whether gold ore grows denser over time.
    pub ore_grows: bool,
    /// Whether dense gold ore spreads to neighbouring cells.
    pub ore_spreads: bool,
    /// Full ore scan passes per minute of game time.
    pub growth_rate: u32,
    /// Logic ticks per minute of game time.
    pub ticks_per_minute: u32,
    /// Average crate lifetime in minutes.
    pub crate_minutes: u32,
    /// Credits per gold frame.
    pub gold_value: u32,
    /// Credits per gem frame, before the gem multiplier.
    pub gem_value: u32,
    /// Capacity of each ore sampling reservoir.
    pub reservoir_capacity: usize,
}

impl Default for MapRules {
    fn default() -> Self {
        Self {
            gap_radius: 10,
            ore_grows: true,
            ore_spreads: true,
            growth_rate: 1,
            ticks_per_minute: 900,
            crate_minutes: 10,
            gold_value: 25,
            gem_value: 50,
            reservoir_capacity: 50,
        }
    }
}

impl MapRules {
    /// Parse rules from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str, source_name: &str) -> Result<Self> {
        let rules: Self = ron::from_str(text).map_err(|e| MapError::InvalidData {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        rules.check(source_name)?;
        Ok(rules)
    }

    fn check(&self, source_name: &str) -> Result<()> {
        let message = if self.ticks_per_minute == 0 {
            "ticks_per_minute must be positive"
        } else if self.reservoir_capacity == 0 {
            "reservoir_capacity must be positive"
        } else {
            return Ok(());
        };
        Err(MapError::InvalidData {
            source_name: source_name.to_string(),
            message: message.to_string(),
        })
    }

    /// Whether any ore scanning is needed.
    #[must_use]
    pub const fn ore_enabled(&self) -> bool {
        self.ore_grows || self.ore_spreads
    }

    /// Cells the ore scanner visits per tick: `area / (rate * ticks)`, never zero.
    #[must_use]
    pub fn ore_scan_budget(&self, area: usize) -> usize {
        let ticks_per_pass = (self.growth_rate as usize)
            .saturating_mul(self.ticks_per_minute as usize)
            .max(1);
        (area / ticks_per_pass).max(1)
    }

    /// Shortest crate lifetime in ticks.
    #[must_use]
    pub fn crate_min_ticks(&self) -> u32 {
        self.crate_minutes.saturating_mul(self.ticks_per_minute) / 2
    }

    /// Longest crate lifetime in ticks.
    #[must_use]
    pub fn crate_max_ticks(&self) -> u32 {
        self.crate_minutes
            .saturating_mul(2)
            .saturating_mul(self.ticks_per_minute)
    }
}
