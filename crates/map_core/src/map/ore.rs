//! Per-tick ore and crate scheduler.
//!
//! Scanning the whole grid for ore every tick is too expensive, so the scan
//! is time-sliced: each tick the cursor visits a fixed budget of cells and
//! feeds eligible ones into two bounded reservoirs (grow, spread). When the
//! cursor wraps, the reservoirs are applied and emptied.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MapGrid;
use crate::coord::{CellIndex, Facing};
use crate::data::{LandType, OverlayType};
use crate::error::{MapError, Result};
use crate::random::RandomSource;
use crate::session::Session;

/// Persistent scan state of the ore scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OreScheduler {
    cursor: CellIndex,
    growth: Vec<CellIndex>,
    growth_excess: u32,
    spread: Vec<CellIndex>,
    spread_excess: u32,
    passes: u64,
}

impl OreScheduler {
    /// Next cell the scan will visit.
    #[must_use]
    pub const fn cursor(&self) -> CellIndex {
        self.cursor
    }

    /// Cells sampled for growth in the current pass.
    #[must_use]
    pub fn growth(&self) -> &[CellIndex] {
        &self.growth
    }

    /// Cells sampled for spreading in the current pass.
    #[must_use]
    pub fn spread(&self) -> &[CellIndex] {
        &self.spread
    }

    /// Completed full-grid passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Reject scan state pointing outside a grid of `area` cells.
    pub(super) fn check_bounds(&self, area: usize) -> Result<()> {
        if self.cursor > area {
            return Err(MapError::Snapshot(format!(
                "Ore cursor {} past {area} cells",
                self.cursor
            )));
        }
        for (name, reservoir) in [("growth", &self.growth), ("spread", &self.spread)] {
            if let Some(cell) = reservoir.iter().find(|cell| **cell >= area) {
                return Err(MapError::Snapshot(format!(
                    "Ore {name} cell {cell} outside {area} cells"
                )));
            }
        }
        Ok(())
    }
}

/// Weighted reservoir step: keep `cell` with falling probability as more
/// candidates are seen, replacing a random entry once the reservoir is full.
fn sample_into(
    reservoir: &mut Vec<CellIndex>,
    excess: &mut u32,
    capacity: usize,
    cell: CellIndex,
    rng: &mut impl RandomSource,
) {
    let count = reservoir.len();
    let seen = i32::try_from(*excess).unwrap_or(i32::MAX);
    let kept = i32::try_from(count).unwrap_or(i32::MAX);
    if capacity > 0 && rng.random_between(0, seen) <= kept {
        if count >= capacity {
            let slot = rng.random_index(count);
            reservoir[slot] = cell;
        } else {
            reservoir.push(cell);
        }
    }
    *excess = excess.saturating_add(1);
}

/// What one scheduler tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapTickEvents {
    /// Crates that expired this tick.
    pub crates_expired: usize,
    /// Replacement crates placed this tick.
    pub crates_placed: usize,
    /// Whether the ore scan wrapped and applied its reservoirs.
    pub ore_pass_completed: bool,
    /// Cells whose ore grew.
    pub ore_grown: usize,
    /// Cells that seeded a neighbour.
    pub ore_spread: usize,
}

impl MapGrid {
    /// Ore scan state.
    #[must_use]
    pub const fn ore_scheduler(&self) -> &OreScheduler {
        &self.ore
    }

    /// Run one logic tick of crate expiry and incremental ore scanning.
    pub fn logic_tick(&mut self, session: &Session, rng: &mut impl RandomSource) -> MapTickEvents {
        let mut events = MapTickEvents::default();

        if !session.is_campaign() && session.goodies_allowed {
            for slot in 0..self.crates.len() {
                if self.crates[slot].tick() {
                    self.remove_crate_slot(slot);
                    events.crates_expired += 1;
                    if self.place_random_crate(rng) {
                        events.crates_placed += 1;
                    }
                }
            }
        }

        if self.rules.ore_enabled() {
            self.scan_ore(rng, &mut events);
        }

        events
    }

    fn scan_ore(&mut self, rng: &mut impl RandomSource, events: &mut MapTickEvents) {
        let area = self.size.area();
        let capacity = self.rules.reservoir_capacity;
        let mut budget = self.rules.ore_scan_budget(area);

        while self.ore.cursor < area && budget > 0 {
            let index = self.ore.cursor;
            if self.in_radar(index) {
                let cell = &self.cells[index];
                let grows = cell.can_ore_grow(&self.rules);
                let spreads = cell.can_ore_spread(&self.rules);
                let ore = &mut self.ore;
                if grows {
                    sample_into(&mut ore.growth, &mut ore.growth_excess, capacity, index, rng);
                }
                if spreads {
                    sample_into(&mut ore.spread, &mut ore.spread_excess, capacity, index, rng);
                }
            }
            self.ore.cursor += 1;
            budget -= 1;
        }

        if self.ore.cursor < area {
            return;
        }

        self.ore.cursor = 0;
        self.ore.passes += 1;
        events.ore_pass_completed = true;

        let growth = std::mem::take(&mut self.ore.growth);
        self.ore.growth_excess = 0;
        for cell in growth {
            if self.cells[cell].grow_ore() {
                events.ore_grown += 1;
            }
        }

        let spread = std::mem::take(&mut self.ore.spread);
        self.ore.spread_excess = 0;
        for cell in spread {
            if self.spread_ore(cell, false, rng) {
                events.ore_spread += 1;
            }
        }

        debug!(
            pass = self.ore.passes,
            grown = events.ore_grown,
            spread = events.ore_spread,
            "Ore pass complete"
        );
    }

    /// Whether fresh ore may appear on `cell`.
    #[must_use]
    pub fn can_ore_germinate(&self, cell: CellIndex) -> bool {
        if !self.in_radar(cell) {
            return false;
        }
        let target = &self.cells[cell];
        target.overlay().is_none()
            && target.occupancy().is_empty()
            && !target.smudge().is_some_and(|s| s.is_bib())
            && target.land() == LandType::Clear
    }

    /// Seed gold on one neighbour of `cell`.
    ///
    /// Neighbours are tried clockwise from a random facing; the first that
    /// can germinate receives fresh gold and the source loses one frame.
    /// Unless `forced`, the source must be dense enough to spread.
    pub fn spread_ore(&mut self, cell: CellIndex, forced: bool, rng: &mut impl RandomSource) -> bool {
        let Some(source) = self.cells.get(cell) else {
            return false;
        };
        if !forced && !source.can_ore_spread(&self.rules) {
            return false;
        }

        let start = rng.random_index(Facing::ALL.len());
        for step in 0..Facing::ALL.len() {
            let facing = Facing::from_index(start + step);
            let Some(target) = self.size.adjacent(cell, facing) else {
                continue;
            };
            if self.can_ore_germinate(target) {
                let variant = u8::try_from(rng.random_between(0, 3)).unwrap_or(0);
                let overlay = OverlayType::from_index(5 + variant).unwrap_or(OverlayType::Gold1);
                self.set_overlay(target, Some(overlay), 0);
                self.cells[cell].reduce_ore();
                return true;
            }
        }
        false
    }

    /// Settle every playable ore cell's density from its ore neighbours and
    /// record the map's total ore value, which is also returned.
    pub fn overpass(&mut self) -> u32 {
        let terrain = Arc::clone(&self.terrain);
        let region = self.region;
        let mut total = 0;

        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                let cell = self.size.cell_from_xy(x, y);
                let neighbours = Facing::ALL
                    .iter()
                    .filter_map(|facing| self.size.adjacent(cell, *facing))
                    .filter(|adjacent| self.cells[*adjacent].ore_kind().is_some())
                    .count();
                let target = &mut self.cells[cell];
                if target.ore_kind().is_some() {
                    total += target.ore_adjust(neighbours, &self.rules);
                }
                target.recalc_attributes(&terrain);
            }
        }

        self.total_value = total;
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapRules;
    use crate::coord::GridSize;
    use crate::data::TerrainData;
    use crate::random::ScenarioRandom;
    use crate::session::GameMode;

    fn legacy_map(rules: MapRules) -> MapGrid {
        let mut map = MapGrid::with_size(GridSize::LEGACY);
        map.set_rules(rules);
        map
    }

    #[test]
    fn test_budget_one_completes_pass_in_area_ticks() {
        let rules = MapRules {
            growth_rate: 5,
            ..MapRules::default()
        };
        let mut map = legacy_map(rules);
        assert_eq!(map.rules().ore_scan_budget(4096), 1);

        let session = Session::default();
        let mut rng = ScenarioRandom::new(3);
        let mut completions = 0;
        for tick in 1..=4096 {
            let events = map.logic_tick(&session, &mut rng);
            if events.ore_pass_completed {
                completions += 1;
                assert_eq!(tick, 4096);
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(map.ore_scheduler().passes(), 1);
        assert_eq!(map.ore_scheduler().cursor(), 0);
    }

    fn restore(map: &MapGrid) -> Result<MapGrid> {
        let bytes = map.serialize()?;
        MapGrid::deserialize(&bytes, Arc::new(TerrainData::classic()))
    }

    #[test]
    fn test_snapshot_rejects_ore_state_outside_grid() {
        let mut map = legacy_map(MapRules::default());
        map.ore.cursor = 4096;
        assert!(restore(&map).is_ok());

        map.ore.cursor = 4097;
        assert!(matches!(restore(&map), Err(MapError::Snapshot(message)) if message.contains("cursor")));

        map.ore.cursor = 0;
        map.ore.growth = vec![12, 4096];
        assert!(matches!(restore(&map), Err(MapError::Snapshot(message)) if message.contains("growth cell 4096")));

        map.ore.growth.clear();
        map.ore.spread = vec![usize::MAX];
        assert!(matches!(restore(&map), Err(MapError::Snapshot(message)) if message.contains("spread")));
    }

    #[test]
    fn test_default_rate_pass_length() {
        let mut map = legacy_map(MapRules::default());
        let session = Session::default();
        let mut rng = ScenarioRandom::new(3);
        for _ in 0..1023 {
            assert!(!map.logic_tick(&session, &mut rng).ore_pass_completed);
        }
        assert!(map.logic_tick(&session, &mut rng).ore_pass_completed);
    }

    #[test]
    fn test_growth_applied_at_pass_end() {
        let mut map = legacy_map(MapRules::default());
        let cell = map.size().cell_from_xy(10, 10);
        map.set_overlay(cell, Some(OverlayType::Gold1), 3);

        let session = Session::default();
        let mut rng = ScenarioRandom::new(8);
        let mut grown = 0;
        for _ in 0..1024 {
            grown += map.logic_tick(&session, &mut rng).ore_grown;
        }
        assert_eq!(grown, 1);
        assert_eq!(map.cell(cell).unwrap().overlay_frame(), 4);
        assert!(map.ore_scheduler().growth().is_empty());
    }

    #[test]
    fn test_reservoir_capacity_respected() {
        let rules = MapRules {
            reservoir_capacity: 4,
            ore_spreads: false,
            ..MapRules::default()
        };
        let mut map = legacy_map(rules);
        for x in 0..40 {
            let cell = map.size().cell_from_xy(x, 0);
            map.set_overlay(cell, Some(OverlayType::Gold1), 0);
        }
        let session = Session::default();
        let mut rng = ScenarioRandom::new(2);
        for _ in 0..20 {
            map.logic_tick(&session, &mut rng);
        }
        assert_eq!(map.ore_scheduler().cursor(), 80);
        assert_eq!(map.ore_scheduler().growth().len(), 4);
    }

    #[test]
    fn test_ore_disabled_leaves_cursor() {
        let rules = MapRules {
            ore_grows: false,
            ore_spreads: false,
            ..MapRules::default()
        };
        let mut map = legacy_map(rules);
        let mut rng = ScenarioRandom::new(2);
        map.logic_tick(&Session::default(), &mut rng);
        assert_eq!(map.ore_scheduler().cursor(), 0);
    }

    #[test]
    fn test_expired_crate_is_replaced() {
        let rules = MapRules {
            crate_minutes: 0,
            ore_grows: false,
            ore_spreads: false,
            ..MapRules::default()
        };
        let mut map = legacy_map(rules);
        let mut rng = ScenarioRandom::new(4);
        let first = map.size().cell_from_xy(10, 10);
        assert!(map.place_random_crate_at_cell(first, &mut rng));
        assert_eq!(map.crates()[0].timer(), 1);

        let session = Session::skirmish();
        let events = map.logic_tick(&session, &mut rng);
        assert_eq!(events.crates_expired, 1);
        assert_eq!(events.crates_placed, 1);
        assert_eq!(map.crate_count(), 1);
    }

    #[test]
    fn test_crates_frozen_in_campaign_or_without_goodies() {
        let mut map = legacy_map(MapRules {
            crate_minutes: 0,
            ..MapRules::default()
        });
        let mut rng = ScenarioRandom::new(4);
        let cell = map.size().cell_from_xy(10, 10);
        map.place_random_crate_at_cell(cell, &mut rng);

        let no_goodies = Session {
            mode: GameMode::Multiplayer,
            goodies_allowed: false,
            map_editor: false,
        };
        assert_eq!(map.logic_tick(&no_goodies, &mut rng).crates_expired, 0);
        assert_eq!(map.logic_tick(&Session::default(), &mut rng).crates_expired, 0);
        assert_eq!(map.crates()[0].cell(), Some(cell));
    }

    #[test]
    fn test_spread_ore_seeds_neighbour() {
        let mut map = legacy_map(MapRules::default());
        let cell = map.size().cell_from_xy(20, 20);
        map.set_overlay(cell, Some(OverlayType::Gold1), 9);
        let mut rng = ScenarioRandom::new(6);
        assert!(map.spread_ore(cell, false, &mut rng));
        assert_eq!(map.cell(cell).unwrap().overlay_frame(), 8);

        let seeded = Facing::ALL
            .iter()
            .filter_map(|f| map.size().adjacent(cell, *f))
            .filter(|c| map.cell(*c).unwrap().ore_kind().is_some())
            .count();
        assert_eq!(seeded, 1);
    }

    #[test]
    fn test_spread_requires_density_unless_forced() {
        let mut map = legacy_map(MapRules::default());
        let cell = map.size().cell_from_xy(20, 20);
        map.set_overlay(cell, Some(OverlayType::Gold1), 2);
        let mut rng = ScenarioRandom::new(6);
        assert!(!map.spread_ore(cell, false, &mut rng));
        assert!(map.spread_ore(cell, true, &mut rng));
    }

    #[test]
    fn test_overpass_totals_value() {
        let mut map = legacy_map(MapRules::default());
        let a = map.size().cell_from_xy(5, 5);
        let b = map.size().cell_from_xy(6, 5);
        let gem = map.size().cell_from_xy(30, 30);
        map.set_overlay(a, Some(OverlayType::Gold1), 0);
        map.set_overlay(b, Some(OverlayType::Gold2), 0);
        map.set_overlay(gem, Some(OverlayType::Gems1), 0);

        let total = map.overpass();
        // Each gold cell has one ore neighbour: frame 1, worth 2 * 25.
        assert_eq!(total, 50 + 50 + 150);
        assert_eq!(map.total_value(), total);
        assert_eq!(map.cell(a).unwrap().overlay_frame(), 1);
    }
}
