//! Bonus crate pool.
//!
//! A fixed pool of slots tracks the crates the scheduler drops during
//! skirmish and multiplayer games. Each live slot points at the cell whose
//! overlay shows the crate and counts down to its expiry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MapGrid;
use crate::coord::CellIndex;
use crate::data::{LandType, OverlayType, SpeedType};
use crate::error::{MapError, Result};
use crate::random::RandomSource;
use crate::session::Session;
use crate::zone::ZoneKind;

/// Number of crate slots.
pub const MAX_CRATES: usize = 256;

/// Random placements tried before the final attempt.
const PLACEMENT_ATTEMPTS: usize = 1000;

/// One crate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CrateSlot {
    cell: Option<CellIndex>,
    timer: u32,
}

impl CrateSlot {
    /// Cell holding the crate, or `None` for a free slot.
    #[must_use]
    pub const fn cell(&self) -> Option<CellIndex> {
        self.cell
    }

    /// Ticks left before the crate expires.
    #[must_use]
    pub const fn timer(&self) -> u32 {
        self.timer
    }

    /// Whether the slot is free.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.cell.is_none()
    }

    /// Count down one tick. Returns whether the crate has now expired.
    pub(crate) fn tick(&mut self) -> bool {
        if self.cell.is_none() {
            return false;
        }
        self.timer = self.timer.saturating_sub(1);
        self.timer == 0
    }
}

impl MapGrid {
    /// Crate slots in pool order.
    #[must_use]
    pub fn crates(&self) -> &[CrateSlot] {
        &self.crates
    }

    /// Number of live crates.
    #[must_use]
    pub fn crate_count(&self) -> usize {
        self.crates.iter().filter(|slot| !slot.is_free()).count()
    }

    pub(super) fn check_crate_slots(&self) -> Result<()> {
        if self.crates.len() != MAX_CRATES {
            return Err(MapError::Snapshot(format!(
                "{} crate slots, expected {MAX_CRATES}",
                self.crates.len()
            )));
        }
        let area = self.size.area();
        match self.crates.iter().filter_map(CrateSlot::cell).find(|cell| *cell >= area) {
            Some(cell) => Err(MapError::Snapshot(format!("Crate on cell {cell} outside {area} cells"))),
            None => Ok(()),
        }
    }

    fn free_crate_slot(&self) -> Option<usize> {
        self.crates.iter().position(CrateSlot::is_free)
    }

    /// Whether a crate may be dropped on `cell`: playable, bare, empty and
    /// reachable by tracked or floating units.
    #[must_use]
    pub fn is_valid_crate_cell(&self, cell: CellIndex) -> bool {
        if !self.in_radar(cell) {
            return false;
        }
        let target = &self.cells[cell];
        target.overlay().is_none()
            && target.occupancy().is_empty()
            && [SpeedType::Track, SpeedType::Float].into_iter().any(|speed| {
                target.is_clear_to_move(speed, false, false, None, ZoneKind::Normal, &self.terrain)
            })
    }

    /// Put the crate of slot `slot` on `cell`, replacing whatever the slot held.
    fn create_crate_at(&mut self, slot: usize, cell: CellIndex, rng: &mut impl RandomSource) -> bool {
        self.remove_crate_slot(slot);
        if !self.is_valid_crate_cell(cell) {
            return false;
        }
        let min = i32::try_from(self.rules.crate_min_ticks()).unwrap_or(i32::MAX);
        let max = i32::try_from(self.rules.crate_max_ticks()).unwrap_or(i32::MAX);
        let timer = u32::try_from(rng.random_between(min, max)).unwrap_or(0).max(1);
        let overlay = if self.cells[cell].land() == LandType::Water {
            OverlayType::WaterCrate
        } else {
            OverlayType::WoodCrate
        };
        self.set_overlay(cell, Some(overlay), 0);
        self.crates[slot] = CrateSlot {
            cell: Some(cell),
            timer,
        };
        debug!(cell, timer, "Crate placed");
        true
    }

    pub(super) fn remove_crate_slot(&mut self, slot: usize) -> bool {
        let Some(cell) = self.crates[slot].cell else {
            return false;
        };
        if self.cells[cell].overlay().is_some_and(OverlayType::is_crate) {
            self.set_overlay(cell, None, 0);
        }
        self.crates[slot] = CrateSlot::default();
        true
    }

    /// Drop a crate at a random playable location.
    ///
    /// Uses the first free slot and tries up to 1000 random cells, then one
    /// final cell whose outcome is returned. Returns false without touching
    /// any slot when the pool is full.
    pub fn place_random_crate(&mut self, rng: &mut impl RandomSource) -> bool {
        let Some(slot) = self.free_crate_slot() else {
            return false;
        };
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = self.pick_random_location(rng);
            if self.create_crate_at(slot, cell, rng) {
                return true;
            }
        }
        let cell = self.pick_random_location(rng);
        self.create_crate_at(slot, cell, rng)
    }

    /// Drop a crate on a specific cell.
    pub fn place_random_crate_at_cell(&mut self, cell: CellIndex, rng: &mut impl RandomSource) -> bool {
        match self.free_crate_slot() {
            Some(slot) => self.create_crate_at(slot, cell, rng),
            None => false,
        }
    }

    /// Remove the crate on `cell`.
    ///
    /// Outside campaigns the pool is searched first; otherwise, or when no
    /// pooled crate sits there, a crate overlay placed by the scenario is
    /// cleared instead.
    pub fn remove_crate(&mut self, cell: CellIndex, session: &Session) -> bool {
        if !session.is_campaign() {
            if let Some(slot) = self.crates.iter().position(|s| s.cell == Some(cell)) {
                return self.remove_crate_slot(slot);
            }
        }

        if self
            .cell(cell)
            .and_then(|c| c.overlay())
            .is_some_and(OverlayType::is_crate)
        {
            self.set_overlay(cell, None, 0);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapRules;
    use std::sync::Arc;

    use crate::coord::GridSize;
    use crate::data::{TemplateId, TerrainData};
    use crate::random::ScenarioRandom;

    fn small_map() -> MapGrid {
        let mut map = MapGrid::with_size(GridSize::LEGACY);
        map.set_map_dimensions(2, 2, 60, 60);
        map
    }

    #[test]
    fn test_place_random_crate() {
        let mut map = small_map();
        let mut rng = ScenarioRandom::new(5);
        assert!(map.place_random_crate(&mut rng));
        assert_eq!(map.crate_count(), 1);

        let slot = map.crates()[0];
        let cell = slot.cell().unwrap();
        assert!(map.in_radar(cell));
        assert_eq!(map.cell(cell).unwrap().overlay(), Some(OverlayType::WoodCrate));
        assert!(slot.timer() >= map.rules().crate_min_ticks());
        assert!(slot.timer() <= map.rules().crate_max_ticks());
    }

    #[test]
    fn test_snapshot_rejects_crate_outside_grid() {
        let mut map = small_map();
        map.crates[0] = CrateSlot {
            cell: Some(1_000_000),
            timer: 5,
        };
        let bytes = map.serialize().unwrap();
        let err = MapGrid::deserialize(&bytes, Arc::new(TerrainData::classic())).unwrap_err();
        assert!(matches!(err, MapError::Snapshot(message) if message.contains("Crate on cell 1000000")));

        map.crates.truncate(3);
        let bytes = map.serialize().unwrap();
        let err = MapGrid::deserialize(&bytes, Arc::new(TerrainData::classic())).unwrap_err();
        assert!(matches!(err, MapError::Snapshot(message) if message.contains("crate slots")));
    }

    #[test]
    fn test_huge_crate_lifetime_saturates() {
        let mut map = small_map();
        map.set_rules(MapRules {
            crate_minutes: u32::MAX,
            ..MapRules::default()
        });
        let cell = map.size().cell_from_xy(10, 10);
        let mut rng = ScenarioRandom::new(3);
        assert!(map.place_random_crate_at_cell(cell, &mut rng));
        assert_eq!(map.crates()[0].timer(), i32::MAX.unsigned_abs());
    }

    #[test]
    fn test_full_pool_fails_without_changes() {
        let mut map = small_map();
        let mut rng = ScenarioRandom::new(9);
        for _ in 0..MAX_CRATES {
            assert!(map.place_random_crate(&mut rng));
        }
        let before: Vec<_> = map.crates().to_vec();
        let hash = map.state_hash();
        assert!(!map.place_random_crate(&mut rng));
        assert_eq!(map.crates(), before.as_slice());
        assert_eq!(map.state_hash(), hash);
    }

    #[test]
    fn test_no_valid_cell_reports_failure() {
        let mut map = small_map();
        for cell in 0..map.size().area() {
            map.set_template(cell, TemplateId(97), 0);
        }
        let mut rng = ScenarioRandom::new(1);
        assert!(!map.place_random_crate(&mut rng));
        assert_eq!(map.crate_count(), 0);
    }

    #[test]
    fn test_water_crate_on_water() {
        let mut map = small_map();
        let cell = map.size().cell_from_xy(10, 10);
        map.set_template(cell, TemplateId(1), 0);
        let mut rng = ScenarioRandom::new(1);
        assert!(map.place_random_crate_at_cell(cell, &mut rng));
        assert_eq!(map.cell(cell).unwrap().overlay(), Some(OverlayType::WaterCrate));
    }

    #[test]
    fn test_crate_cell_rules() {
        let mut map = small_map();
        let outside = map.size().cell_from_xy(0, 0);
        assert!(!map.is_valid_crate_cell(outside));
        let ore = map.size().cell_from_xy(5, 5);
        map.set_overlay(ore, Some(OverlayType::Gold1), 2);
        assert!(!map.is_valid_crate_cell(ore));
        let rock = map.size().cell_from_xy(6, 5);
        map.set_template(rock, TemplateId(97), 1);
        assert!(!map.is_valid_crate_cell(rock));
        assert!(map.is_valid_crate_cell(map.size().cell_from_xy(7, 5)));
    }

    #[test]
    fn test_remove_crate_from_pool() {
        let mut map = small_map();
        let cell = map.size().cell_from_xy(10, 10);
        let mut rng = ScenarioRandom::new(1);
        assert!(map.place_random_crate_at_cell(cell, &mut rng));
        assert!(map.remove_crate(cell, &Session::skirmish()));
        assert_eq!(map.crate_count(), 0);
        assert_eq!(map.cell(cell).unwrap().overlay(), None);
        assert!(!map.remove_crate(cell, &Session::skirmish()));
    }

    #[test]
    fn test_remove_scenario_crate_overlay_in_campaign() {
        let mut map = small_map();
        let cell = map.size().cell_from_xy(12, 12);
        map.set_overlay(cell, Some(OverlayType::SteelCrate), 0);
        assert!(map.remove_crate(cell, &Session::default()));
        assert_eq!(map.cell(cell).unwrap().overlay(), None);

        let wall = map.size().cell_from_xy(13, 12);
        map.set_overlay(wall, Some(OverlayType::Brick), 0);
        assert!(!map.remove_crate(wall, &Session::default()));
        assert_eq!(map.cell(wall).unwrap().overlay(), Some(OverlayType::Brick));
    }

    #[test]
    fn test_campaign_skips_pool_search() {
        let mut map = small_map();
        let cell = map.size().cell_from_xy(10, 10);
        let mut rng = ScenarioRandom::new(1);
        map.place_random_crate_at_cell(cell, &mut rng);
        // The overlay is cleared but the slot stays claimed.
        assert!(map.remove_crate(cell, &Session::default()));
        assert_eq!(map.crate_count(), 1);
    }
}
