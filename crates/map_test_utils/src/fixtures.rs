//! Test fixtures and helpers.
//!
//! Pre-built grids, a scripted random source and a runnable scenario
//! wrapper for consistent testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use map_core::prelude::*;

/// A square grid with a one-cell border outside the playable region.
#[must_use]
pub fn open_grid(size: u16) -> MapGrid {
    let size = GridSize::new(size, size).unwrap_or(GridSize::LEGACY);
    let mut map = MapGrid::with_size(size);
    map.set_map_dimensions(1, 1, size.width() - 2, size.height() - 2);
    map
}

/// A 16x16 grid split by a brick wall in column 8.
#[must_use]
pub fn walled_grid() -> MapGrid {
    let mut map = open_grid(16);
    for y in 0..16 {
        let cell = map.size().cell_from_xy(8, y);
        map.set_overlay(cell, Some(OverlayType::Brick), 0);
    }
    map
}

/// A 16x16 grid with a 4x4 lake whose top-left corner is (6, 6).
#[must_use]
pub fn lake_grid() -> MapGrid {
    let mut map = open_grid(16);
    for y in 6..10 {
        for x in 6..10 {
            let cell = map.size().cell_from_xy(x, y);
            map.set_template(cell, TemplateId(1), 0);
        }
    }
    map
}

/// Scatter gold across the playable region at every `stride`-th cell.
pub fn seed_gold(map: &mut MapGrid, stride: usize, frame: u8) {
    let cells: Vec<CellIndex> = (0..map.size().area())
        .filter(|cell| map.in_radar(*cell))
        .step_by(stride.max(1))
        .collect();
    for cell in cells {
        map.set_overlay(cell, Some(OverlayType::Gold1), frame);
    }
}

/// A 2x2 building owned by `owner` with its origin at `(x, y)`.
#[must_use]
pub fn sample_building(map: &MapGrid, owner: HouseId, x: u16, y: u16) -> MapObject {
    let origin = map.size().cell_from_xy(x, y);
    MapObject::building(owner, map.size().cell_to_coord(origin), 2, 2)
}

/// Random source that replays a fixed script, cycling when exhausted.
///
/// Each scripted value is clamped into the requested range.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<i32>,
    next: usize,
}

impl SequenceRandom {
    /// Replay `values` in order.
    #[must_use]
    pub fn new(values: Vec<i32>) -> Self {
        Self { values, next: 0 }
    }

    /// Always return the low end of the range.
    #[must_use]
    pub fn lowest() -> Self {
        Self::new(vec![i32::MIN])
    }

    /// Draws made so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.next
    }
}

impl RandomSource for SequenceRandom {
    fn random_between(&mut self, min: i32, max: i32) -> i32 {
        if max <= min || self.values.is_empty() {
            self.next += 1;
            return min;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(min, max)
    }
}

/// A grid driven tick by tick with its own session and seeded random source.
#[derive(Debug, Clone)]
pub struct MapScenario {
    /// The grid under test.
    pub map: MapGrid,
    /// Session the scheduler runs under.
    pub session: Session,
    /// Random source for every draw.
    pub rng: ScenarioRandom,
    /// Ticks run so far.
    pub ticks: u64,
}

impl MapScenario {
    /// Wrap a grid.
    #[must_use]
    pub fn new(map: MapGrid, session: Session, seed: u64) -> Self {
        Self {
            map,
            session,
            rng: ScenarioRandom::new(seed),
            ticks: 0,
        }
    }

    /// Run one scheduler tick.
    pub fn tick(&mut self) -> MapTickEvents {
        self.ticks += 1;
        self.map.logic_tick(&self.session, &mut self.rng)
    }

    /// Hash of the grid and the random source.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.map.state_hash().hash(&mut hasher);
        self.rng.hash(&mut hasher);
        hasher.finish()
    }
}

/// A 64x64 skirmish scenario with scattered gold and crates enabled.
#[must_use]
pub fn skirmish_scenario(seed: u64) -> MapScenario {
    let mut map = MapGrid::with_size(GridSize::LEGACY);
    map.set_rules(MapRules {
        crate_minutes: 1,
        ..MapRules::default()
    });
    seed_gold(&mut map, 7, 8);
    let mut scenario = MapScenario::new(map, Session::skirmish(), seed);
    for _ in 0..4 {
        scenario.map.place_random_crate(&mut scenario.rng);
    }
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_random_clamps_and_cycles() {
        let mut rng = SequenceRandom::new(vec![5, 100]);
        assert_eq!(rng.random_between(0, 10), 5);
        assert_eq!(rng.random_between(0, 10), 10);
        assert_eq!(rng.random_between(0, 10), 5);
        assert_eq!(rng.random_between(3, 3), 3);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_fixture_regions() {
        let map = open_grid(16);
        assert_eq!(map.region(), MapRegion::new(1, 1, 14, 14));
        let lake = lake_grid();
        let cell = lake.size().cell_from_xy(7, 7);
        assert_eq!(lake.cell(cell).unwrap().land(), LandType::Water);
    }

    #[test]
    fn test_skirmish_scenario_has_crates() {
        let scenario = skirmish_scenario(1);
        assert_eq!(scenario.map.crate_count(), 4);
    }
}
