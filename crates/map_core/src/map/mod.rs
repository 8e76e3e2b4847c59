//! The map grid.
//!
//! [`MapGrid`] owns every cell of the full grid plus the playable region,
//! the crate pool and the ore scheduler. The grid is allocated once and
//! reset between scenarios with [`MapGrid::init_clear`].
//!
//! Operations are split by concern:
//! - [`sight`] - reveal, shroud and radar jamming over radius disks
//! - [`occupy`] - multi-cell object placement and removal
//! - [`crates`] - bonus crate lifecycle
//! - [`ore`] - per-tick ore and crate scheduler
//! - [`search`] - nearby location, closest object, bridge counting
//! - [`validate`] - consistency checking
//! - [`binary`] - legacy and current binary layouts

pub mod binary;
pub mod crates;
pub mod occupy;
pub mod ore;
pub mod search;
pub mod sight;
pub mod validate;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cell::Cell;
use crate::config::MapRules;
use crate::coord::{CellIndex, GridSize, MapRegion};
use crate::data::{OverlayType, SmudgeType, TemplateId, TerrainData};
use crate::error::{MapError, Result};
use crate::random::RandomSource;

pub use binary::BinaryLayout;
pub use crates::{CrateSlot, MAX_CRATES};
pub use ore::{MapTickEvents, OreScheduler};
pub use sight::LookConstraint;

/// The cell grid and everything that lives at grid scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapGrid {
    pub(crate) size: GridSize,
    pub(crate) region: MapRegion,
    pub(crate) cells: Vec<Cell>,
    pub(crate) crates: Vec<CrateSlot>,
    pub(crate) ore: OreScheduler,
    pub(crate) total_value: u32,
    pub(crate) look_constraint: Option<LookConstraint>,
    pub(crate) rules: MapRules,
    #[serde(skip)]
    pub(crate) terrain: Arc<TerrainData>,
}

impl MapGrid {
    /// Create a grid of `size` with blank cells and the whole grid playable.
    #[must_use]
    pub fn new(size: GridSize, rules: MapRules, terrain: Arc<TerrainData>) -> Self {
        let mut map = Self {
            size,
            region: MapRegion::full(size),
            cells: vec![Cell::default(); size.area()],
            crates: vec![CrateSlot::default(); MAX_CRATES],
            ore: OreScheduler::default(),
            total_value: 0,
            look_constraint: None,
            rules,
            terrain,
        };
        map.recalc_all();
        map
    }

    /// Create a grid from raw dimensions.
    pub fn with_dimensions(
        width: u16,
        height: u16,
        rules: MapRules,
        terrain: Arc<TerrainData>,
    ) -> Result<Self> {
        let size =
            GridSize::new(width, height).ok_or(MapError::InvalidDimensions { width, height })?;
        Ok(Self::new(size, rules, terrain))
    }

    /// A grid of `size` with default rules and the classic terrain tables.
    #[must_use]
    pub fn with_size(size: GridSize) -> Self {
        Self::new(size, MapRules::default(), Arc::new(TerrainData::classic()))
    }

    /// The standard 128x128 grid with default rules and classic terrain.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_size(GridSize::STANDARD)
    }

    /// Reset every cell, crate and scheduler accumulator for a new scenario.
    ///
    /// The cell storage is reused and the playable region is kept.
    pub fn init_clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
            cell.recalc_attributes(&self.terrain);
        }
        for slot in &mut self.crates {
            *slot = CrateSlot::default();
        }
        self.ore = OreScheduler::default();
        self.total_value = 0;
        self.look_constraint = None;
    }

    fn recalc_all(&mut self) {
        let terrain = Arc::clone(&self.terrain);
        for cell in &mut self.cells {
            cell.recalc_attributes(&terrain);
        }
    }

    /// Full grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Playable region.
    #[must_use]
    pub const fn region(&self) -> MapRegion {
        self.region
    }

    /// Active rules.
    #[must_use]
    pub const fn rules(&self) -> &MapRules {
        &self.rules
    }

    /// Replace the active rules.
    pub fn set_rules(&mut self, rules: MapRules) {
        self.rules = rules;
    }

    /// Terrain tables used for derived attributes.
    #[must_use]
    pub fn terrain(&self) -> &TerrainData {
        &self.terrain
    }

    /// Swap the terrain tables and refresh every cell's derived attributes.
    pub fn set_terrain(&mut self, terrain: Arc<TerrainData>) {
        self.terrain = terrain;
        self.recalc_all();
    }

    /// Cell at an index, or `None` off the grid.
    #[must_use]
    pub fn cell(&self, cell: CellIndex) -> Option<&Cell> {
        self.cells.get(cell)
    }

    /// Mutable cell at an index.
    pub fn cell_mut(&mut self, cell: CellIndex) -> Option<&mut Cell> {
        self.cells.get_mut(cell)
    }

    /// All cells in index order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Ore value recorded by the last [`MapGrid::overpass`].
    #[must_use]
    pub const fn total_value(&self) -> u32 {
        self.total_value
    }

    /// Set the playable region.
    ///
    /// A region reaching past the grid is clipped to it.
    pub fn set_map_dimensions(&mut self, x: u16, y: u16, width: u16, height: u16) {
        let grid_w = self.size.width();
        let grid_h = self.size.height();
        let x = x.min(grid_w);
        let y = y.min(grid_h);
        let clipped = MapRegion::new(x, y, width.min(grid_w - x), height.min(grid_h - y));
        if clipped != MapRegion::new(x, y, width, height) {
            warn!(x, y, width, height, "Playable region clipped to grid");
        }
        self.region = clipped;
        debug!(?clipped, "Map dimensions set");
    }

    /// Set a cell's terrain template and icon.
    pub fn set_template(&mut self, cell: CellIndex, template: TemplateId, icon: u8) {
        let terrain = Arc::clone(&self.terrain);
        if let Some(target) = self.cells.get_mut(cell) {
            target.template = template;
            target.icon = icon;
            target.recalc_attributes(&terrain);
            target.mark_redraw();
        }
    }

    /// Set or clear a cell's overlay.
    pub fn set_overlay(&mut self, cell: CellIndex, overlay: Option<OverlayType>, frame: u8) {
        let terrain = Arc::clone(&self.terrain);
        if let Some(target) = self.cells.get_mut(cell) {
            target.overlay = overlay;
            target.overlay_frame = if overlay.is_some() { frame } else { 0 };
            target.recalc_attributes(&terrain);
            target.mark_redraw();
        }
    }

    /// Set or clear a cell's smudge.
    pub fn set_smudge(&mut self, cell: CellIndex, smudge: Option<SmudgeType>) {
        if let Some(target) = self.cells.get_mut(cell) {
            target.smudge = smudge;
            target.mark_redraw();
        }
    }

    /// Whether a cell lies inside the playable region.
    #[must_use]
    pub fn in_radar(&self, cell: CellIndex) -> bool {
        if !self.size.contains(cell) {
            return false;
        }
        let (x, y) = self.size.cell_xy(cell);
        self.region.contains_xy(i32::from(x), i32::from(y))
    }

    /// Nearest cell inside the playable region.
    #[must_use]
    pub fn clamp_to_radar(&self, cell: CellIndex) -> CellIndex {
        let (x, y) = if self.size.contains(cell) {
            self.size.cell_xy(cell)
        } else {
            (self.size.width() - 1, self.size.height() - 1)
        };
        let region = self.region;
        let max_x = region.x + region.width.saturating_sub(1);
        let max_y = region.y + region.height.saturating_sub(1);
        self.size
            .cell_from_xy(x.clamp(region.x, max_x), y.clamp(region.y, max_y))
    }

    /// Uniformly random cell inside the playable region.
    pub fn pick_random_location(&self, rng: &mut impl RandomSource) -> CellIndex {
        let region = self.region;
        let dx = rng.random_between(0, i32::from(region.width) - 1);
        let dy = rng.random_between(0, i32::from(region.height) - 1);
        let x = i32::from(region.x) + dx;
        let y = i32::from(region.y) + dy;
        self.size
            .cell_at(x, y)
            .unwrap_or_else(|| self.size.cell_from_xy(region.x, region.y))
    }

    /// Coarse threat region of a cell.
    #[must_use]
    pub fn cell_region(&self, cell: CellIndex) -> u32 {
        self.size.cell_region(cell)
    }

    /// Whether any cell is flagged for redraw.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.cells.iter().any(Cell::needs_redraw)
    }

    /// Clear every redraw flag and return the cells that had one.
    pub fn take_redraw_cells(&mut self) -> Vec<CellIndex> {
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(|(index, cell)| cell.take_redraw().then_some(index))
            .collect()
    }

    /// Encode the full grid state for save games and checkpoints.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| MapError::Snapshot(format!("Failed to serialize map: {e}")))
    }

    /// Decode a grid saved with [`MapGrid::serialize`], attaching terrain tables.
    pub fn deserialize(data: &[u8], terrain: Arc<TerrainData>) -> Result<Self> {
        let mut map: Self = bincode::deserialize(data)
            .map_err(|e| MapError::Snapshot(format!("Failed to deserialize map: {e}")))?;
        map.check_snapshot()?;
        map.terrain = terrain;
        Ok(map)
    }

    fn check_snapshot(&self) -> Result<()> {
        let (width, height) = (self.size.width(), self.size.height());
        if self.cells.len() != self.size.area() {
            return Err(MapError::Snapshot(format!(
                "Cell count {} does not match {width}x{height} grid",
                self.cells.len()
            )));
        }
        if self.region.right() > i32::from(width) || self.region.bottom() > i32::from(height) {
            return Err(MapError::Snapshot(format!(
                "Region {:?} outside {width}x{height} grid",
                self.region
            )));
        }
        self.check_crate_slots()?;
        self.ore.check_bounds(self.size.area())
    }

    /// Hash of cells, crates and scheduler state in index order.
    ///
    /// Two grids that went through the same operations with the same random
    /// draws hash equal.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.size.hash(&mut hasher);
        self.region.hash(&mut hasher);

        for cell in &self.cells {
            cell.template().hash(&mut hasher);
            cell.icon().hash(&mut hasher);
            cell.overlay().hash(&mut hasher);
            cell.overlay_frame().hash(&mut hasher);
            cell.smudge().hash(&mut hasher);
            cell.land().hash(&mut hasher);
            cell.occupiers().hash(&mut hasher);
            cell.overlapper_slots().hash(&mut hasher);
            for kind in crate::zone::ZoneKind::ALL {
                cell.zone(kind).hash(&mut hasher);
            }
            cell.is_visible().hash(&mut hasher);
            cell.is_revealed().hash(&mut hasher);
            cell.jam_mask().hash(&mut hasher);
        }

        for slot in &self.crates {
            slot.cell().hash(&mut hasher);
            slot.timer().hash(&mut hasher);
        }

        self.ore.hash(&mut hasher);
        self.total_value.hash(&mut hasher);

        hasher.finish()
    }
}

impl Default for MapGrid {
    fn default() -> Self {
        Self::standard()
    }
}
