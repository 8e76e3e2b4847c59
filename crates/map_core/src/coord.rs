//! Cell index, grid coordinate and lepton coordinate conversions.
//!
//! Cells are addressed by a dense row-major index. Positions inside a cell
//! use leptons: 256 leptons span one cell edge. All functions here are pure
//! and allocation-free.

use serde::{Deserialize, Serialize};

/// Linear cell index into the grid (`y * width + x`).
pub type CellIndex = usize;

/// Standard full grid width in cells.
pub const MAP_MAX_WIDTH: u16 = 128;

/// Standard full grid height in cells.
pub const MAP_MAX_HEIGHT: u16 = 128;

/// Number of cells in the standard full grid.
pub const MAP_MAX_AREA: usize = MAP_MAX_WIDTH as usize * MAP_MAX_HEIGHT as usize;

/// Grid width used by the oldest map layout.
pub const LEGACY_MAP_WIDTH: u16 = 64;

/// Grid height used by the oldest map layout.
pub const LEGACY_MAP_HEIGHT: u16 = 64;

/// Leptons per cell edge.
pub const LEPTONS_PER_CELL: i32 = 256;

/// Relative cell offset used by radius tables and object footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellOffset {
    /// Column delta.
    pub dx: i8,
    /// Row delta.
    pub dy: i8,
}

impl CellOffset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    /// The zero offset.
    pub const ORIGIN: Self = Self { dx: 0, dy: 0 };
}

/// Position in leptons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// X in leptons.
    pub x: i32,
    /// Y in leptons.
    pub y: i32,
}

impl Coord {
    /// Create a new lepton coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Approximate distance between two coordinates in leptons.
///
/// The longer axis plus half the shorter one.
#[must_use]
pub fn distance(a: Coord, b: Coord) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx > dy {
        dx + dy / 2
    } else {
        dy + dx / 2
    }
}

/// The eight compass facings, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// North (up).
    North,
    /// North-east.
    NorthEast,
    /// East.
    East,
    /// South-east.
    SouthEast,
    /// South (down).
    South,
    /// South-west.
    SouthWest,
    /// West.
    West,
    /// North-west.
    NorthWest,
}

impl Facing {
    /// All facings in clockwise order.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Facing for an index, wrapping modulo 8.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Cell offset one step in this direction.
    #[must_use]
    pub const fn offset(self) -> CellOffset {
        match self {
            Self::North => CellOffset::new(0, -1),
            Self::NorthEast => CellOffset::new(1, -1),
            Self::East => CellOffset::new(1, 0),
            Self::SouthEast => CellOffset::new(1, 1),
            Self::South => CellOffset::new(0, 1),
            Self::SouthWest => CellOffset::new(-1, 1),
            Self::West => CellOffset::new(-1, 0),
            Self::NorthWest => CellOffset::new(-1, -1),
        }
    }
}

/// Dimensions of the full allocated grid.
///
/// Fixed for the lifetime of a map; only the playable region changes
/// between scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u16,
    height: u16,
}

impl GridSize {
    /// The standard 128x128 grid.
    pub const STANDARD: Self = Self {
        width: MAP_MAX_WIDTH,
        height: MAP_MAX_HEIGHT,
    };

    /// The 64x64 grid of the oldest layout.
    pub const LEGACY: Self = Self {
        width: LEGACY_MAP_WIDTH,
        height: LEGACY_MAP_HEIGHT,
    };

    /// Create a grid size. Returns `None` for a zero or oversized dimension.
    ///
    /// Dimensions above 256 cannot be addressed by the sparse legacy layout
    /// and are rejected.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 || width > 256 || height > 256 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(self) -> u16 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(self) -> u16 {
        self.height
    }

    /// Total cell count.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Linear index for grid coordinates. Callers supply in-range values.
    #[inline]
    #[must_use]
    pub const fn cell_from_xy(self, x: u16, y: u16) -> CellIndex {
        y as usize * self.width as usize + x as usize
    }

    /// Grid coordinates for a linear index.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // x < width, and y < height for in-grid cells
    pub const fn cell_xy(self, cell: CellIndex) -> (u16, u16) {
        let width = self.width as usize;
        ((cell % width) as u16, (cell / width) as u16)
    }

    /// Check signed grid coordinates against the full grid.
    #[inline]
    #[must_use]
    pub const fn contains_xy(self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Index of signed grid coordinates, or `None` off the grid.
    #[inline]
    #[must_use]
    pub fn cell_at(self, x: i32, y: i32) -> Option<CellIndex> {
        let x = u16::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = u16::try_from(y).ok().filter(|y| *y < self.height)?;
        Some(self.cell_from_xy(x, y))
    }

    /// Check a linear index against the full grid.
    #[inline]
    #[must_use]
    pub const fn contains(self, cell: CellIndex) -> bool {
        cell < self.area()
    }

    /// Index of the cell at `offset` from `cell`, or `None` off the grid.
    ///
    /// Offsets never wrap across row ends.
    #[must_use]
    pub fn offset_cell(self, cell: CellIndex, offset: CellOffset) -> Option<CellIndex> {
        if !self.contains(cell) {
            return None;
        }
        let (x, y) = self.cell_xy(cell);
        let nx = i32::from(x) + i32::from(offset.dx);
        let ny = i32::from(y) + i32::from(offset.dy);
        self.cell_at(nx, ny)
    }

    /// Neighbouring cell in the given direction.
    #[must_use]
    pub fn adjacent(self, cell: CellIndex, facing: Facing) -> Option<CellIndex> {
        self.offset_cell(cell, facing.offset())
    }

    /// Lepton coordinate of a cell's centre.
    #[must_use]
    pub fn cell_to_coord(self, cell: CellIndex) -> Coord {
        let (x, y) = self.cell_xy(cell);
        Coord::new(
            i32::from(x) * LEPTONS_PER_CELL + LEPTONS_PER_CELL / 2,
            i32::from(y) * LEPTONS_PER_CELL + LEPTONS_PER_CELL / 2,
        )
    }

    /// Cell containing a lepton coordinate, or `None` off the grid.
    #[must_use]
    pub fn coord_to_cell(self, coord: Coord) -> Option<CellIndex> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        self.cell_at(coord.x / LEPTONS_PER_CELL, coord.y / LEPTONS_PER_CELL)
    }

    /// Coarse threat region for a cell: 4x4 blocks in a 34-wide table.
    #[must_use]
    pub fn cell_region(self, cell: CellIndex) -> u32 {
        let (x, y) = self.cell_xy(cell);
        34 * (u32::from(x) / 4 + 1) + (u32::from(y) / 4 + 1)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The playable sub-rectangle of the grid for the current scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapRegion {
    /// Left edge in cells.
    pub x: u16,
    /// Top edge in cells.
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl MapRegion {
    /// Create a region.
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole grid.
    #[must_use]
    pub const fn full(size: GridSize) -> Self {
        Self::new(0, 0, size.width(), size.height())
    }

    /// Check signed grid coordinates against the region.
    #[inline]
    #[must_use]
    pub const fn contains_xy(self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x < self.x as i32 + self.width as i32
            && y < self.y as i32 + self.height as i32
    }

    /// One past the right edge.
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x as i32 + self.width as i32
    }

    /// One past the bottom edge.
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y as i32 + self.height as i32
    }

    /// Number of cells in the region.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}
