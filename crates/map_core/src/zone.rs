//! Movement-zone connectivity.
//!
//! Each cell carries one zone tag per [`ZoneKind`]. Cells sharing a tag are
//! mutually reachable for that movement capability through static terrain
//! alone; units, buildings and infantry are not obstacles here. Pathfinding
//! uses the tags to reject impossible moves before searching.
//!
//! Tags are assigned by a scan-line flood fill over the playable region,
//! driven by an explicit work stack instead of recursion.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coord::CellIndex;
use crate::data::SpeedType;
use crate::map::MapGrid;

/// Movement capability a zone tag describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Ordinary ground units; walls block.
    Normal,
    /// Heavy tracked units that can crush light walls.
    Crusher,
    /// Units that can break through any wall.
    Destroyer,
    /// Wall-breaking naval units.
    AmphibiousDestroyer,
}

impl ZoneKind {
    /// Number of zone kinds.
    pub const COUNT: usize = 4;

    /// All zone kinds in tag order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Normal,
        Self::Crusher,
        Self::Destroyer,
        Self::AmphibiousDestroyer,
    ];

    /// Position in a cell's tag array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Movement type tested when flood filling this kind.
    #[must_use]
    pub const fn flood_speed(self) -> SpeedType {
        match self {
            Self::AmphibiousDestroyer => SpeedType::Float,
            _ => SpeedType::Track,
        }
    }
}

/// Set of zone kinds to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ZoneMask(u8);

impl ZoneMask {
    /// No zone kinds.
    pub const NONE: Self = Self(0);
    /// Every zone kind.
    pub const ALL: Self = Self(0b1111);

    /// Mask containing a single kind.
    #[must_use]
    pub const fn only(kind: ZoneKind) -> Self {
        Self(1 << kind.index())
    }

    /// Mask from raw bits; unknown bits are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the mask includes `kind`.
    #[must_use]
    pub const fn contains(self, kind: ZoneKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }
}

impl BitOr for ZoneMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<ZoneKind> for ZoneMask {
    fn from(kind: ZoneKind) -> Self {
        Self::only(kind)
    }
}

/// Pending row segment whose columns are flood-fill seeds.
#[derive(Debug, Clone, Copy)]
struct SeedRow {
    first: i32,
    last: i32,
    y: i32,
}

impl MapGrid {
    /// Clear and recompute zone tags for every kind in `mask`.
    ///
    /// Returns the number of zones found per kind, indexed by
    /// [`ZoneKind::index`]; kinds outside the mask report 0.
    pub fn zone_reset(&mut self, mask: ZoneMask) -> [u16; ZoneKind::COUNT] {
        for cell in &mut self.cells {
            for kind in ZoneKind::ALL {
                if mask.contains(kind) {
                    cell.set_zone(kind, 0);
                }
            }
        }

        let mut counts = [0u16; ZoneKind::COUNT];
        for kind in ZoneKind::ALL {
            if !mask.contains(kind) {
                continue;
            }
            let mut zone: u16 = 1;
            for cell in 0..self.cells.len() {
                if self.zone_span(cell, zone, kind) != 0 {
                    zone = zone.saturating_add(1);
                }
            }
            counts[kind.index()] = zone - 1;
            debug!(?kind, zones = zone - 1, "Zone recompute finished");
        }
        counts
    }

    /// Tag every cell reachable from `cell` with `zone` for `kind`.
    ///
    /// Does nothing for cells outside the playable region, already tagged
    /// or impassable. Returns the number of cells tagged.
    pub fn zone_span(&mut self, cell: CellIndex, zone: u16, kind: ZoneKind) -> usize {
        if !self.size.contains(cell) {
            return 0;
        }
        let (x, y) = self.size.cell_xy(cell);
        let mut stack = vec![SeedRow {
            first: i32::from(x),
            last: i32::from(x),
            y: i32::from(y),
        }];
        let mut tagged = 0;

        while let Some(row) = stack.pop() {
            for seed_x in row.first..=row.last {
                let Some((left, right)) = self.span_row(seed_x, row.y, kind) else {
                    continue;
                };
                for index in (left..=right).filter_map(|span_x| self.size.cell_at(span_x, row.y)) {
                    self.cells[index].set_zone(kind, zone);
                    tagged += 1;
                }

                // Diagonal reach on the left only; the span's right neighbour
                // column is never seeded.
                stack.push(SeedRow {
                    first: left - 1,
                    last: right,
                    y: row.y - 1,
                });
                stack.push(SeedRow {
                    first: left - 1,
                    last: right,
                    y: row.y + 1,
                });
            }
        }
        tagged
    }

    /// Horizontal run of untagged passable cells through `(x, y)`.
    fn span_row(&self, x: i32, y: i32, kind: ZoneKind) -> Option<(i32, i32)> {
        if !self.region.contains_xy(x, y) || !self.zone_open(x, y, kind) {
            return None;
        }

        let mut left = x;
        while left - 1 >= i32::from(self.region.x) && self.zone_open(left - 1, y, kind) {
            left -= 1;
        }

        let mut right = x;
        while right + 1 < self.region.right() && self.zone_open(right + 1, y, kind) {
            right += 1;
        }

        Some((left, right))
    }

    fn zone_open(&self, x: i32, y: i32, kind: ZoneKind) -> bool {
        self.size.cell_at(x, y).is_some_and(|index| {
            let cell = &self.cells[index];
            cell.zone(kind) == 0
                && cell.is_clear_to_move(kind.flood_speed(), true, true, None, kind, &self.terrain)
        })
    }
}
