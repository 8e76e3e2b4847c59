//! Spatial searches over the grid.

use super::MapGrid;
use crate::coord::{distance, CellIndex, Coord, Facing};
use crate::data::SpeedType;
use crate::objects::{ObjectId, ObjectKind, ObjectPool};
use crate::session::Houses;
use crate::zone::ZoneKind;

/// Rings searched by [`MapGrid::nearby_location`].
const NEARBY_RINGS: i32 = 64;

/// Candidates kept by [`MapGrid::nearby_location`].
const NEARBY_CANDIDATES: usize = 10;

/// Objects further than this from the spot are never picked (leptons).
const CLOSE_OBJECT_RANGE: i32 = 0xB5;

impl MapGrid {
    /// Find a cell near `cell` that `speed` can move onto.
    ///
    /// Square rings of growing radius are searched, clipped to the playable
    /// region. The first ring yielding any clear cell ends the search (at
    /// most ten candidates are kept), and `frame` picks among them so that
    /// callers on consecutive frames spread out. `zone` restricts candidates
    /// to one movement zone of `kind`.
    #[must_use]
    pub fn nearby_location(
        &self,
        cell: CellIndex,
        speed: SpeedType,
        zone: Option<u16>,
        kind: ZoneKind,
        frame: u32,
    ) -> Option<CellIndex> {
        if !self.size.contains(cell) {
            return None;
        }
        let (x, y) = self.size.cell_xy(cell);
        let (cx, cy) = (i32::from(x), i32::from(y));
        let region = self.region;
        let left = cx - i32::from(region.x);
        let right = i32::from(region.width) - left - 1;
        let top = cy - i32::from(region.y);
        let bottom = i32::from(region.height) - top - 1;

        let mut candidates = Vec::with_capacity(NEARBY_CANDIDATES);
        let consider = |x: i32, y: i32, candidates: &mut Vec<CellIndex>| {
            if candidates.len() >= NEARBY_CANDIDATES {
                return;
            }
            let Some(target) = self.size.cell_at(x, y) else {
                return;
            };
            if self.in_radar(target)
                && self.cells[target].is_clear_to_move(speed, false, false, zone, kind, &self.terrain)
            {
                candidates.push(target);
            }
        };

        for ring in 0..NEARBY_RINGS {
            for j in -ring..=ring {
                if j >= -left && ring <= top {
                    consider(cx + j, cy - ring, &mut candidates);
                }
                if j <= right && ring <= bottom {
                    consider(cx + j, cy + ring, &mut candidates);
                }
            }
            for k in -(ring - 1)..=(ring - 1) {
                if k >= -top && ring <= left {
                    consider(cx - ring, cy + k, &mut candidates);
                }
                if k <= bottom && ring <= right {
                    consider(cx + ring, cy + k, &mut candidates);
                }
            }
            if !candidates.is_empty() {
                break;
            }
        }

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[frame as usize % candidates.len()])
    }

    /// Nearest selectable object to `coord`.
    ///
    /// Only occupiers of the 3x3 cells around the coordinate are candidates.
    /// Cloaked technos not allied to the local player are skipped, buildings
    /// are measured to the centre of the cell they were found in, and
    /// nothing further than 181 leptons is returned.
    #[must_use]
    pub fn close_object(&self, coord: Coord, objects: &ObjectPool, houses: &Houses) -> Option<ObjectId> {
        let center = self.size.coord_to_cell(coord)?;
        let neighbours = Facing::ALL
            .iter()
            .filter_map(|facing| self.size.adjacent(center, *facing));

        let mut best: Option<(ObjectId, i32)> = None;
        for cell in std::iter::once(center).chain(neighbours) {
            if !self.in_radar(cell) {
                continue;
            }
            for &id in self.cells[cell].occupiers() {
                let Some(object) = objects.get(id) else {
                    continue;
                };
                if object.in_limbo {
                    continue;
                }
                if object.kind.is_techno() && object.cloaked && !houses.is_player_ally(object.owner) {
                    continue;
                }
                let measured = if object.kind == ObjectKind::Building {
                    distance(coord, self.size.cell_to_coord(cell))
                } else {
                    distance(coord, object.coord)
                };
                if best.map_or(true, |(_, nearest)| measured < nearest) {
                    best = Some((id, measured));
                }
            }
        }

        best.filter(|(_, nearest)| *nearest <= CLOSE_OBJECT_RANGE)
            .map(|(id, _)| id)
    }

    /// Number of cells showing the intact section of a bridge.
    #[must_use]
    pub fn intact_bridge_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| {
                self.terrain
                    .templates
                    .get(cell.template())
                    .is_some_and(|template| template.is_intact_bridge(cell.icon()))
            })
            .count()
    }
}
