//! Multi-cell object placement.
//!
//! Objects with a footprint larger than one cell are added to and removed
//! from every cell they cover in one call. Only ground-layer objects
//! flagged for multi-cell placement take this path; anything else is
//! ignored.

use std::sync::Arc;

use super::MapGrid;
use crate::coord::{CellIndex, CellOffset};
use crate::objects::{Layer, MapObject, ObjectId};

impl MapGrid {
    fn footprint_cells<'a>(
        &self,
        origin: CellIndex,
        offsets: &'a [CellOffset],
    ) -> impl Iterator<Item = CellIndex> + 'a {
        let size = self.size;
        offsets
            .iter()
            .filter_map(move |offset| size.offset_cell(origin, *offset))
    }

    fn multi_cell_eligible(object: &MapObject) -> bool {
        object.multi_cell && object.layer == Layer::Ground
    }

    /// Add an object to every cell of its occupy and overlap lists.
    pub fn place_down(&mut self, origin: CellIndex, id: ObjectId, object: &MapObject) {
        if !Self::multi_cell_eligible(object) {
            return;
        }
        let terrain = Arc::clone(&self.terrain);
        let occupy: Vec<_> = self.footprint_cells(origin, &object.footprint.occupy).collect();
        for cell in occupy {
            let target = &mut self.cells[cell];
            target.occupy_down(id, object.kind);
            target.recalc_attributes(&terrain);
            target.mark_redraw();
        }
        self.overlap_cells(origin, &object.footprint.overlap, id, true);
    }

    /// Remove an object from every cell of its occupy and overlap lists.
    pub fn pick_up(&mut self, origin: CellIndex, id: ObjectId, object: &MapObject) {
        if !Self::multi_cell_eligible(object) {
            return;
        }
        let terrain = Arc::clone(&self.terrain);
        let occupy: Vec<_> = self.footprint_cells(origin, &object.footprint.occupy).collect();
        for cell in occupy {
            let target = &mut self.cells[cell];
            target.occupy_up(id, object.kind);
            target.recalc_attributes(&terrain);
            target.mark_redraw();
        }
        self.overlap_cells(origin, &object.footprint.overlap, id, false);
    }

    /// Add an object to the overlapper slots of its overlap list only.
    pub fn overlap_down(&mut self, origin: CellIndex, id: ObjectId, object: &MapObject) {
        if Self::multi_cell_eligible(object) {
            self.overlap_cells(origin, &object.footprint.overlap, id, true);
        }
    }

    /// Remove an object from the overlapper slots of its overlap list only.
    pub fn overlap_up(&mut self, origin: CellIndex, id: ObjectId, object: &MapObject) {
        if Self::multi_cell_eligible(object) {
            self.overlap_cells(origin, &object.footprint.overlap, id, false);
        }
    }

    fn overlap_cells(&mut self, origin: CellIndex, offsets: &[CellOffset], id: ObjectId, down: bool) {
        let cells: Vec<_> = self.footprint_cells(origin, offsets).collect();
        for cell in cells {
            let target = &mut self.cells[cell];
            if down {
                if !target.overlap_down(id) {
                    tracing::warn!(cell, "Overlapper slots full");
                }
            } else {
                target.overlap_up(id);
            }
            target.mark_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpeedType;
    use crate::objects::{ObjectKind, ObjectPool};
    use crate::session::HouseId;
    use crate::zone::ZoneKind;

    fn building(map: &MapGrid, x: u16, y: u16) -> MapObject {
        let origin = map.size().cell_from_xy(x, y);
        MapObject::building(HouseId(0), map.size().cell_to_coord(origin), 2, 2)
    }

    #[test]
    fn test_place_down_and_pick_up() {
        let mut map = MapGrid::standard();
        let mut pool = ObjectPool::new();
        let object = building(&map, 10, 10);
        let id = pool.insert(object.clone());
        let origin = map.size().cell_from_xy(10, 10);

        map.place_down(origin, id, &object);
        let corner = map.size().cell_from_xy(11, 11);
        assert_eq!(map.cell(corner).unwrap().occupiers(), &[id]);
        assert_eq!(map.cell(corner).unwrap().occupancy().buildings, 1);
        let above = map.size().cell_from_xy(10, 9);
        assert_eq!(map.cell(above).unwrap().overlappers().collect::<Vec<_>>(), vec![id]);
        assert!(!map.cell(corner).unwrap().is_clear_to_move(
            SpeedType::Track,
            false,
            false,
            None,
            ZoneKind::Normal,
            map.terrain()
        ));

        map.pick_up(origin, id, &object);
        assert!(map.cell(corner).unwrap().occupiers().is_empty());
        assert_eq!(map.cell(above).unwrap().overlappers().count(), 0);
    }

    #[test]
    fn test_ineligible_objects_ignored() {
        let mut map = MapGrid::standard();
        let mut pool = ObjectPool::new();
        let mut object = building(&map, 10, 10);
        object.layer = Layer::Air;
        let id = pool.insert(object.clone());
        let origin = map.size().cell_from_xy(10, 10);
        map.place_down(origin, id, &object);
        assert!(map.cell(origin).unwrap().occupiers().is_empty());

        let tank = MapObject::new(ObjectKind::Vehicle, HouseId(0), object.coord);
        let tank_id = pool.insert(tank.clone());
        map.place_down(origin, tank_id, &tank);
        assert!(map.cell(origin).unwrap().occupiers().is_empty());
    }

    #[test]
    fn test_footprint_clipped_at_grid_edge() {
        let mut map = MapGrid::standard();
        let mut pool = ObjectPool::new();
        let object = building(&map, 127, 0);
        let id = pool.insert(object.clone());
        let origin = map.size().cell_from_xy(127, 0);
        map.place_down(origin, id, &object);
        assert_eq!(map.cell(origin).unwrap().occupiers(), &[id]);
        let next_row_start = map.size().cell_from_xy(0, 1);
        assert!(map.cell(next_row_start).unwrap().occupiers().is_empty());
    }

    #[test]
    fn test_overlap_only() {
        let mut map = MapGrid::standard();
        let mut pool = ObjectPool::new();
        let object = building(&map, 20, 20);
        let id = pool.insert(object.clone());
        let origin = map.size().cell_from_xy(20, 20);
        map.overlap_down(origin, id, &object);
        assert!(map.cell(origin).unwrap().occupiers().is_empty());
        let above = map.size().cell_from_xy(21, 19);
        assert_eq!(map.cell(above).unwrap().overlappers().count(), 1);
        map.overlap_up(origin, id, &object);
        assert_eq!(map.cell(above).unwrap().overlappers().count(), 0);
    }
}
