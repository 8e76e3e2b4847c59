//! Sight, shroud and radar jamming over radius disks.
//!
//! All four operations walk the same disk: every offset of the radius
//! table slice, skipping cells off the grid, cells whose column distance
//! exceeds the radius, and cells whose centre lies further than
//! `radius * 256` leptons from the origin's centre. Radii the table does
//! not cover are rejected outright.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::MapGrid;
use crate::coord::{distance, CellIndex, CellOffset, Coord, GridSize, LEPTONS_PER_CELL};
use crate::objects::{Layer, MapObject, ObjectPool};
use crate::radius::{band_offsets_for, offsets_for, MAX_SIGHT_RADIUS};
use crate::session::{HouseId, Houses, Session};

/// Area the local player's view was restricted to by the last jam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookConstraint {
    /// Centre of the jammed area.
    pub center: Coord,
    /// Radius in leptons.
    pub range: i32,
}

/// Cells of the disk around `origin` built from `offsets`.
fn disk_cells(
    size: GridSize,
    origin: CellIndex,
    radius: u8,
    offsets: &'static [CellOffset],
) -> impl Iterator<Item = CellIndex> {
    let center = size.cell_to_coord(origin);
    let limit = i32::from(radius) * LEPTONS_PER_CELL;
    offsets.iter().filter_map(move |offset| {
        if offset.dx.unsigned_abs() > radius {
            return None;
        }
        let cell = size.offset_cell(origin, *offset)?;
        (distance(center, size.cell_to_coord(cell)) <= limit).then_some(cell)
    })
}

impl MapGrid {
    /// Reveal cells around `origin` to the local player on behalf of `owner`.
    ///
    /// `band_only` limits the walk to the three outermost rings, used when a
    /// unit that already saw the inner disk moves one step. Nothing happens
    /// unless the origin is playable, the radius is covered by the table and
    /// the local player controls `owner`. Returns the number of newly
    /// revealed cells.
    pub fn reveal(
        &mut self,
        origin: CellIndex,
        radius: u8,
        owner: HouseId,
        band_only: bool,
        houses: &Houses,
    ) -> usize {
        if !self.in_radar(origin) {
            return 0;
        }
        let offsets = if band_only {
            band_offsets_for(usize::from(radius))
        } else {
            offsets_for(usize::from(radius))
        };
        let Some(offsets) = offsets else {
            warn!(origin, radius, "Sight radius beyond table");
            return 0;
        };
        if !houses.player_has_control(owner) {
            return 0;
        }

        let mut revealed = 0;
        for cell in disk_cells(self.size, origin, radius, offsets) {
            let target = &mut self.cells[cell];
            if !target.visible {
                target.visible = true;
                target.revealed = true;
                target.mark_redraw();
                revealed += 1;
            }
        }
        revealed
    }

    /// Hide cells around `origin` from the local player.
    ///
    /// Requires a playable origin and `0 < radius <= gap_radius`. Returns
    /// the number of cells touched.
    pub fn shroud(&mut self, origin: CellIndex, radius: u8) -> usize {
        if !self.in_radar(origin) || radius == 0 || radius > self.rules.gap_radius {
            return 0;
        }
        let Some(offsets) = offsets_for(usize::from(radius)) else {
            warn!(origin, radius, "Shroud radius beyond table");
            return 0;
        };

        let mut count = 0;
        for cell in disk_cells(self.size, origin, radius, offsets) {
            let target = &mut self.cells[cell];
            target.visible = false;
            target.revealed = false;
            target.mark_redraw();
            count += 1;
        }
        count
    }

    /// Jam radar around `origin` for `owner`.
    ///
    /// Ignored in the map editor and for radii above `gap_radius`. When the
    /// local player controls `owner`, its view is constrained to the gap
    /// radius around the origin.
    pub fn jam(
        &mut self,
        origin: CellIndex,
        radius: u8,
        owner: HouseId,
        houses: &Houses,
        session: &Session,
    ) -> usize {
        let Some(offsets) = self.jam_offsets(origin, radius, session) else {
            return 0;
        };

        let mut count = 0;
        for cell in disk_cells(self.size, origin, radius, offsets) {
            self.cells[cell].jam(owner);
            count += 1;
        }

        if houses.player_has_control(owner) {
            self.look_constraint = Some(LookConstraint {
                center: self.size.cell_to_coord(origin),
                range: i32::from(self.rules.gap_radius) * LEPTONS_PER_CELL,
            });
        }
        count
    }

    /// Lift radar jamming by `owner` around `origin`.
    pub fn unjam(&mut self, origin: CellIndex, radius: u8, owner: HouseId, session: &Session) -> usize {
        let Some(offsets) = self.jam_offsets(origin, radius, session) else {
            return 0;
        };

        let mut count = 0;
        for cell in disk_cells(self.size, origin, radius, offsets) {
            self.cells[cell].unjam(owner);
            count += 1;
        }
        count
    }

    fn jam_offsets(
        &self,
        origin: CellIndex,
        radius: u8,
        session: &Session,
    ) -> Option<&'static [CellOffset]> {
        if session.map_editor || !self.size.contains(origin) || radius > self.rules.gap_radius {
            return None;
        }
        if usize::from(radius) > MAX_SIGHT_RADIUS {
            warn!(origin, radius, "Jam radius beyond table");
            return None;
        }
        offsets_for(usize::from(radius))
    }

    /// Take the view constraint left by the last jam, if any.
    pub fn take_look_constraint(&mut self) -> Option<LookConstraint> {
        self.look_constraint.take()
    }

    /// Reveal the sight disk of one object.
    pub fn look(&mut self, object: &MapObject, houses: &Houses) -> usize {
        match self.size.coord_to_cell(object.coord) {
            Some(cell) => self.reveal(cell, object.sight, object.owner, false, houses),
            None => 0,
        }
    }

    /// Hide the whole playable region, then restore what the local
    /// player's ground units and structures can see.
    pub fn shroud_the_map(&mut self, objects: &ObjectPool, houses: &Houses) {
        let region = self.region;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if !(cell.visible || cell.revealed) {
                continue;
            }
            cell.mark_redraw();
            let (x, y) = self.size.cell_xy(index);
            if region.contains_xy(i32::from(x), i32::from(y)) {
                cell.visible = false;
                cell.revealed = false;
            }
        }

        for (_, object) in objects.iter() {
            if object.layer == Layer::Ground
                && object.kind.is_techno()
                && !object.in_limbo
                && houses.is_player(object.owner)
            {
                self.look(object, houses);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectKind;
    use crate::radius::RADIUS_COUNT;

    const PLAYER: HouseId = HouseId(1);
    const ENEMY: HouseId = HouseId(2);

    fn setup() -> (MapGrid, Houses) {
        (MapGrid::standard(), Houses::with_player(PLAYER))
    }

    fn visible_count(map: &MapGrid) -> usize {
        map.cells().iter().filter(|c| c.is_visible()).count()
    }

    #[test]
    fn test_reveal_full_disk_in_open_field() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        let revealed = map.reveal(origin, 1, PLAYER, false, &houses);
        assert_eq!(revealed, 9);
        assert!(map.cell(origin).unwrap().is_revealed());
    }

    #[test]
    fn test_reveal_applies_distance_filter() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        let revealed = map.reveal(origin, 2, PLAYER, false, &houses);
        // (2,1) offsets sit at 640 leptons, past the 512 limit.
        assert!(revealed < RADIUS_COUNT[2]);
        let far_corner = map.size().cell_from_xy(66, 65);
        assert!(!map.cell(far_corner).unwrap().is_visible());
        let edge = map.size().cell_from_xy(66, 64);
        assert!(map.cell(edge).unwrap().is_visible());
    }

    #[test]
    fn test_reveal_does_not_wrap_rows() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(0, 10);
        map.reveal(origin, 3, PLAYER, false, &houses);
        let wrapped = map.size().cell_from_xy(127, 10);
        assert!(!map.cell(wrapped).unwrap().is_visible());
    }

    #[test]
    fn test_reveal_band_skips_center() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        map.reveal(origin, 5, PLAYER, true, &houses);
        assert!(!map.cell(origin).unwrap().is_visible());
        assert!(visible_count(&map) > 0);
    }

    #[test]
    fn test_reveal_requires_player_control() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        assert_eq!(map.reveal(origin, 3, ENEMY, false, &houses), 0);
        assert_eq!(visible_count(&map), 0);
    }

    #[test]
    fn test_radius_past_table_is_noop() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        map.reveal(origin, 4, PLAYER, false, &houses);
        let before = map.state_hash();

        assert_eq!(map.reveal(origin, 11, PLAYER, false, &houses), 0);
        map.rules.gap_radius = 20;
        assert_eq!(map.shroud(origin, 11), 0);
        assert_eq!(map.jam(origin, 11, PLAYER, &houses, &Session::default()), 0);
        assert_eq!(map.unjam(origin, 11, PLAYER, &Session::default()), 0);
        assert_eq!(map.state_hash(), before);
        assert!(map.take_look_constraint().is_none());
    }

    #[test]
    fn test_shroud_bounds() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(64, 64);
        map.reveal(origin, 5, PLAYER, false, &houses);
        assert_eq!(map.shroud(origin, 0), 0);
        map.rules.gap_radius = 3;
        assert_eq!(map.shroud(origin, 4), 0);
        assert!(map.shroud(origin, 3) > 0);
        assert!(!map.cell(origin).unwrap().is_visible());
    }

    #[test]
    fn test_jam_sets_constraint_for_player() {
        let (mut map, houses) = setup();
        let origin = map.size().cell_from_xy(20, 20);
        let session = Session::skirmish();
        assert!(map.jam(origin, 2, PLAYER, &houses, &session) > 0);
        assert!(map.cell(origin).unwrap().is_jammed_by(PLAYER));
        let constraint = map.take_look_constraint().unwrap();
        assert_eq!(constraint.range, 10 * 256);

        map.jam(origin, 2, ENEMY, &houses, &session);
        assert!(map.take_look_constraint().is_none());

        map.unjam(origin, 2, PLAYER, &session);
        assert!(!map.cell(origin).unwrap().is_jammed_by(PLAYER));
        assert!(map.cell(origin).unwrap().is_jammed_by(ENEMY));
    }

    #[test]
    fn test_jam_ignored_in_editor() {
        let (mut map, houses) = setup();
        let session = Session {
            map_editor: true,
            ..Session::default()
        };
        assert_eq!(map.jam(100, 2, PLAYER, &houses, &session), 0);
        assert!(!map.cell(100).unwrap().is_jammed());
    }

    #[test]
    fn test_shroud_the_map_relooks_player_units() {
        let (mut map, houses) = setup();
        map.set_map_dimensions(10, 10, 50, 50);
        let everywhere = map.size().cell_from_xy(30, 30);
        map.reveal(everywhere, 10, PLAYER, false, &houses);

        let mut objects = ObjectPool::new();
        let coord = map.size().cell_to_coord(map.size().cell_from_xy(15, 15));
        objects.insert(MapObject::new(ObjectKind::Vehicle, PLAYER, coord).with_sight(1));
        let enemy_coord = map.size().cell_to_coord(map.size().cell_from_xy(40, 40));
        objects.insert(MapObject::new(ObjectKind::Vehicle, ENEMY, enemy_coord).with_sight(3));

        map.shroud_the_map(&objects, &houses);
        assert_eq!(visible_count(&map), 9);
        assert!(map.cell(map.size().cell_from_xy(15, 15)).unwrap().is_visible());
    }
}
