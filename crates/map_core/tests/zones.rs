//! Zone recompute properties.

use map_core::prelude::*;
use map_test_utils::determinism::strategies::arb_terrain_layout;
use map_test_utils::fixtures::{lake_grid, open_grid, sample_building, walled_grid};
use map_test_utils::proptest::prelude::*;

fn passable(map: &MapGrid, cell: CellIndex, kind: ZoneKind) -> bool {
    map.in_radar(cell)
        && map
            .cell(cell)
            .unwrap()
            .is_clear_to_move(kind.flood_speed(), true, true, None, kind, map.terrain())
}

fn layout_grid(layout: &[(TemplateId, u8)]) -> MapGrid {
    let mut map = open_grid(16);
    for (cell, (template, icon)) in layout.iter().enumerate() {
        map.set_template(cell, *template, *icon);
    }
    map
}

#[test]
fn wall_separates_sides() {
    let mut map = walled_grid();
    let counts = map.zone_reset(ZoneKind::Normal.into());
    assert_eq!(counts[ZoneKind::Normal.index()], 2);

    let west = map.size().cell_from_xy(2, 8);
    let east = map.size().cell_from_xy(12, 8);
    assert_ne!(
        map.cell(west).unwrap().zone(ZoneKind::Normal),
        map.cell(east).unwrap().zone(ZoneKind::Normal)
    );
}

#[test]
fn building_column_does_not_split_zone() {
    let mut map = open_grid(16);
    let mut pool = ObjectPool::new();
    for y in (0..16).step_by(2) {
        let building = sample_building(&map, HouseId(0), 7, y);
        let origin = map.size().cell_from_xy(7, y);
        let id = pool.insert(building.clone());
        map.place_down(origin, id, &building);
    }
    let blocked = map.size().cell_from_xy(8, 5);
    assert!(!map.cell(blocked).unwrap().occupiers().is_empty());

    let counts = map.zone_reset(ZoneKind::Normal.into());
    assert_eq!(counts[ZoneKind::Normal.index()], 1);

    // The same column as wall overlays does split it.
    let mut walled = walled_grid();
    let counts = walled.zone_reset(ZoneKind::Normal.into());
    assert_eq!(counts[ZoneKind::Normal.index()], 2);
}

#[test]
fn lake_is_its_own_amphibious_zone() {
    let mut map = lake_grid();
    let counts = map.zone_reset(ZoneMask::ALL);
    assert_eq!(counts[ZoneKind::Normal.index()], 1);
    assert_eq!(counts[ZoneKind::AmphibiousDestroyer.index()], 1);

    let water = map.size().cell_from_xy(7, 7);
    assert_eq!(map.cell(water).unwrap().zone(ZoneKind::Normal), 0);
    assert_eq!(map.cell(water).unwrap().zone(ZoneKind::AmphibiousDestroyer), 1);
}

#[test]
fn zone_filter_in_nearby_location() {
    let mut map = walled_grid();
    map.zone_reset(ZoneKind::Normal.into());
    let west = map.size().cell_from_xy(7, 8);
    let east_zone = map
        .cell(map.size().cell_from_xy(12, 8))
        .unwrap()
        .zone(ZoneKind::Normal);

    let found = map
        .nearby_location(west, SpeedType::Track, Some(east_zone), ZoneKind::Normal, 0)
        .unwrap();
    let (x, _) = map.size().cell_xy(found);
    assert!(x > 8);
}

proptest! {
    #[test]
    fn recompute_is_idempotent(layout in arb_terrain_layout()) {
        let mut map = layout_grid(&layout);
        let first_counts = map.zone_reset(ZoneMask::ALL);
        let first: Vec<_> = map.cells().iter().map(|c| ZoneKind::ALL.map(|k| c.zone(k))).collect();
        let second_counts = map.zone_reset(ZoneMask::ALL);
        let second: Vec<_> = map.cells().iter().map(|c| ZoneKind::ALL.map(|k| c.zone(k))).collect();
        prop_assert_eq!(first_counts, second_counts);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn orthogonal_neighbours_share_zone(layout in arb_terrain_layout()) {
        let mut map = layout_grid(&layout);
        map.zone_reset(ZoneMask::ALL);
        for kind in ZoneKind::ALL {
            for cell in 0..map.size().area() {
                let here = map.cell(cell).unwrap().zone(kind);
                prop_assert_eq!(here != 0, passable(&map, cell, kind));
                if here == 0 {
                    continue;
                }
                for facing in [Facing::North, Facing::East, Facing::South, Facing::West] {
                    if let Some(next) = map.size().adjacent(cell, facing) {
                        if passable(&map, next, kind) {
                            prop_assert_eq!(map.cell(next).unwrap().zone(kind), here);
                        }
                    }
                }
            }
        }
    }
}
