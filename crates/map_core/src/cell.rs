//! A single grid tile.
//!
//! A cell stores its terrain layers (template, icon, overlay, smudge), the
//! land type derived from them, the objects on it, visibility and jamming
//! state, and one movement-zone tag per [`ZoneKind`].

use serde::{Deserialize, Serialize};

use crate::config::MapRules;
use crate::data::{LandType, OreKind, OverlayType, SmudgeType, SpeedType, TemplateId, TerrainData};
use crate::objects::{ObjectId, ObjectKind};
use crate::session::HouseId;
use crate::zone::ZoneKind;

/// Number of overlapper slots per cell.
pub const OVERLAPPER_SLOTS: usize = 6;

/// Gold frame reached from a given number of ore neighbours.
const GOLD_ADJUST: [u8; 9] = [0, 1, 3, 4, 6, 7, 8, 10, 11];

/// Gem frame reached from a given number of ore neighbours.
const GEM_ADJUST: [u8; 9] = [0, 0, 0, 1, 1, 1, 2, 2, 2];

/// Gem frames are worth this many times their base value.
const GEM_MULTIPLIER: u32 = 3;

/// Count of occupying objects by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Occupancy {
    /// Structures.
    pub buildings: u8,
    /// Vehicles, vessels and landed aircraft.
    pub vehicles: u8,
    /// Infantry.
    pub infantry: u8,
    /// Trees and other terrain objects.
    pub terrain: u8,
}

impl Occupancy {
    fn counter(&mut self, kind: ObjectKind) -> &mut u8 {
        match kind {
            ObjectKind::Building => &mut self.buildings,
            ObjectKind::Vehicle | ObjectKind::Vessel | ObjectKind::Aircraft => &mut self.vehicles,
            ObjectKind::Infantry => &mut self.infantry,
            ObjectKind::Terrain => &mut self.terrain,
        }
    }

    /// Whether nothing occupies the cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buildings == 0 && self.vehicles == 0 && self.infantry == 0 && self.terrain == 0
    }
}

/// One tile of the map grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) template: TemplateId,
    pub(crate) icon: u8,
    pub(crate) overlay: Option<OverlayType>,
    pub(crate) overlay_frame: u8,
    pub(crate) smudge: Option<SmudgeType>,
    pub(crate) land: LandType,
    base_land: LandType,
    occupiers: Vec<ObjectId>,
    overlappers: [Option<ObjectId>; OVERLAPPER_SLOTS],
    occupancy: Occupancy,
    zones: [u16; ZoneKind::COUNT],
    pub(crate) visible: bool,
    pub(crate) revealed: bool,
    jammed_by: u32,
    needs_redraw: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            template: TemplateId::NONE,
            icon: 0,
            overlay: None,
            overlay_frame: 0,
            smudge: None,
            land: LandType::Clear,
            base_land: LandType::Clear,
            occupiers: Vec::new(),
            overlappers: [None; OVERLAPPER_SLOTS],
            occupancy: Occupancy::default(),
            zones: [0; ZoneKind::COUNT],
            visible: false,
            revealed: false,
            jammed_by: 0,
            needs_redraw: false,
        }
    }
}

impl Cell {
    /// Terrain template.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Icon within the template.
    #[must_use]
    pub const fn icon(&self) -> u8 {
        self.icon
    }

    /// Overlay on the cell.
    #[must_use]
    pub const fn overlay(&self) -> Option<OverlayType> {
        self.overlay
    }

    /// Overlay animation frame; for ore this is the ore amount.
    #[must_use]
    pub const fn overlay_frame(&self) -> u8 {
        self.overlay_frame
    }

    /// Smudge on the cell.
    #[must_use]
    pub const fn smudge(&self) -> Option<SmudgeType> {
        self.smudge
    }

    /// Derived land type.
    #[must_use]
    pub const fn land(&self) -> LandType {
        self.land
    }

    /// Land type of the terrain template alone, ignoring overlays.
    #[must_use]
    pub const fn base_land(&self) -> LandType {
        self.base_land
    }

    /// Objects occupying the cell.
    #[must_use]
    pub fn occupiers(&self) -> &[ObjectId] {
        &self.occupiers
    }

    /// Objects overlapping the cell.
    pub fn overlappers(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.overlappers.iter().flatten().copied()
    }

    pub(crate) const fn overlapper_slots(&self) -> &[Option<ObjectId>; OVERLAPPER_SLOTS] {
        &self.overlappers
    }

    /// Occupancy counts.
    #[must_use]
    pub const fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    /// Zone tag for a zone kind; 0 means unclassified.
    #[must_use]
    pub const fn zone(&self, kind: ZoneKind) -> u16 {
        self.zones[kind.index()]
    }

    pub(crate) fn set_zone(&mut self, kind: ZoneKind, zone: u16) {
        self.zones[kind.index()] = zone;
    }

    /// Visible to the local player.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Ever revealed to the local player.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether any house jams radar here.
    #[must_use]
    pub const fn is_jammed(&self) -> bool {
        self.jammed_by != 0
    }

    /// Whether `house` jams radar here.
    #[must_use]
    pub const fn is_jammed_by(&self, house: HouseId) -> bool {
        house.0 < 32 && self.jammed_by & (1 << house.0) != 0
    }

    /// Bit per house jamming radar here.
    #[must_use]
    pub const fn jam_mask(&self) -> u32 {
        self.jammed_by
    }

    pub(crate) fn jam(&mut self, house: HouseId) {
        if house.0 < 32 {
            self.jammed_by |= 1 << house.0;
            self.needs_redraw = true;
        }
    }

    pub(crate) fn unjam(&mut self, house: HouseId) {
        if house.0 < 32 {
            self.jammed_by &= !(1 << house.0);
            self.needs_redraw = true;
        }
    }

    /// Whether the cell changed since the redraw flag was last taken.
    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Clear and return the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub(crate) fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Refresh derived attributes after a terrain layer changed.
    pub fn recalc_attributes(&mut self, terrain: &TerrainData) {
        self.base_land = if self.template.is_none() {
            LandType::Clear
        } else {
            terrain
                .template_land(self.template, self.icon)
                .unwrap_or(LandType::Clear)
        };
        self.land = self
            .overlay
            .and_then(OverlayType::land)
            .unwrap_or(self.base_land);
    }

    /// Whether a unit can enter this cell.
    ///
    /// `zone` restricts the check to cells tagged with that zone for `kind`.
    /// Units and buildings block unless `ignore_units`, infantry blocks
    /// unless `ignore_infantry`. Walls block normal movement, crushable
    /// walls let crushers through and destroyers ignore walls entirely,
    /// seeing the land underneath.
    #[must_use]
    pub fn is_clear_to_move(
        &self,
        speed: SpeedType,
        ignore_infantry: bool,
        ignore_units: bool,
        zone: Option<u16>,
        kind: ZoneKind,
        terrain: &TerrainData,
    ) -> bool {
        if zone.is_some_and(|zone| self.zone(kind) != zone) {
            return false;
        }

        if !ignore_units
            && (self.occupancy.buildings > 0
                || self.occupancy.vehicles > 0
                || self.occupancy.terrain > 0)
        {
            return false;
        }

        if !ignore_infantry && self.occupancy.infantry > 0 {
            return false;
        }

        let mut land = self.land;
        if let Some(overlay) = self.overlay.filter(|o| o.is_wall()) {
            match kind {
                ZoneKind::Normal => return false,
                ZoneKind::Crusher if !overlay.is_crushable() => return false,
                _ => land = self.base_land,
            }
        }

        terrain.ground.is_passable(land, speed)
    }

    /// Ore kind on this cell, if any.
    #[must_use]
    pub fn ore_kind(&self) -> Option<OreKind> {
        self.overlay.and_then(OverlayType::ore_kind)
    }

    /// Whether gold here can grow one frame denser.
    #[must_use]
    pub fn can_ore_grow(&self, rules: &MapRules) -> bool {
        rules.ore_grows
            && self.ore_kind() == Some(OreKind::Gold)
            && self.overlay_frame < OreKind::Gold.max_frame()
    }

    /// Whether gold here is dense enough to seed a neighbour.
    #[must_use]
    pub fn can_ore_spread(&self, rules: &MapRules) -> bool {
        rules.ore_spreads && self.ore_kind() == Some(OreKind::Gold) && self.overlay_frame > 6
    }

    /// Grow gold one frame. Returns whether anything changed.
    pub fn grow_ore(&mut self) -> bool {
        match self.ore_kind() {
            Some(kind) if self.overlay_frame < kind.max_frame() => {
                self.overlay_frame += 1;
                self.needs_redraw = true;
                true
            }
            _ => false,
        }
    }

    /// Lose one frame of ore after seeding a neighbour.
    pub(crate) fn reduce_ore(&mut self) {
        if self.ore_kind().is_some() && self.overlay_frame > 0 {
            self.overlay_frame -= 1;
            self.needs_redraw = true;
        }
    }

    /// Set the ore frame from the number of ore neighbours and return the
    /// cell's ore value in credits.
    pub fn ore_adjust(&mut self, neighbours: usize, rules: &MapRules) -> u32 {
        let index = neighbours.min(GOLD_ADJUST.len() - 1);
        match self.ore_kind() {
            Some(OreKind::Gold) => {
                self.overlay_frame = GOLD_ADJUST[index];
                (u32::from(self.overlay_frame) + 1) * rules.gold_value
            }
            Some(OreKind::Gem) => {
                self.overlay_frame = GEM_ADJUST[index];
                (u32::from(self.overlay_frame) + 1) * rules.gem_value * GEM_MULTIPLIER
            }
            None => 0,
        }
    }

    /// Record an occupying object.
    pub fn occupy_down(&mut self, id: ObjectId, kind: ObjectKind) {
        if self.occupiers.contains(&id) {
            return;
        }
        self.occupiers.push(id);
        let counter = self.occupancy.counter(kind);
        *counter = counter.saturating_add(1);
    }

    /// Remove an occupying object.
    pub fn occupy_up(&mut self, id: ObjectId, kind: ObjectKind) {
        if let Some(pos) = self.occupiers.iter().position(|o| *o == id) {
            self.occupiers.remove(pos);
            let counter = self.occupancy.counter(kind);
            *counter = counter.saturating_sub(1);
        }
    }

    /// Record an overlapping object. Returns false when every slot is taken.
    pub fn overlap_down(&mut self, id: ObjectId) -> bool {
        if self.overlappers.contains(&Some(id)) {
            return true;
        }
        match self.overlappers.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(id);
                true
            }
            None => false,
        }
    }

    /// Remove an overlapping object.
    pub fn overlap_up(&mut self, id: ObjectId) {
        for slot in &mut self.overlappers {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;
    use crate::objects::{MapObject, ObjectPool};

    fn terrain() -> TerrainData {
        TerrainData::classic()
    }

    fn cell_with(template: u16, icon: u8, overlay: Option<OverlayType>) -> Cell {
        let mut cell = Cell {
            template: TemplateId(template),
            icon,
            overlay,
            ..Cell::default()
        };
        cell.recalc_attributes(&terrain());
        cell
    }

    #[test]
    fn test_land_from_template() {
        assert_eq!(cell_with(1, 0, None).land(), LandType::Water);
        assert_eq!(cell_with(97, 1, None).land(), LandType::Rock);
        assert_eq!(Cell::default().land(), LandType::Clear);
    }

    #[test]
    fn test_overlay_overrides_land() {
        let cell = cell_with(0, 0, Some(OverlayType::Brick));
        assert_eq!(cell.land(), LandType::Wall);
        assert_eq!(cell.base_land(), LandType::Clear);
    }

    #[test]
    fn test_walls_by_zone_kind() {
        let terrain = terrain();
        let brick = cell_with(0, 0, Some(OverlayType::Brick));
        let sandbag = cell_with(0, 0, Some(OverlayType::Sandbag));
        let t = SpeedType::Track;

        assert!(!sandbag.is_clear_to_move(t, true, true, None, ZoneKind::Normal, &terrain));
        assert!(sandbag.is_clear_to_move(t, true, true, None, ZoneKind::Crusher, &terrain));
        assert!(!brick.is_clear_to_move(t, true, true, None, ZoneKind::Crusher, &terrain));
        assert!(brick.is_clear_to_move(t, true, true, None, ZoneKind::Destroyer, &terrain));
    }

    #[test]
    fn test_occupants_block_unless_ignored() {
        let terrain = terrain();
        let mut pool = ObjectPool::new();
        let soldier = pool.insert(MapObject::new(ObjectKind::Infantry, HouseId(0), Coord::default()));
        let mut cell = cell_with(0, 0, None);
        cell.occupy_down(soldier, ObjectKind::Infantry);

        let t = SpeedType::Foot;
        assert!(!cell.is_clear_to_move(t, false, false, None, ZoneKind::Normal, &terrain));
        assert!(cell.is_clear_to_move(t, true, false, None, ZoneKind::Normal, &terrain));

        cell.occupy_up(soldier, ObjectKind::Infantry);
        assert!(cell.occupancy().is_empty());
        assert!(cell.occupiers().is_empty());
    }

    #[test]
    fn test_zone_filter() {
        let terrain = terrain();
        let mut cell = cell_with(0, 0, None);
        cell.set_zone(ZoneKind::Normal, 3);
        let t = SpeedType::Track;
        assert!(cell.is_clear_to_move(t, true, true, Some(3), ZoneKind::Normal, &terrain));
        assert!(!cell.is_clear_to_move(t, true, true, Some(4), ZoneKind::Normal, &terrain));
    }

    #[test]
    fn test_ore_growth_limits() {
        let rules = MapRules::default();
        let mut cell = cell_with(0, 0, Some(OverlayType::Gold1));
        cell.overlay_frame = 10;
        assert!(cell.can_ore_grow(&rules));
        assert!(cell.can_ore_spread(&rules));
        assert!(cell.grow_ore());
        assert!(!cell.can_ore_grow(&rules));
        assert!(!cell.grow_ore());

        let gems = cell_with(0, 0, Some(OverlayType::Gems1));
        assert!(!gems.can_ore_grow(&rules));
    }

    #[test]
    fn test_ore_adjust_values() {
        let rules = MapRules::default();
        let mut gold = cell_with(0, 0, Some(OverlayType::Gold2));
        assert_eq!(gold.ore_adjust(8, &rules), 12 * 25);
        assert_eq!(gold.overlay_frame(), 11);
        assert_eq!(gold.ore_adjust(0, &rules), 25);

        let mut gems = cell_with(0, 0, Some(OverlayType::Gems1));
        assert_eq!(gems.ore_adjust(4, &rules), 2 * 50 * 3);

        let mut clear = cell_with(0, 0, None);
        assert_eq!(clear.ore_adjust(8, &rules), 0);
    }

    #[test]
    fn test_overlapper_slots_fill_up() {
        let mut pool = ObjectPool::new();
        let mut cell = Cell::default();
        let ids: Vec<_> = (0..=OVERLAPPER_SLOTS)
            .map(|_| pool.insert(MapObject::new(ObjectKind::Vehicle, HouseId(0), Coord::default())))
            .collect();
        for id in &ids[..OVERLAPPER_SLOTS] {
            assert!(cell.overlap_down(*id));
        }
        assert!(!cell.overlap_down(ids[OVERLAPPER_SLOTS]));
        cell.overlap_up(ids[0]);
        assert!(cell.overlap_down(ids[OVERLAPPER_SLOTS]));
        assert_eq!(cell.overlappers().count(), OVERLAPPER_SLOTS);
    }

    #[test]
    fn test_jam_bits() {
        let mut cell = Cell::default();
        cell.jam(HouseId(2));
        assert!(cell.is_jammed_by(HouseId(2)));
        assert!(!cell.is_jammed_by(HouseId(3)));
        cell.unjam(HouseId(2));
        assert!(!cell.is_jammed());
    }
}
