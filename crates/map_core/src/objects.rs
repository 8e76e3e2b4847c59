//! Map objects as seen by the grid.
//!
//! The grid does not own game objects; it only records which objects sit
//! on or overlap each cell. Objects live in an [`ObjectPool`] arena and are
//! referred to by generational [`ObjectId`] handles, so a stale handle left
//! in a cell is detectable instead of dangling.

use serde::{Deserialize, Serialize};

use crate::coord::{CellOffset, Coord};
use crate::session::HouseId;

/// Generational handle into an [`ObjectPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Closed set of object categories the grid distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Structure.
    Building,
    /// Ground vehicle.
    Vehicle,
    /// Foot soldier.
    Infantry,
    /// Naval unit.
    Vessel,
    /// Aircraft.
    Aircraft,
    /// Trees and other terrain objects.
    Terrain,
}

impl ObjectKind {
    /// Whether objects of this kind are owned, controllable units or structures.
    #[must_use]
    pub const fn is_techno(self) -> bool {
        !matches!(self, Self::Terrain)
    }
}

/// Render/collision layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    /// Below ground (tunnels, submerged).
    Underground,
    /// On the ground.
    #[default]
    Ground,
    /// In the air.
    Air,
    /// Above everything else.
    Top,
}

/// Cells an object occupies and overlaps, relative to its origin cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Footprint {
    /// Cells the object occupies.
    pub occupy: Vec<CellOffset>,
    /// Cells the object covers visually without occupying.
    pub overlap: Vec<CellOffset>,
}

impl Footprint {
    /// A single-cell footprint.
    #[must_use]
    pub fn single() -> Self {
        Self {
            occupy: vec![CellOffset::ORIGIN],
            overlap: Vec::new(),
        }
    }

    /// A filled `width` x `height` rectangle with an optional row of
    /// overlap cells above it.
    #[must_use]
    pub fn rectangle(width: i8, height: i8, overlap_above: bool) -> Self {
        let occupy = (0..height)
            .flat_map(|dy| (0..width).map(move |dx| CellOffset::new(dx, dy)))
            .collect();
        let overlap = if overlap_above {
            (0..width).map(|dx| CellOffset::new(dx, -1)).collect()
        } else {
            Vec::new()
        };
        Self { occupy, overlap }
    }
}

/// The capabilities of a game object the grid consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapObject {
    /// Object category.
    pub kind: ObjectKind,
    /// Owning house.
    pub owner: HouseId,
    /// Last known position in leptons.
    pub coord: Coord,
    /// Layer the object lives on.
    pub layer: Layer,
    /// Removed from the map but still alive (in transports, being built).
    pub in_limbo: bool,
    /// Currently cloaked.
    pub cloaked: bool,
    /// Sight range in cells.
    pub sight: u8,
    /// Occupy and overlap offsets.
    pub footprint: Footprint,
    /// Whether the footprint is placed through the multi-cell path.
    pub multi_cell: bool,
}

impl MapObject {
    /// A single-cell ground object.
    #[must_use]
    pub fn new(kind: ObjectKind, owner: HouseId, coord: Coord) -> Self {
        Self {
            kind,
            owner,
            coord,
            layer: Layer::Ground,
            in_limbo: false,
            cloaked: false,
            sight: 0,
            footprint: Footprint::single(),
            multi_cell: false,
        }
    }

    /// A building with a rectangular footprint.
    #[must_use]
    pub fn building(owner: HouseId, coord: Coord, width: i8, height: i8) -> Self {
        Self {
            footprint: Footprint::rectangle(width, height, true),
            multi_cell: true,
            sight: 2,
            ..Self::new(ObjectKind::Building, owner, coord)
        }
    }

    /// Set the sight range.
    #[must_use]
    pub fn with_sight(mut self, sight: u8) -> Self {
        self.sight = sight;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    object: Option<MapObject>,
}

/// Arena of map objects addressed by generational handles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ObjectPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object and return its handle. Freed slots are reused first.
    pub fn insert(&mut self, object: MapObject) -> ObjectId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            return ObjectId {
                index,
                generation: slot.generation,
            };
        }
        #[allow(clippy::cast_possible_truncation)] // handles are u32 by contract
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectId {
            index,
            generation: 0,
        }
    }

    /// Remove an object. Its slot's generation advances so old handles stop resolving.
    pub fn remove(&mut self, id: ObjectId) -> Option<MapObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(object)
    }

    /// Resolve a handle.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&MapObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    /// Resolve a handle mutably.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut MapObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Whether a handle resolves.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live objects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the pool holds no objects.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &MapObject)> {
        (0u32..).zip(&self.slots).filter_map(|(index, slot)| {
            slot.object.as_ref().map(|object| {
                (
                    ObjectId {
                        index,
                        generation: slot.generation,
                    },
                    object,
                )
            })
        })
    }
}
