//! # Map Core
//!
//! Deterministic map and cell simulation for a classic tile-based RTS.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No audio
//! - No system randomness (every random draw goes through [`random::RandomSource`])
//!
//! Session state, house alliances and the object pool are passed in
//! explicitly, so a grid can be driven headless and replayed bit for bit.
//!
//! ## Crate Structure
//!
//! - [`coord`] - cell indices, lepton coordinates, grid and region sizes
//! - [`radius`] - precomputed sight disks
//! - [`cell`] - a single tile and its derived attributes
//! - [`map`] - the grid and every grid-wide operation
//! - [`zone`] - movement-zone flood fill
//! - [`codec`] - LCW compression and block framing
//! - [`data`] - terrain templates, overlays and ground speeds
//! - [`config`] - tunable rules

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod cell;
pub mod codec;
pub mod config;
pub mod coord;
pub mod data;
pub mod error;
pub mod map;
pub mod math;
pub mod objects;
pub mod radius;
pub mod random;
pub mod session;
pub mod zone;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cell::{Cell, Occupancy};
    pub use crate::config::MapRules;
    pub use crate::coord::{
        distance, CellIndex, CellOffset, Coord, Facing, GridSize, MapRegion, LEPTONS_PER_CELL,
        MAP_MAX_AREA,
    };
    pub use crate::data::{
        LandType, OreKind, OverlayType, SmudgeType, SpeedType, TemplateCatalog, TemplateId,
        TerrainData,
    };
    pub use crate::error::{MapError, Result};
    pub use crate::map::{BinaryLayout, CrateSlot, MapGrid, MapTickEvents};
    pub use crate::math::Fixed;
    pub use crate::objects::{Footprint, Layer, MapObject, ObjectId, ObjectKind, ObjectPool};
    pub use crate::random::{RandomSource, ScenarioRandom};
    pub use crate::session::{GameMode, HouseId, Houses, Session};
    pub use crate::zone::{ZoneKind, ZoneMask};
}
