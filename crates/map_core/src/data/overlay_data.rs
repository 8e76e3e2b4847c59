//! Overlay and smudge kinds.
//!
//! Overlays sit on top of the terrain template: walls, ore, crates and
//! decorations. Smudges are purely cosmetic craters, scorch marks and
//! building bibs.

use serde::{Deserialize, Serialize};

use super::ground_data::LandType;

/// Which ore resource an overlay represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OreKind {
    /// Gold ore, grows and spreads.
    Gold,
    /// Gems, static.
    Gem,
}

impl OreKind {
    /// Highest overlay frame for this ore kind.
    #[must_use]
    pub const fn max_frame(self) -> u8 {
        match self {
            Self::Gold => 11,
            Self::Gem => 2,
        }
    }
}

/// Overlay kinds in classic table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayType {
    /// Sandbag wall.
    Sandbag,
    /// Chain-link fence.
    Cyclone,
    /// Concrete wall.
    Brick,
    /// Barbed wire.
    Barbwire,
    /// Wooden fence.
    Wood,
    /// Gold ore, first variant.
    Gold1,
    /// Gold ore, second variant.
    Gold2,
    /// Gold ore, third variant.
    Gold3,
    /// Gold ore, fourth variant.
    Gold4,
    /// Gems, first variant.
    Gems1,
    /// Gems, second variant.
    Gems2,
    /// Gems, third variant.
    Gems3,
    /// Gems, fourth variant.
    Gems4,
    /// Haystacks.
    V12,
    /// Haystack.
    V13,
    /// Wheat field.
    V14,
    /// Fallow field.
    V15,
    /// Corn field.
    V16,
    /// Celery field.
    V17,
    /// Potato field.
    V18,
    /// Capture-the-flag spot.
    FlagSpot,
    /// Wooden crate.
    WoodCrate,
    /// Steel crate.
    SteelCrate,
    /// Barbed wire fence.
    Fence,
    /// Floating crate.
    WaterCrate,
}

impl OverlayType {
    /// Number of overlay kinds.
    pub const COUNT: usize = 25;

    /// All overlay kinds in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Sandbag,
        Self::Cyclone,
        Self::Brick,
        Self::Barbwire,
        Self::Wood,
        Self::Gold1,
        Self::Gold2,
        Self::Gold3,
        Self::Gold4,
        Self::Gems1,
        Self::Gems2,
        Self::Gems3,
        Self::Gems4,
        Self::V12,
        Self::V13,
        Self::V14,
        Self::V15,
        Self::V16,
        Self::V17,
        Self::V18,
        Self::FlagSpot,
        Self::WoodCrate,
        Self::SteelCrate,
        Self::Fence,
        Self::WaterCrate,
    ];

    /// Overlay for a raw index.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Whether this overlay is a wall segment.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(
            self,
            Self::Sandbag | Self::Cyclone | Self::Brick | Self::Barbwire | Self::Wood | Self::Fence
        )
    }

    /// Whether heavy tracked units can drive over this overlay.
    #[must_use]
    pub const fn is_crushable(self) -> bool {
        matches!(
            self,
            Self::Sandbag | Self::Cyclone | Self::Barbwire | Self::Wood | Self::Fence
        )
    }

    /// Whether this overlay is a bonus crate.
    #[must_use]
    pub const fn is_crate(self) -> bool {
        matches!(self, Self::WoodCrate | Self::SteelCrate | Self::WaterCrate)
    }

    /// Ore kind, if this is an ore overlay.
    #[must_use]
    pub const fn ore_kind(self) -> Option<OreKind> {
        match self {
            Self::Gold1 | Self::Gold2 | Self::Gold3 | Self::Gold4 => Some(OreKind::Gold),
            Self::Gems1 | Self::Gems2 | Self::Gems3 | Self::Gems4 => Some(OreKind::Gem),
            _ => None,
        }
    }

    /// Land type this overlay forces on its cell, if any.
    #[must_use]
    pub const fn land(self) -> Option<LandType> {
        if self.is_wall() {
            Some(LandType::Wall)
        } else if self.ore_kind().is_some() {
            Some(LandType::Ore)
        } else {
            None
        }
    }
}

/// Smudge kinds in classic table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmudgeType {
    /// Crater 1.
    Crater1,
    /// Crater 2.
    Crater2,
    /// Crater 3.
    Crater3,
    /// Crater 4.
    Crater4,
    /// Crater 5.
    Crater5,
    /// Crater 6.
    Crater6,
    /// Scorch mark 1.
    Scorch1,
    /// Scorch mark 2.
    Scorch2,
    /// Scorch mark 3.
    Scorch3,
    /// Scorch mark 4.
    Scorch4,
    /// Scorch mark 5.
    Scorch5,
    /// Scorch mark 6.
    Scorch6,
    /// Building bib 1.
    Bib1,
    /// Building bib 2.
    Bib2,
    /// Building bib 3.
    Bib3,
}

impl SmudgeType {
    /// Number of smudge kinds.
    pub const COUNT: usize = 15;

    /// Whether this smudge is a building foundation.
    #[must_use]
    pub const fn is_bib(self) -> bool {
        matches!(self, Self::Bib1 | Self::Bib2 | Self::Bib3)
    }
}
