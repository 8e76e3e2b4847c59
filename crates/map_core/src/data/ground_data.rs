//! Land types and their per-movement speed multipliers.

use serde::{Deserialize, Serialize};

use crate::math::{percent, percent_serde, Fixed};

/// Terrain category derived for each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LandType {
    /// Open ground.
    #[default]
    Clear,
    /// Paved road.
    Road,
    /// Deep water.
    Water,
    /// Impassable rock.
    Rock,
    /// Wall overlay.
    Wall,
    /// Ore field.
    Ore,
    /// Sand at the shoreline.
    Beach,
    /// Broken ground.
    Rough,
    /// River water.
    River,
}

impl LandType {
    /// Number of land types.
    pub const COUNT: usize = 9;

    /// All land types in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Clear,
        Self::Road,
        Self::Water,
        Self::Rock,
        Self::Wall,
        Self::Ore,
        Self::Beach,
        Self::Rough,
        Self::River,
    ];

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Movement capability used for passability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedType {
    /// Infantry.
    Foot,
    /// Tracked vehicles.
    Track,
    /// Wheeled vehicles.
    Wheel,
    /// Aircraft.
    Winged,
    /// Naval vessels.
    Float,
}

/// Speed multipliers and build rules for one land type.
///
/// # Example RON
///
/// ```ron
/// GroundData(
///     land: Beach,
///     foot: 80,
///     track: 70,
///     wheel: 40,
///     winged: 100,
///     float: 0,
///     buildable: false,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundData {
    /// Land type this entry describes.
    pub land: LandType,
    /// Infantry speed, as a percentage in data files.
    #[serde(with = "percent_serde")]
    pub foot: Fixed,
    /// Tracked vehicle speed.
    #[serde(with = "percent_serde")]
    pub track: Fixed,
    /// Wheeled vehicle speed.
    #[serde(with = "percent_serde")]
    pub wheel: Fixed,
    /// Aircraft speed.
    #[serde(with = "percent_serde")]
    pub winged: Fixed,
    /// Vessel speed.
    #[serde(with = "percent_serde")]
    pub float: Fixed,
    /// Whether structures may be placed on this land.
    #[serde(default)]
    pub buildable: bool,
}

impl GroundData {
    fn classic(land: LandType, speeds: [u32; 5], buildable: bool) -> Self {
        Self {
            land,
            foot: percent(speeds[0]),
            track: percent(speeds[1]),
            wheel: percent(speeds[2]),
            winged: percent(speeds[3]),
            float: percent(speeds[4]),
            buildable,
        }
    }

    /// Speed multiplier for a movement type.
    #[must_use]
    pub fn speed(&self, speed: SpeedType) -> Fixed {
        match speed {
            SpeedType::Foot => self.foot,
            SpeedType::Track => self.track,
            SpeedType::Wheel => self.wheel,
            SpeedType::Winged => self.winged,
            SpeedType::Float => self.float,
        }
    }
}

/// Ground table indexed by [`LandType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTable {
    entries: Vec<GroundData>,
}

impl GroundTable {
    /// Classic speed table.
    #[must_use]
    pub fn classic() -> Self {
        use LandType::{Beach, Clear, Ore, River, Road, Rock, Rough, Wall, Water};
        Self {
            entries: vec![
                GroundData::classic(Clear, [90, 80, 60, 100, 0], true),
                GroundData::classic(Road, [100, 100, 100, 100, 0], true),
                GroundData::classic(Water, [0, 0, 0, 100, 100], false),
                GroundData::classic(Rock, [0, 0, 0, 100, 0], false),
                GroundData::classic(Wall, [0, 0, 0, 100, 0], false),
                GroundData::classic(Ore, [90, 70, 50, 100, 0], false),
                GroundData::classic(Beach, [80, 70, 40, 100, 0], false),
                GroundData::classic(Rough, [80, 70, 40, 100, 0], false),
                GroundData::classic(River, [0, 0, 0, 100, 0], false),
            ],
        }
    }

    /// Build a table from entries, one per land type in any order.
    ///
    /// Returns `None` unless every land type appears exactly once.
    #[must_use]
    pub fn from_entries(mut entries: Vec<GroundData>) -> Option<Self> {
        if entries.len() != LandType::COUNT {
            return None;
        }
        entries.sort_by_key(|entry| entry.land.index());
        let complete = entries
            .iter()
            .zip(LandType::ALL)
            .all(|(entry, land)| entry.land == land);
        complete.then_some(Self { entries })
    }

    /// Entry for a land type.
    #[must_use]
    pub fn get(&self, land: LandType) -> &GroundData {
        &self.entries[land.index()]
    }

    /// Whether a unit with this movement type can enter the land at all.
    #[must_use]
    pub fn is_passable(&self, land: LandType, speed: SpeedType) -> bool {
        self.get(land).speed(speed) > Fixed::ZERO
    }
}

impl Default for GroundTable {
    fn default() -> Self {
        Self::classic()
    }
}
