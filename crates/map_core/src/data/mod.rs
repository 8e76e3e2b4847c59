//! Static terrain data.
//!
//! Land speeds, terrain templates, overlays and smudges. All of it is
//! plain data; catalogs come with a built-in classic table and can also be
//! parsed from RON text. Reading files is left to callers.

mod ground_data;
mod overlay_data;
mod template_data;

pub use ground_data::{GroundData, GroundTable, LandType, SpeedType};
pub use overlay_data::{OreKind, OverlayType, SmudgeType};
pub use template_data::{TemplateCatalog, TemplateData, TemplateId};

/// Terrain tables a map grid consults when deriving cell attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainData {
    /// Terrain templates by id.
    pub templates: TemplateCatalog,
    /// Ground speeds by land type.
    pub ground: GroundTable,
}

impl TerrainData {
    /// Classic templates and speeds.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            templates: TemplateCatalog::classic(),
            ground: GroundTable::classic(),
        }
    }

    /// Land type shown by a template icon, or `None` when absent.
    #[must_use]
    pub fn template_land(&self, template: TemplateId, icon: u8) -> Option<LandType> {
        self.templates.get(template)?.land(icon)
    }
}

impl Default for TerrainData {
    fn default() -> Self {
        Self::classic()
    }
}
