//! Terrain template catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ground_data::LandType;
use crate::error::{MapError, Result};

/// Terrain template identifier as stored in cells and map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u16);

impl TemplateId {
    /// The "no template" sentinel.
    pub const NONE: Self = Self(0xFFFF);

    /// Plain clear ground.
    pub const CLEAR: Self = Self(0);

    /// Whether this is the "no template" sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::NONE
    }
}

/// One terrain template: a rectangle of icons with a land type per icon.
///
/// # Example RON
///
/// ```ron
/// TemplateData(
///     id: 97,
///     name: "B1",
///     width: 2,
///     height: 1,
///     icons: [Some(Rock), Some(Rock)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateData {
    /// Template id used in map files.
    pub id: u16,
    /// Short asset name.
    pub name: String,
    /// Width in icons.
    pub width: u8,
    /// Height in icons.
    pub height: u8,
    /// Land type of each icon in row-major order, `None` where the icon is absent.
    pub icons: Vec<Option<LandType>>,
    /// Icon showing the intact span when this is a bridge template.
    #[serde(default)]
    pub intact_bridge_icon: Option<u8>,
}

impl TemplateData {
    /// Number of icon slots in the rectangle.
    #[must_use]
    pub fn icon_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Whether the icon index is inside the rectangle and actually present.
    #[must_use]
    pub fn has_icon(&self, icon: u8) -> bool {
        usize::from(icon) < self.icon_count() && self.land(icon).is_some()
    }

    /// Land type for an icon, if present.
    #[must_use]
    pub fn land(&self, icon: u8) -> Option<LandType> {
        self.icons.get(usize::from(icon)).copied().flatten()
    }

    /// Whether this template is a bridge showing its intact span at `icon`.
    #[must_use]
    pub fn is_intact_bridge(&self, icon: u8) -> bool {
        self.intact_bridge_icon == Some(icon)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    templates: Vec<TemplateData>,
}

/// Lookup table of terrain templates by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: BTreeMap<u16, TemplateData>,
}

impl TemplateCatalog {
    /// Build a catalog, rejecting duplicate ids and malformed icon tables.
    pub fn from_templates(templates: Vec<TemplateData>, source_name: &str) -> Result<Self> {
        let mut map = BTreeMap::new();
        for template in templates {
            if TemplateId(template.id).is_none() {
                return Err(invalid(source_name, "template id 0xFFFF is reserved".into()));
            }
            if template.icons.len() != template.icon_count() {
                return Err(invalid(
                    source_name,
                    format!(
                        "template {} has {} icons for a {}x{} rectangle",
                        template.name,
                        template.icons.len(),
                        template.width,
                        template.height
                    ),
                ));
            }
            let id = template.id;
            if map.insert(id, template).is_some() {
                return Err(invalid(source_name, format!("duplicate template id {id}")));
            }
        }
        Ok(Self { templates: map })
    }

    /// Parse a catalog from RON text of the form `(templates: [ ... ])`.
    pub fn from_ron_str(text: &str, source_name: &str) -> Result<Self> {
        let file: CatalogFile =
            ron::from_str(text).map_err(|e| invalid(source_name, e.to_string()))?;
        Self::from_templates(file.templates, source_name)
    }

    /// Template for an id.
    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&TemplateData> {
        self.templates.get(&id.0)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate templates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateData> {
        self.templates.values()
    }

    /// A small built-in catalog with the classic ids for clear ground, water,
    /// shore, boulders, rough patches, rivers, bridges and roads.
    #[must_use]
    pub fn classic() -> Self {
        use LandType::{Beach, Clear, River, Road, Rock, Rough, Water};

        let entry = |id: u16, name: &str, width: u8, height: u8, icons: Vec<Option<LandType>>| {
            TemplateData {
                id,
                name: name.to_string(),
                width,
                height,
                icons,
                intact_bridge_icon: None,
            }
        };
        let all = |land: LandType, count: usize| vec![Some(land); count];
        let bridge = |id: u16, name: &str, intact: Option<u8>| TemplateData {
            intact_bridge_icon: intact,
            ..entry(
                id,
                name,
                3,
                3,
                vec![
                    Some(Beach),
                    Some(Road),
                    Some(Beach),
                    Some(River),
                    Some(if intact.is_some() { Road } else { River }),
                    Some(River),
                    Some(Road),
                    Some(Road),
                    None,
                ],
            )
        };

        let templates = vec![
            entry(0, "CLEAR1", 4, 4, all(Clear, 16)),
            entry(1, "W1", 1, 1, all(Water, 1)),
            entry(2, "W2", 2, 2, all(Water, 4)),
            entry(
                3,
                "SH01",
                4,
                3,
                vec![
                    Some(Water),
                    Some(Water),
                    Some(Water),
                    Some(Water),
                    Some(Beach),
                    Some(Beach),
                    Some(Water),
                    Some(Beach),
                    Some(Clear),
                    Some(Beach),
                    Some(Beach),
                    None,
                ],
            ),
            entry(97, "B1", 2, 1, all(Rock, 2)),
            entry(98, "B2", 2, 2, vec![Some(Rock), Some(Rock), None, Some(Rock)]),
            entry(103, "P01", 3, 2, all(Rough, 6)),
            entry(
                112,
                "RV01",
                3,
                3,
                vec![
                    Some(Beach),
                    Some(River),
                    None,
                    Some(River),
                    Some(River),
                    Some(River),
                    None,
                    Some(River),
                    Some(Beach),
                ],
            ),
            bridge(131, "BR1A", Some(6)),
            bridge(132, "BR1B", None),
            bridge(133, "BR2A", Some(6)),
            bridge(134, "BR2B", None),
            entry(173, "D01", 2, 2, all(Road, 4)),
            bridge(378, "BR1H", Some(6)),
            bridge(379, "BR2H", Some(6)),
        ];

        let templates = templates.into_iter().map(|t| (t.id, t)).collect();
        Self { templates }
    }
}

fn invalid(source_name: &str, message: String) -> MapError {
    MapError::InvalidData {
        source_name: source_name.to_string(),
        message,
    }
}
