//! File-level commands behind each `map-tools` subcommand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use map_core::data::GroundTable;
use map_core::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::report::{ConvertReport, InfoReport, TemplateUsage, ValidationReport, ZoneReport};

/// How to interpret a payload file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Layout selected from the scenario's format tags.
    pub layout: BinaryLayout,
    /// Grid the payload is read into.
    pub size: GridSize,
    /// RON template catalog replacing the built-in one.
    pub templates: Option<PathBuf>,
}

impl LoadOptions {
    /// Options for a format/version tag pair on a grid of `width` x `height`.
    pub fn new(format: u8, binary_version: u8, width: u16, height: u16) -> Result<Self> {
        let size = GridSize::new(width, height).ok_or(MapError::InvalidDimensions { width, height })?;
        Ok(Self {
            layout: BinaryLayout::from_tags(format, binary_version),
            size,
            templates: None,
        })
    }

    /// Use a template catalog loaded from `path`.
    #[must_use]
    pub fn with_templates(mut self, path: impl Into<PathBuf>) -> Self {
        self.templates = Some(path.into());
        self
    }
}

/// Terrain tables for the options: the classic set, or a RON catalog with classic ground speeds.
pub fn load_terrain(options: &LoadOptions) -> Result<Arc<TerrainData>> {
    let Some(path) = &options.templates else {
        return Ok(Arc::new(TerrainData::classic()));
    };
    let text = std::fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.clone(),
        source,
    })?;
    let templates = TemplateCatalog::from_ron_str(&text, &path.display().to_string())?;
    info!(path = %path.display(), templates = templates.len(), "Loaded template catalog");
    Ok(Arc::new(TerrainData {
        templates,
        ground: GroundTable::classic(),
    }))
}

/// Read a payload file into a fresh grid.
pub fn load_grid(path: &Path, options: &LoadOptions) -> Result<MapGrid> {
    let terrain = load_terrain(options)?;
    let file = File::open(path).map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut map = MapGrid::new(options.size, MapRules::default(), terrain);
    map.read_binary(options.layout, BufReader::new(file))?;
    debug!(path = %path.display(), layout = ?options.layout, "Payload loaded");
    Ok(map)
}

fn filled_cells(map: &MapGrid) -> usize {
    map.cells().iter().filter(|c| !c.template().is_none()).count()
}

/// Load and validate a payload.
pub fn validate_file(path: &Path, options: &LoadOptions) -> Result<ValidationReport> {
    let map = load_grid(path, options)?;
    Ok(ValidationReport {
        layout: format!("{:?}", options.layout),
        cells: map.size().area(),
        filled_cells: filled_cells(&map),
        valid: map.validate(&ObjectPool::new()),
    })
}

/// Re-encode a payload in the current packed layout.
pub fn convert_file(input: &Path, output: &Path, options: &LoadOptions) -> Result<ConvertReport> {
    let bytes_in = std::fs::metadata(input)
        .map_err(|source| ToolError::Read {
            path: input.to_path_buf(),
            source,
        })?
        .len();
    let map = load_grid(input, options)?;

    let write_err = |source: std::io::Error| ToolError::Write {
        path: output.to_path_buf(),
        source,
    };
    let file = File::create(output).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let bytes_out = map.write_binary(&mut writer)?;
    writer.flush().map_err(write_err)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes_in,
        bytes_out,
        "Converted payload"
    );
    Ok(ConvertReport {
        from: format!("{:?}", options.layout),
        bytes_in,
        bytes_out,
    })
}

/// Recompute every zone kind and count zones.
pub fn zone_file(path: &Path, options: &LoadOptions) -> Result<ZoneReport> {
    let mut map = load_grid(path, options)?;
    let counts = map.zone_reset(ZoneMask::ALL);

    let mut zones = BTreeMap::new();
    let mut blocked_cells = BTreeMap::new();
    for kind in ZoneKind::ALL {
        let name = format!("{kind:?}");
        let blocked = map.cells().iter().filter(|c| c.zone(kind) == 0).count();
        zones.insert(name.clone(), counts[kind.index()]);
        blocked_cells.insert(name, blocked);
    }
    Ok(ZoneReport {
        width: map.size().width(),
        height: map.size().height(),
        zones,
        blocked_cells,
    })
}

/// Summarise template and land usage.
pub fn info_file(path: &Path, options: &LoadOptions) -> Result<InfoReport> {
    let map = load_grid(path, options)?;

    let mut usage: BTreeMap<TemplateId, usize> = BTreeMap::new();
    let mut land: BTreeMap<String, usize> = BTreeMap::new();
    let mut blank_cells = 0;
    for cell in map.cells() {
        if cell.template().is_none() {
            blank_cells += 1;
        } else {
            *usage.entry(cell.template()).or_default() += 1;
        }
        *land.entry(format!("{:?}", cell.land())).or_default() += 1;
    }

    let templates = usage
        .into_iter()
        .map(|(id, cells)| TemplateUsage {
            id: id.0,
            name: map.terrain().templates.get(id).map(|t| t.name.clone()),
            cells,
        })
        .collect();

    Ok(InfoReport {
        width: map.size().width(),
        height: map.size().height(),
        blank_cells,
        templates,
        land,
        intact_bridges: map.intact_bridge_count(),
    })
}
