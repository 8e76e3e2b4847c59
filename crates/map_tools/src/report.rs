//! Command reports and their text, JSON and RON renderings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// How a report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty JSON.
    Json,
    /// Pretty RON.
    Ron,
}

/// Render any report in the requested format.
pub fn render<T>(report: &T, format: OutputFormat) -> Result<String>
where
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).map_err(|e| ToolError::Render(e.to_string()))
        }
        OutputFormat::Ron => ron::ser::to_string_pretty(report, ron::ser::PrettyConfig::default())
            .map_err(|e| ToolError::Render(e.to_string())),
    }
}

/// Outcome of `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Layout the payload was read as.
    pub layout: String,
    /// Cells in the grid.
    pub cells: usize,
    /// Cells with a template set.
    pub filled_cells: usize,
    /// Whether every cell passed validation.
    pub valid: bool,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "layout: {}", self.layout)?;
        writeln!(f, "cells:  {} ({} filled)", self.cells, self.filled_cells)?;
        write!(f, "result: {}", if self.valid { "valid" } else { "INVALID" })
    }
}

/// Outcome of `convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertReport {
    /// Layout the input was read as.
    pub from: String,
    /// Bytes read from the input file.
    pub bytes_in: u64,
    /// Bytes written to the output file.
    pub bytes_out: usize,
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "converted {} ({} bytes) to Packed ({} bytes)",
            self.from, self.bytes_in, self.bytes_out
        )
    }
}

/// Outcome of `zones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneReport {
    /// Grid width in cells.
    pub width: u16,
    /// Grid height in cells.
    pub height: u16,
    /// Zones found per zone kind.
    pub zones: BTreeMap<String, u16>,
    /// Cells left without a zone per zone kind.
    pub blocked_cells: BTreeMap<String, usize>,
}

impl fmt::Display for ZoneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid: {}x{}", self.width, self.height)?;
        for (kind, count) in &self.zones {
            let blocked = self.blocked_cells.get(kind).copied().unwrap_or(0);
            write!(f, "\n{kind:<20} {count:>5} zones {blocked:>6} blocked cells")?;
        }
        Ok(())
    }
}

/// Cells using one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUsage {
    /// Template id.
    pub id: u16,
    /// Catalog name, or `None` when the id is not in the catalog.
    pub name: Option<String>,
    /// Cells showing this template.
    pub cells: usize,
}

/// Outcome of `info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoReport {
    /// Grid width in cells.
    pub width: u16,
    /// Grid height in cells.
    pub height: u16,
    /// Cells with no template.
    pub blank_cells: usize,
    /// Usage per template id, in id order.
    pub templates: Vec<TemplateUsage>,
    /// Cells per derived land type.
    pub land: BTreeMap<String, usize>,
    /// Bridge cells showing their intact span.
    pub intact_bridges: usize,
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grid: {}x{}", self.width, self.height)?;
        writeln!(f, "blank cells: {}", self.blank_cells)?;
        writeln!(f, "intact bridges: {}", self.intact_bridges)?;
        write!(f, "templates:")?;
        for usage in &self.templates {
            let name = usage.name.as_deref().unwrap_or("<unknown>");
            write!(f, "\n  {:>5} {:<8} {:>6}", usage.id, name, usage.cells)?;
        }
        write!(f, "\nland:")?;
        for (land, cells) in &self.land {
            write!(f, "\n  {land:<8} {cells:>6}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> ZoneReport {
        ZoneReport {
            width: 16,
            height: 16,
            zones: BTreeMap::from([("Normal".to_string(), 2)]),
            blocked_cells: BTreeMap::from([("Normal".to_string(), 16)]),
        }
    }

    #[test]
    fn test_text_render() {
        let text = render(&zones(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("grid: 16x16"));
        assert!(text.contains("Normal"));
        assert!(text.contains("16 blocked cells"));
    }

    #[test]
    fn test_json_render_parses_back() {
        let json = render(&zones(), OutputFormat::Json).unwrap();
        let back: ZoneReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zones());
    }

    #[test]
    fn test_ron_render_parses_back() {
        let text = render(&zones(), OutputFormat::Ron).unwrap();
        let back: ZoneReport = ron::from_str(&text).unwrap();
        assert_eq!(back, zones());
    }

    #[test]
    fn test_validation_text() {
        let report = ValidationReport {
            layout: "Packed".into(),
            cells: 64,
            filled_cells: 3,
            valid: false,
        };
        let text = render(&report, OutputFormat::Text).unwrap();
        assert!(text.ends_with("INVALID"));
    }
}
