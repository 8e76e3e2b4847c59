//! Binary terrain layouts.
//!
//! Only template and icon per cell are stored. The current layout is
//! block-compressed with every template (`u16`, little-endian) followed by
//! every icon (`u8`). Older layouts are still readable:
//!
//! | Layout | Compressed | Content |
//! |---|---|---|
//! | [`BinaryLayout::LegacySparse`] | no | `(x, y, template, icon)` byte records until EOF, partial tail dropped |
//! | [`BinaryLayout::LegacyDense`] | no | 64x64 `(template, icon)` byte pairs |
//! | [`BinaryLayout::PackedInterleavedV1`] / `V2` | yes | `(u16 template, u8 icon)` per cell |
//! | [`BinaryLayout::Packed`] | yes | all templates, then all icons |

use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::MapGrid;
use crate::codec::{BlockReader, BlockWriter};
use crate::coord::{LEGACY_MAP_HEIGHT, LEGACY_MAP_WIDTH};
use crate::data::TemplateId;
use crate::error::{MapError, Result};

/// Byte that marks a blank cell in the byte-wide legacy layouts.
const LEGACY_NONE: u8 = 0xFF;

/// Bytes per legacy sparse record.
const SPARSE_RECORD_LEN: usize = 4;

/// On-disk terrain layout, selected by the scenario's format tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryLayout {
    /// Only non-blank cells, as `(x, y, template, icon)` records.
    LegacySparse,
    /// A fixed 64x64 grid of `(template, icon)` byte pairs.
    LegacyDense,
    /// Compressed `(template, icon)` per cell, first revision.
    PackedInterleavedV1,
    /// Compressed `(template, icon)` per cell, second revision.
    PackedInterleavedV2,
    /// Compressed templates then icons. Written by [`MapGrid::write_binary`].
    Packed,
    /// A format tag this build does not know.
    Unknown(u8),
}

impl BinaryLayout {
    /// Layout for a scenario's `format` and binary `version` tags.
    ///
    /// Format 0 covers both legacy layouts: version 0 is dense, anything
    /// else is sparse.
    #[must_use]
    pub const fn from_tags(format: u8, binary_version: u8) -> Self {
        match format {
            0 if binary_version == 0 => Self::LegacyDense,
            0 => Self::LegacySparse,
            1 => Self::PackedInterleavedV1,
            2 => Self::PackedInterleavedV2,
            3 => Self::Packed,
            other => Self::Unknown(other),
        }
    }
}

impl MapGrid {
    /// Write every cell's template and icon in the current layout.
    ///
    /// Returns the number of bytes written to `sink`.
    pub fn write_binary<W: Write>(&self, sink: W) -> Result<usize> {
        let mut writer = BlockWriter::new(sink);
        let templates: Vec<u8> = self
            .cells
            .iter()
            .flat_map(|cell| cell.template().0.to_le_bytes())
            .collect();
        writer.write_all(&templates)?;
        let icons: Vec<u8> = self.cells.iter().map(|cell| cell.icon()).collect();
        writer.write_all(&icons)?;
        let (_, written) = writer.finish()?;
        info!(cells = self.cells.len(), bytes = written, "Map terrain written");
        Ok(written)
    }

    /// Read templates and icons in `layout`, refreshing each written cell.
    ///
    /// Payloads are fully decoded before the grid is touched, so a
    /// truncated or corrupt stream leaves the grid unchanged. An unknown
    /// layout is logged and ignored.
    pub fn read_binary<R: Read>(&mut self, layout: BinaryLayout, mut source: R) -> Result<()> {
        let area = self.size.area();
        match layout {
            BinaryLayout::LegacySparse => {
                let mut payload = Vec::new();
                source.read_to_end(&mut payload)?;
                let partial = payload.len() % SPARSE_RECORD_LEN;
                if partial > 0 {
                    warn!(partial, "Partial trailing sparse record dropped");
                }
                self.blank_terrain();
                let mut skipped = 0;
                for record in payload.chunks_exact(SPARSE_RECORD_LEN) {
                    match self.size.cell_at(i32::from(record[0]), i32::from(record[1])) {
                        Some(cell) => self.write_legacy_cell(cell, record[2], record[3]),
                        None => skipped += 1,
                    }
                }
                if skipped > 0 {
                    warn!(skipped, "Sparse records outside the grid ignored");
                }
            }
            BinaryLayout::LegacyDense => {
                let expected = usize::from(LEGACY_MAP_WIDTH) * usize::from(LEGACY_MAP_HEIGHT) * 2;
                let mut payload = Vec::with_capacity(expected);
                let limit = u64::from(LEGACY_MAP_WIDTH) * u64::from(LEGACY_MAP_HEIGHT) * 2;
                source.by_ref().take(limit).read_to_end(&mut payload)?;
                if payload.len() < expected {
                    return Err(MapError::Truncated {
                        expected,
                        actual: payload.len(),
                    });
                }
                self.blank_terrain();
                let legacy_xy = (0..LEGACY_MAP_HEIGHT)
                    .flat_map(|y| (0..LEGACY_MAP_WIDTH).map(move |x| (x, y)));
                for ((x, y), pair) in legacy_xy.zip(payload.chunks_exact(2)) {
                    if let Some(cell) = self.size.cell_at(i32::from(x), i32::from(y)) {
                        self.write_legacy_cell(cell, pair[0], pair[1]);
                    }
                }
            }
            BinaryLayout::PackedInterleavedV1 | BinaryLayout::PackedInterleavedV2 => {
                let payload = BlockReader::new(source).read_payload(area * 3)?;
                for (cell, entry) in payload.chunks_exact(3).enumerate() {
                    let template = TemplateId(u16::from_le_bytes([entry[0], entry[1]]));
                    self.write_packed_cell(cell, template, entry[2]);
                }
            }
            BinaryLayout::Packed => {
                let payload = BlockReader::new(source).read_payload(area * 3)?;
                let (templates, icons) = payload.split_at(area * 2);
                for (cell, (template, &icon)) in templates.chunks_exact(2).zip(icons).enumerate() {
                    let template = TemplateId(u16::from_le_bytes([template[0], template[1]]));
                    self.write_packed_cell(cell, template, icon);
                }
            }
            BinaryLayout::Unknown(tag) => {
                warn!(tag, "Unknown map binary format, nothing read");
                return Ok(());
            }
        }
        info!(?layout, cells = area, "Map terrain read");
        Ok(())
    }

    fn blank_terrain(&mut self) {
        let terrain = Arc::clone(&self.terrain);
        for cell in &mut self.cells {
            cell.template = TemplateId::NONE;
            cell.icon = 0;
            cell.recalc_attributes(&terrain);
        }
    }

    fn write_legacy_cell(&mut self, cell: usize, template: u8, icon: u8) {
        if template == LEGACY_NONE || icon == LEGACY_NONE {
            self.set_template(cell, TemplateId::NONE, 0);
        } else {
            self.set_template(cell, TemplateId(u16::from(template)), icon);
        }
    }

    fn write_packed_cell(&mut self, cell: usize, template: TemplateId, icon: u8) {
        if template.is_none() {
            self.set_template(cell, TemplateId::NONE, 0);
        } else {
            self.set_template(cell, template, icon);
        }
    }
}
