//! Error types for the map tools.

use std::path::PathBuf;

use map_core::error::MapError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by tool commands.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be opened or read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A file could not be created or written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The map layer rejected the payload or data file.
    #[error(transparent)]
    Map(#[from] MapError),

    /// A report could not be rendered.
    #[error("Failed to render report: {0}")]
    Render(String),
}
