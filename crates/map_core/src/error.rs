//! Error types for the map simulation layer.
//!
//! Grid operations themselves never fail: out-of-range input is ignored and
//! exhausted pools are reported through `bool` returns. Errors only arise at
//! the byte-stream and data-file boundaries.

use thiserror::Error;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Top-level error type for map loading, saving and configuration.
#[derive(Debug, Error)]
pub enum MapError {
    /// Underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A compressed block could not be decoded.
    #[error("Corrupt compressed block: {0}")]
    CorruptBlock(String),

    /// The payload ended before the layout was fully read.
    #[error("Truncated map payload: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the layout requires.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Grid dimensions are unusable.
    #[error("Invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width in cells.
        width: u16,
        /// Requested height in cells.
        height: u16,
    },

    /// Rules or catalog data failed to parse or validate.
    #[error("Invalid data in '{source_name}': {message}")]
    InvalidData {
        /// File name or label of the data source.
        source_name: String,
        /// What was wrong with it.
        message: String,
    },

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
