//! Byte codecs for map payloads.
//!
//! - [`lcw`] - the Westwood "format 80" LZ-style compressor
//! - [`blocks`] - length-prefixed block framing around [`lcw`]

pub mod blocks;
pub mod lcw;

pub use blocks::{BlockReader, BlockWriter, BLOCK_SIZE};
