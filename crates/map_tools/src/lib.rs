//! # Map Development Tools
//!
//! Command-line helpers for binary map payloads:
//! - Validation against a template catalog
//! - Conversion from any readable layout to the current one
//! - Zone and template usage reports
//!
//! The `map-tools` binary is a thin clap front end over [`commands`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod commands;
pub mod error;
pub mod report;

pub use commands::LoadOptions;
pub use error::{Result, ToolError};
pub use report::OutputFormat;
