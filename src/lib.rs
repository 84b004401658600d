//! Thin wrapper around poppler's `pdftohtml`.
//!
//! A [`Converter`] turns a closed set of [`ConversionOptions`] into flags,
//! runs the executable on one PDF at a time and can clean up the output
//! directory afterwards. All conversion work happens in the external tool.

pub mod cleanup;
pub mod config;
pub mod converter;
pub mod error;
pub mod options;

pub use cleanup::CleanupReport;
pub use config::Config;
pub use converter::{Conversion, Converter};
pub use error::{Error, Result};
pub use options::{ConversionOptions, OptionKey, Setting};
