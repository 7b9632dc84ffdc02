#![forbid(unsafe_code)]
//! Streaming TMX to CSV conversion for Rust.
//!
//! Converts multilingual translation-memory (TMX) documents into CSV with
//! configurable per-column text cleaning, holding one translation unit in
//! memory at a time regardless of input size. Malformed units are skipped
//! with recorded reasons; a single bad record never aborts a conversion.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tmx2csv::{ColumnSpec, ConversionOptions, convert_file};
//!
//! let options = ConversionOptions::new(vec![
//!     ColumnSpec::language("English", "en"),
//!     ColumnSpec::language("French", "fr"),
//! ]);
//! let summary = convert_file("memory.tmx", "memory.csv", &options)?;
//! println!(
//!     "read {}, skipped {}, wrote {}",
//!     summary.units_read, summary.units_skipped, summary.rows_written
//! );
//! # Ok::<(), tmx2csv::Error>(())
//! ```
//!
//! # Pipeline
//!
//! - [`TmxReader`]: incremental reader yielding one unit per `<tu>`
//! - [`ColumnSpec`] + [`project`]: declarative selection of languages and
//!   metadata attributes into ordered output columns
//! - [`CleanOptions`] + [`clean`]: fixed-order, flag-gated text cleaning
//! - [`RowWriter`]: per-row-flushed, correctly escaped CSV output
//! - [`convert`] / [`convert_file`]: the driving loop with skip accounting
//!   and cooperative cancellation
//!
//! The final [`ConversionSummary`] is the reporting surface; the library
//! itself does no logging.

pub mod cleaner;
pub mod columns;
pub mod converter;
pub mod error;
pub mod reader;
pub mod tsv;
pub mod types;
pub mod writer;

// Re-export most used items for easy consumption
pub use crate::{
    cleaner::{CleanOptions, clean, clean_text_file},
    columns::{ColumnSpec, Selector, column_specs_from_json, project, validate_column_specs},
    converter::{ConversionOptions, convert, convert_file},
    error::Error,
    reader::TmxReader,
    tsv::tsv_to_csv,
    types::{ConversionSummary, Skip, SkipReason, TranslationUnit, UnitOutcome, Variant},
    writer::{DEFAULT_DELIMITER, RowWriter},
};
