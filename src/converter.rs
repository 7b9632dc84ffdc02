//! The conversion driver: pulls units, projects rows, writes them.
//!
//! One unit is in flight at a time. Per-unit failures are counted and
//! recorded, never fatal; the only mid-run fatal condition is a sink failure,
//! reported with the number of rows that were safely written first.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    columns::{ColumnSpec, project, validate_column_specs},
    error::Error,
    reader::TmxReader,
    types::{ConversionSummary, SkipReason, UnitOutcome},
    writer::{DEFAULT_DELIMITER, RowWriter},
};

/// Immutable per-run configuration, constructed once before the run starts.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Output columns, in order. Must be non-empty with unique names.
    pub columns: Vec<ColumnSpec>,
    /// Output field delimiter.
    pub delimiter: u8,
    /// Cooperative cancellation signal, checked once per unit boundary. A
    /// partially read unit finishes before cancellation is honored.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ConversionOptions {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        ConversionOptions {
            columns,
            delimiter: DEFAULT_DELIMITER,
            cancel: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Converts a TMX byte stream to CSV rows on any sink.
pub fn convert<R: BufRead, W: Write>(
    source: R,
    sink: W,
    options: &ConversionOptions,
) -> Result<ConversionSummary, Error> {
    validate_column_specs(&options.columns)?;
    let reader = TmxReader::from_reader(source);
    let writer = RowWriter::from_writer(sink, options.delimiter);
    run(reader, writer, options)
}

/// Converts a TMX file to a CSV file.
///
/// Configuration and the input handle are validated before the output file is
/// created, so a run that never starts produces no partial output.
pub fn convert_file<P: AsRef<Path>>(
    input: P,
    output: P,
    options: &ConversionOptions,
) -> Result<ConversionSummary, Error> {
    validate_column_specs(&options.columns)?;
    let reader = TmxReader::from_path(input)?;
    let writer = RowWriter::from_path(output, options.delimiter)?;
    run(reader, writer, options)
}

/// Drives any unit stream through projection and writing. This is the state
/// machine: header, then per unit either a written row or a recorded skip,
/// then a closed writer.
pub fn run<I, W>(
    units: I,
    mut writer: RowWriter<W>,
    options: &ConversionOptions,
) -> Result<ConversionSummary, Error>
where
    I: IntoIterator<Item = UnitOutcome>,
    W: Write,
{
    validate_column_specs(&options.columns)?;

    let header: Vec<&str> = options.columns.iter().map(|s| s.name.as_str()).collect();
    writer
        .write_row(&header)
        .map_err(|err| Error::sink_error(0, err))?;

    let mut summary = ConversionSummary::default();
    let mut units = units.into_iter();

    loop {
        if options.cancel_requested() {
            summary.cancelled = true;
            break;
        }
        let Some(outcome) = units.next() else {
            break;
        };
        summary.units_read += 1;

        match outcome {
            UnitOutcome::Unit(unit) => {
                if unit.is_empty() {
                    summary.record_skip(SkipReason::EmptyUnit);
                    continue;
                }
                let row = project(&unit, &options.columns);
                writer
                    .write_row(&row)
                    .map_err(|err| Error::sink_error(summary.rows_written, err))?;
                summary.rows_written += 1;
            }
            UnitOutcome::Skipped(reason) => summary.record_skip(reason),
        }
    }

    writer
        .finish()
        .map_err(|err| Error::sink_error(summary.rows_written, err))?;
    Ok(summary)
}
