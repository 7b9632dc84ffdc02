//! Escaped tabular output, one row at a time.
//!
//! [`RowWriter`] wraps a `csv::Writer` with the crate's row discipline: every
//! row is pushed through to the sink as soon as it is written, so at most one
//! row is ever buffered and a crash can never leave a half-terminated row
//! behind an unflushed buffer. Quoting is standard CSV: fields containing the
//! delimiter, a quote, or a line break are quoted with internal quotes
//! doubled; everything else is written bare. Records end with `\n` on every
//! platform.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Error;

/// The default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Streaming, per-row-flushed CSV writer over any sink.
pub struct RowWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RowWriter<File> {
    /// Creates a writer to a file path. The file is created or truncated.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, Error> {
        let file = File::create(path).map_err(Error::Io)?;
        Ok(Self::from_writer(file, delimiter))
    }
}

impl<W: Write> RowWriter<W> {
    /// Creates a writer over any sink with the given field delimiter.
    pub fn from_writer(sink: W, delimiter: u8) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(sink);
        RowWriter { writer }
    }

    /// Appends one row and flushes it through to the sink. A failure here is
    /// a sink failure; previously written rows are already safely flushed.
    pub fn write_row<I, S>(&mut self, row: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes any remaining writer state and returns the sink.
    pub fn finish(self) -> Result<W, Error> {
        let mut sink = self
            .writer
            .into_inner()
            .map_err(|err| Error::Io(err.into_error()))?;
        sink.flush().map_err(Error::Io)?;
        Ok(sink)
    }
}
