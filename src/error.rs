//! All error types for the tmx2csv crate.
//!
//! Only failures that stop a conversion live here. Per-unit problems inside a
//! TMX stream are not errors; they surface as [`crate::types::SkipReason`]
//! values and the conversion keeps going.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The column configuration is unusable (empty list, duplicate names, ...).
    /// Raised before any output is produced.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column spec parse error: {0}")]
    ColumnSpecParse(#[from] serde_json::Error),

    /// The output sink failed mid-run. This is the only mid-run fatal
    /// condition; `rows_written` reports how many rows were safely written
    /// (and flushed) before the failure.
    #[error("sink error after {rows_written} rows written: {source}")]
    Sink {
        rows_written: u64,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps a writer-side failure with the number of rows that made it to the
    /// sink before the failure.
    pub fn sink_error(rows_written: u64, source: Error) -> Self {
        Error::Sink {
            rows_written,
            source: Box::new(source),
        }
    }

    /// Creates a new configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_config_error() {
        let error = Error::invalid_config("duplicate column name `en`");
        assert_eq!(
            error.to_string(),
            "invalid configuration: duplicate column name `en`"
        );
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_sink_error_reports_row_count() {
        let io_error = io::Error::new(io::ErrorKind::WriteZero, "disk full");
        let error = Error::sink_error(42, Error::Io(io_error));
        let display = error.to_string();
        assert!(display.contains("42 rows"));
        assert!(display.contains("disk full"));
    }

    #[test]
    fn test_column_spec_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ bad json }").unwrap_err();
        let error = Error::ColumnSpecParse(json_error);
        assert!(error.to_string().contains("column spec parse error"));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::invalid_config("empty column list");
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidConfig"));
        assert!(debug.contains("empty column list"));
    }
}
