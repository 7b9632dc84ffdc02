//! TSV to CSV re-delimiting.
//!
//! Streams a tab-separated file into a properly escaped CSV file, one record
//! at a time. Input quoting is disabled: tabs are the only structure, so
//! quote characters in the data pass through literally and get escaped on the
//! way out.

use std::path::Path;

use crate::{
    error::Error,
    writer::{DEFAULT_DELIMITER, RowWriter},
};

/// Converts a TSV file to a CSV file. Returns the number of records written.
pub fn tsv_to_csv<P: AsRef<Path>>(in_path: P, out_path: P) -> Result<u64, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(in_path)?;
    let mut writer = RowWriter::from_path(out_path, DEFAULT_DELIMITER)?;

    let mut rows = 0u64;
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        writer.write_row(record.iter())?;
        rows += 1;
    }
    writer.finish()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(tsv: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("in.tsv");
        let out_path = dir.path().join("out.csv");
        std::fs::write(&in_path, tsv).unwrap();
        tsv_to_csv(&in_path, &out_path).unwrap();
        std::fs::read_to_string(&out_path).unwrap()
    }

    #[test]
    fn test_plain_rows() {
        assert_eq!(convert("a\tb\tc\nd\te\tf\n"), "a,b,c\nd,e,f\n");
    }

    #[test]
    fn test_fields_with_commas_get_quoted() {
        assert_eq!(
            convert("hello, world\tsecond\n"),
            "\"hello, world\",second\n"
        );
    }

    #[test]
    fn test_quotes_in_data_are_escaped() {
        assert_eq!(convert("say \"hi\"\tx\n"), "\"say \"\"hi\"\"\",x\n");
    }

    #[test]
    fn test_returns_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("in.tsv");
        let out_path = dir.path().join("out.csv");
        std::fs::write(&in_path, "a\tb\nc\td\ne\tf\n").unwrap();
        assert_eq!(tsv_to_csv(&in_path, &out_path).unwrap(), 3);
    }
}
