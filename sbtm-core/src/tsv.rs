//! Quote-delimited, tab-separated tables
//!
//! Every metrics file is a header row followed by data rows. Each field is
//! wrapped in double quotes and fields are separated by tabs. Fields never
//! contain a double quote (the splitter replaces them), but they may contain
//! newlines: multi-line test notes and bug descriptions stay in one field.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer for one table.
pub struct TsvWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl TsvWriter {
    /// Create (truncate) `path` and write the header row.
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::open(path, e))?;
        let mut writer = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        };
        writer.write_fields(header)?;
        Ok(writer)
    }

    /// Append a data row.
    pub fn write_row<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<S> = fields.into_iter().collect();
        self.write_fields(&fields)?;
        self.rows += 1;
        Ok(())
    }

    fn write_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let line = fields
            .iter()
            .map(|field| format!("\"{}\"", field.as_ref()))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close the file.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        tracing::debug!(path = %self.path.display(), rows = self.rows, "Table written");
        Ok(())
    }
}

/// Parse table text into rows of unquoted fields, header included.
///
/// Newlines inside a quoted field belong to the field.
pub fn parse_table(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                row_started = true;
            }
            '\t' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\n' if !in_quotes => {
                if row_started {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                row_started = false;
            }
            '\r' if !in_quotes => {}
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }
    if row_started {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Read a table from disk.
pub fn read_table(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::open(path, e))?;
    Ok(parse_table(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writer_quotes_and_tabs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("testers.txt");

        let mut writer = TsvWriter::create(&path, &["Session", "Tester"]).unwrap();
        writer.write_row(["et-pc-240115-a.ses", "Paul"]).unwrap();
        assert_eq!(writer.rows(), 1);
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "\"Session\"\t\"Tester\"\n\"et-pc-240115-a.ses\"\t\"Paul\"\n"
        );
    }

    #[test]
    fn test_create_in_missing_directory_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("bugs.txt");

        match TsvWriter::create(&path, &["Session"]) {
            Err(Error::FileOpen { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected open error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_table_multiline_field() {
        let text = "\"Session\"\t\"Notes\"\n\"a.ses\"\t\"line one\nline two\"\n\"b.ses\"\t\"<empty>\"\n";
        let rows = parse_table(text);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["a.ses", "line one\nline two"]);
        assert_eq!(rows[2], vec!["b.ses", "<empty>"]);
    }

    #[test]
    fn test_parse_table_empty_fields() {
        let rows = parse_table("\"\"\t\"\"\t\"x\"\r\n");
        assert_eq!(rows, vec![vec!["", "", "x"]]);
    }

    #[test]
    fn test_read_table_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("breakdowns-day.txt");

        let mut writer = TsvWriter::create(&path, &["Date", "Total"]).unwrap();
        writer.write_row(["2024-01-15", "1.0"]).unwrap();
        writer.finish().unwrap();

        let rows = read_table(&path).unwrap();
        assert_eq!(rows, vec![vec!["Date", "Total"], vec!["2024-01-15", "1.0"]]);
    }
}
