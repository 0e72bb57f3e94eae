//! In-memory CSV tables.
//!
//! State tables, label tables and dataset metadata all share this
//! representation: ordered headers plus rows of string cells. Columns the
//! library does not know about are carried through untouched.

use crate::error::{CoreError, CoreResult};

use std::io;
use std::path::Path;

/// A CSV table held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Loads a table from a CSV file with a header row.
    ///
    /// Fails with `CoreError::InvalidPath` if the file does not exist.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::InvalidPath(format!(
                "CSV file '{}' does not exist",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a table from any CSV source with a header row.
    pub fn from_reader<R: io::Read>(reader: R) -> CoreResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Writes the table as CSV, headers first.
    pub fn write_to<W: io::Write>(&self, writer: W) -> CoreResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the table to a CSV file, replacing any existing file.
    pub fn write_to_path(&self, path: &Path) -> CoreResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(io::BufWriter::new(file))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Returns the position of a column, if present.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the position of a column, failing with `MissingColumn`.
    pub fn column_index(&self, name: &str) -> CoreResult<usize> {
        self.find_column(name)
            .ok_or_else(|| CoreError::MissingColumn(name.to_string()))
    }

    /// Returns one cell. Panics if either index is out of range.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Appends a row; its width must match the headers.
    pub fn push_row(&mut self, row: Vec<String>) -> CoreResult<()> {
        if row.len() != self.headers.len() {
            return Err(CoreError::InvalidRecord {
                row: self.rows.len(),
                reason: format!(
                    "expected {} fields, found {}",
                    self.headers.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builds a table holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Parses a frame number cell. Accepts integral floats ("344.0") as written
/// by tools that store every numeric column as floating point, as long as
/// they fit in an `i64`.
pub fn parse_frame_number(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }
    match cell.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        Ok(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Some(value as i64)
        }
        _ => None,
    }
}
