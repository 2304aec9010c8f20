//! Delimited text tables, the file form of distance matrices and result lists.

#[cfg(test)]
mod tests;

use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A row-based table of generic data.
///
/// ```rust
/// use lasso::Table;
///
/// let mut table = Table::new();
/// table.headers = vec!["taxon", "A", "B"];
/// table.add_row(vec!["A", "0", "3"])?;
/// table.add_row(vec!["B", "3", "0"])?;
/// assert_eq!(table.get("B", 0)?, &"3");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// File the table was read from, if any.
    pub path: Option<PathBuf>,
}

#[rustfmt::skip]
impl<T> Default for Table<T> { fn default() -> Self { Self::new() } }

impl<T> Table<T> {
    /// Create a new table with empty headers and rows.
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Add a new row, which must be as long as the headers.
    pub fn add_row(&mut self, row: Vec<T>) -> Result<(), Report> {
        if row.len() != self.headers.len() {
            Err(eyre!("New row size ({}) does not match the table headers ({}).", row.len(), self.headers.len()))?
        }
        self.rows.push(row);
        Ok(())
    }

    /// Return the values of a row (0-based).
    pub fn get_row(&self, i: usize) -> Result<&[T], Report> {
        self.rows.get(i).map(|row| row.as_slice()).ok_or_else(|| eyre!("Row ({i}) does not exist in the table."))
    }
}

impl<T> Table<T>
where
    T: Display,
{
    /// Get the column index (0-based) corresponding to the header.
    pub fn get_header_index(&self, header: &str) -> Result<usize, Report> {
        self.headers
            .iter()
            .position(|h| h.to_string() == header)
            .ok_or_else(|| eyre!("Column '{header}' was not found in table: {:?}.", self.path))
    }

    /// Get the value at a column and row (0-based).
    pub fn get(&self, header: &str, row: usize) -> Result<&T, Report> {
        let column = self.get_header_index(header)?;
        Ok(&self.get_row(row)?[column])
    }

    /// Return the values of a column.
    pub fn get_column(&self, header: &str) -> Result<Vec<&T>, Report> {
        let column = self.get_header_index(header)?;
        Ok(self.rows.iter().map(|row| &row[column]).collect())
    }

    /// Write the table to a file.
    ///
    /// If `delim` is not provided, it is identified from the path suffix (`.tsv` or `.csv`).
    ///
    /// ```rust
    /// use lasso::Table;
    /// use tempfile::NamedTempFile;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["taxon_1", "taxon_2", "distance"];
    /// table.add_row(vec!["A", "B", "3"])?;
    /// let file = NamedTempFile::new()?;
    /// table.write(file.path(), Some('\t'))?;
    /// assert_eq!(std::fs::read_to_string(file.path())?, "taxon_1\ttaxon_2\tdistance\nA\tB\t3\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write(&self, path: &Path, delim: Option<char>) -> Result<(), Report> {
        let delim = match delim {
            Some(c) => c.to_string(),
            None => utils::path_to_delim(path)?.to_string(),
        };
        let mut file = File::create(path).wrap_err_with(|| format!("Unable to create file: {path:?}"))?;

        let line = format!("{}\n", self.headers.iter().join(&delim));
        file.write_all(line.as_bytes()).wrap_err_with(|| format!("Unable to write table headers: {line}"))?;
        for row in &self.rows {
            let line = format!("{}\n", row.iter().join(&delim));
            file.write_all(line.as_bytes()).wrap_err_with(|| format!("Unable to write table rows: {line}"))?;
        }
        Ok(())
    }
}

impl Table<String> {
    /// Read a TSV or CSV file into a table, the first line holds the headers.
    ///
    /// If `delim` is not provided, it is identified from the path suffix (`.tsv` or `.csv`).
    /// Blank lines are skipped.
    pub fn read(path: &Path, delim: Option<char>) -> Result<Table<String>, Report> {
        let delim = match delim {
            Some(c) => c,
            None => utils::path_to_delim(path)?,
        };
        let file = File::open(path).wrap_err_with(|| format!("Failed to read file: {path:?}"))?;

        let mut table = Table::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.wrap_err_with(|| format!("Failed to read line {} of: {path:?}", i + 1))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let row = line.split(delim).map(|cell| cell.trim().to_string()).collect_vec();
            if table.headers.is_empty() {
                table.headers = row;
            } else {
                table.add_row(row).wrap_err_with(|| format!("Malformed line {} of: {path:?}", i + 1))?;
            }
        }
        table.path = Some(path.to_path_buf());
        Ok(table)
    }
}
