//! In-memory tables
//!
//! Tables are loaded by a provider (the CLI reads CSV/TSV files) and then
//! only read. Cell values are plain strings with blanks normalized to `""`.

use crate::message::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Names of the three configuration tables
pub const META_TABLES: [&str; 3] = ["datatype", "field", "rule"];

/// Whether `name` is one of the configuration tables
pub fn is_meta_table(name: &str) -> bool {
    META_TABLES.contains(&name)
}

/// A named table with ordered columns and string rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    path: Option<PathBuf>,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            name: name.into(),
            path: None,
            columns,
            column_index,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices, mostly for tests and fixtures
    pub fn from_records(name: impl Into<String>, columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }

    /// Remember where the table was read from
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Append a row; short rows are padded with blanks, long rows truncated
    pub fn push_row(&mut self, mut values: Vec<String>) {
        values.resize(self.columns.len(), String::new());
        self.rows.push(values);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 0-based position of a column
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index.contains_key(column)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A single row by 0-based index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            table: self,
            values,
        })
    }

    /// All rows in order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            table: self,
            values,
        })
    }

    /// Value at a 0-based row and a named column
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|values| values[col].as_str())
    }

    /// Every value of a column, in row order
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(move |values| values[col].as_str()))
    }
}

/// A borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    values: &'a [String],
}

impl<'a> Row<'a> {
    /// Value of `column`, blank if the table has no such column
    pub fn get(&self, column: &str) -> &'a str {
        self.table
            .column_index(column)
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let values = self.values;
        self.table
            .columns
            .iter()
            .zip(values.iter())
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// Table set error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("Duplicate table name '{0}'")]
    Duplicate(String),
}

/// All loaded tables, in load order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSet {
    tables: Vec<Table>,
    index: HashMap<String, usize>,
    row_start: usize,
}

impl Default for TableSet {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TableSet {
    /// `row_start` is the sheet row number of the first data row
    pub fn new(row_start: usize) -> Self {
        Self {
            tables: Vec::new(),
            index: HashMap::new(),
            row_start,
        }
    }

    /// Add a table; names must be unique
    pub fn insert(&mut self, table: Table) -> Result<(), TableError> {
        if self.index.contains_key(table.name()) {
            return Err(TableError::Duplicate(table.name().to_string()));
        }
        self.index.insert(table.name().to_string(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Build a set from tables in order
    pub fn from_tables(
        row_start: usize,
        tables: impl IntoIterator<Item = Table>,
    ) -> Result<Self, TableError> {
        let mut set = Self::new(row_start);
        for table in tables {
            set.insert(table)?;
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.get(table).is_some_and(|t| t.has_column(column))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// Tables other than `datatype`, `field` and `rule`
    pub fn data_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| !is_meta_table(t.name()))
    }

    pub fn row_start(&self) -> usize {
        self.row_start
    }

    /// Sheet row number of a 0-based data row
    pub fn sheet_row(&self, row: usize) -> usize {
        row + self.row_start
    }

    /// Resolve a 0-based row and a column name to a sheet cell
    pub fn cell(&self, table: &str, column: &str, row: usize) -> Option<Cell> {
        let col = self.get(table)?.column_index(column)?;
        Some(Cell::new(self.sheet_row(row), col + 1))
    }
}
