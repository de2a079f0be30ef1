//! In-memory tables loaded from delimited text files.

pub mod parser;

use std::fmt;

pub use parser::{load_csv, parse_csv};

/// The inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
            ColumnType::Boolean => "bool",
            ColumnType::Text => "str",
        };
        f.write_str(name)
    }
}

/// A named column. Raw cells are kept as text; `None` marks a missing value.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    cells: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, cells: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            column_type,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type.is_numeric()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn non_null_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Cell text by row, `None` for missing values
    pub fn text(&self, row: usize) -> Option<&str> {
        self.cells.get(row).and_then(|cell| cell.as_deref())
    }

    /// Cell value by row as a float; `None` for missing or non-numeric cells
    pub fn value(&self, row: usize) -> Option<f64> {
        if !self.is_numeric() {
            return None;
        }
        self.text(row).and_then(|text| text.parse::<f64>().ok())
    }

    /// All non-missing numeric values, in row order
    pub fn values(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|row| self.value(row)).collect()
    }
}

/// A table of named columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        debug_assert!(
            columns.iter().all(|column| column.len() == row_count),
            "columns must have equal length"
        );
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Rows where every given column holds a number, as `(x, y)` pairs
    pub fn numeric_pairs(&self, x: &Column, y: &Column) -> Vec<(f64, f64)> {
        (0..self.row_count)
            .filter_map(|row| Some((x.value(row)?, y.value(row)?)))
            .collect()
    }
}
