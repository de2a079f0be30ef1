//! Error types for dataviz.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// The wrapper for the error kind, with an optional hint.
#[derive(Debug)]
pub struct DatavizError {
    kind: DatavizErrorKind,
    hint: Option<String>,
}

/// All types of errors than can occur in dataviz.
#[derive(Error, Debug)]
pub enum DatavizErrorKind {
    #[error("Invalid plot type: '{input}'. Valid options: {valid}")]
    InvalidChartKind { input: String, valid: String },

    #[error("No columns given to plot")]
    EmptyColumnList,

    #[error("Column not found in dataset: '{column}'")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' must be numeric to generate a {kind} plot")]
    NonNumericColumn { column: String, kind: String },

    #[error("A {kind} plot needs {expected} columns, got {actual}")]
    ColumnCount {
        kind: String,
        expected: String,
        actual: usize,
    },

    #[error("Column '{column}' has no numeric values to plot")]
    NoNumericData { column: String },

    #[error("Cannot fit a regression line: '{column}' has zero variance or too few points")]
    DegenerateRegression { column: String },

    #[error("Data file not found: {path}")]
    DataFileNotFound { path: PathBuf },

    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Data file has no columns: {path}")]
    EmptyDataset { path: PathBuf },

    #[error("Unsupported output format for {path}. Valid extensions: svg, html")]
    UnsupportedOutputFormat { path: PathBuf },

    #[error("Invalid {field} in style configuration: '{value}'")]
    InvalidStyle { field: String, value: String },

    #[error("Failed to open chart preview: {reason}")]
    PresentError { reason: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("Chart generation error: {0}")]
    ChartGenerationError(#[from] charming::EchartsError),
}

impl DatavizError {
    /// Attaches a hint to the error
    pub fn with_hint(mut self, hint: Option<impl Into<String>>) -> Self {
        if let Some(hint) = hint {
            self.hint = Some(hint.into());
        }
        self
    }

    /// The underlying error kind
    pub fn kind(&self) -> &DatavizErrorKind {
        &self.kind
    }
}

impl fmt::Display for DatavizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint_text) = &self.hint {
            write!(f, " ({hint_text})")?;
        }

        Ok(())
    }
}

impl std::error::Error for DatavizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Convert Error into DatavizErrorKind
impl<E> From<E> for DatavizError
where
    DatavizErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        DatavizError {
            kind: DatavizErrorKind::from(error),
            hint: None,
        }
    }
}

impl From<figment::Error> for DatavizErrorKind {
    fn from(error: figment::Error) -> Self {
        DatavizErrorKind::ConfigError(Box::new(error))
    }
}

/// A convenient result type for dataviz
pub type Result<T> = std::result::Result<T, DatavizError>;
