//! CSV loading with per-column type inference.
//!
//! Inference priority is Integer → Float → Boolean → Text. Missing-value
//! markers never influence the inferred type, and a column with no values at
//! all is Text.

use std::{io::Read, path::Path};

use csv::ReaderBuilder;

use crate::{
    core::error::{DatavizErrorKind, Result},
    dataset::{Column, ColumnType, Dataset},
};

/// Cell contents treated as missing values.
const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "NaN", "nan", "NAN", "#N/A",
];

/// Read a CSV file with a header row into a [`Dataset`]
pub fn load_csv(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(DatavizErrorKind::DataFileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let file = std::fs::File::open(path)?;
    let dataset = parse_csv(file)?;
    if dataset.column_count() == 0 {
        return Err(DatavizErrorKind::EmptyDataset {
            path: path.to_path_buf(),
        }
        .into());
    }

    tracing::debug!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV text with a header row into a [`Dataset`]
pub fn parse_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in reader.records() {
        let record = row?;
        for (index, column_cells) in cells.iter_mut().enumerate() {
            let value = record.get(index).map(str::trim).unwrap_or("");
            column_cells.push(if is_null(value) {
                None
            } else {
                Some(value.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| {
            let column_type = infer_type(&cells);
            Column::new(name, column_type, cells)
        })
        .collect();

    Ok(Dataset::new(columns))
}

fn is_null(value: &str) -> bool {
    NULL_MARKERS.contains(&value)
}

fn infer_type(cells: &[Option<String>]) -> ColumnType {
    let mut values = cells.iter().flatten().peekable();
    if values.peek().is_none() {
        return ColumnType::Text;
    }

    let values: Vec<&str> = values.map(String::as_str).collect();
    if values.iter().all(|value| value.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if values
        .iter()
        .all(|value| value.parse::<f64>().is_ok_and(f64::is_finite))
    {
        ColumnType::Float
    } else if values.iter().all(|value| parse_bool(value).is_some()) {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
