//! Utility functions for dataviz.

use chrono::Local;

/// Split a comma-separated column list, trimming each entry and dropping empties
pub fn parse_column_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// A file name that sorts by creation time, e.g. `20261019-101500-123_scatter.html`
pub fn timestamped_file_name(stem: &str, extension: &str) -> String {
    format!(
        "{}_{stem}.{extension}",
        Local::now().format("%Y%m%d-%H%M%S-%3f")
    )
}

/// Format a float for axis labels and annotations, dropping a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{}", (value * 1e4).round() / 1e4)
    }
}
