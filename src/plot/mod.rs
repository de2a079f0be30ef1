//! Chart requests, validation and dispatch to the chart routines.

pub mod charts;
pub mod dispatch;
pub mod output;
pub mod palette;
pub mod stats;
pub mod violin;

use std::{fmt, path::PathBuf, str::FromStr};

pub use dispatch::{Plotter, Rendered};
pub use output::{Figure, Presenter};

/// The eight supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Histogram,
    Violin,
    Box,
    Scatter,
    Line,
    Bar,
    ScatterReg,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Histogram,
        ChartKind::Violin,
        ChartKind::Box,
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::ScatterReg,
        ChartKind::Heatmap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Violin => "violin",
            ChartKind::Box => "box",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::ScatterReg => "scatter_reg",
            ChartKind::Heatmap => "heatmap",
        }
    }

    /// Comma-separated list of every tag, for prompts and error messages
    pub fn valid_tags() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Kinds plotted against an (x, y) pair of columns
    pub fn is_pairwise(self) -> bool {
        matches!(
            self,
            ChartKind::Scatter | ChartKind::Line | ChartKind::Bar | ChartKind::ScatterReg
        )
    }

    /// Whether the column at `index` of a request must be numeric.
    /// A bar chart's category column may hold any type.
    pub fn requires_numeric(self, index: usize) -> bool {
        !(self == ChartKind::Bar && index == 0)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or(tag)
    }
}

/// A single plot call: which chart, over which columns, with which labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub save: bool,
    pub filename: Option<PathBuf>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            title: None,
            xlabel: None,
            ylabel: None,
            save: false,
            filename: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn xlabel(mut self, xlabel: impl Into<String>) -> Self {
        self.xlabel = Some(xlabel.into());
        self
    }

    pub fn ylabel(mut self, ylabel: impl Into<String>) -> Self {
        self.ylabel = Some(ylabel.into());
        self
    }

    /// Persist the figure; without a filename it is written to `<kind>.svg`
    pub fn save(mut self, filename: Option<PathBuf>) -> Self {
        self.save = true;
        self.filename = filename;
        self
    }
}
