//! Load a CSV dataset and render statistical charts from it.

pub mod core;
pub mod dataset;
pub mod plot;
pub mod repl;

pub use crate::core::error::{DatavizError, DatavizErrorKind, Result};
pub use crate::core::{Config, StyleConfig};
pub use dataset::Dataset;
pub use plot::{ChartKind, ChartRequest, Plotter};
