pub mod config;
pub mod error;
pub mod platform;
pub mod utils;

pub use config::{Config, DisplayMode, OutputConfig, StyleConfig};
pub use error::{DatavizError, DatavizErrorKind, Result};
