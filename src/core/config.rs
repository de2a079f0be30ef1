//! Layered configuration for dataviz.
//!
//! Values are resolved from lowest to highest priority:
//! 1. Built-in defaults
//! 2. The TOML config file (`--config`, or `<config dir>/dataviz/config.toml`)
//! 3. Environment variables prefixed with `DATAVIZ_`, using `__` between the
//!    section and the key (`DATAVIZ_STYLE__COLOR=teal`)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{
    core::error::{DatavizErrorKind, Result},
    plot::{
        palette::{ColorMap, Marker},
        violin::InnerMode,
    },
};

pub const ENV_PREFIX: &str = "DATAVIZ_";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub style: StyleConfig,
    pub output: OutputConfig,
}

/// The fixed bundle of rendering parameters shared by every chart a
/// [`Plotter`](crate::plot::Plotter) draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Figure width in pixels
    pub width: u32,
    /// Figure height in pixels
    pub height: u32,
    /// Primary series color. The chart theme decides when unset.
    pub color: Option<String>,
    /// Marker symbol for point series
    pub marker: Option<String>,
    pub violin_inner: String,
    pub violin_show_means: bool,
    pub violin_show_extrema: bool,
    pub violin_show_medians: bool,
    pub heatmap_cmap: String,
    /// Point and bar transparency, 0.0 to 1.0
    pub alpha: f64,
    /// Draw outlier points on box plots
    pub fliers: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            color: None,
            marker: None,
            violin_inner: "box".to_string(),
            violin_show_means: true,
            violin_show_extrema: true,
            violin_show_medians: true,
            heatmap_cmap: "coolwarm".to_string(),
            alpha: 0.5,
            fliers: false,
        }
    }
}

impl StyleConfig {
    /// Extract and validate the `[style]` section
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let style: StyleConfig = figment.extract_inner("style")?;
        style.validate()?;
        Ok(style)
    }

    /// Reject values no chart routine can honor
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("figure size", format!("{}x{}", self.width, self.height)));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(invalid("alpha", self.alpha.to_string()));
        }
        self.marker_symbol()?;
        self.inner_mode()?;
        self.color_map()?;
        Ok(())
    }

    pub fn marker_symbol(&self) -> Result<Option<Marker>> {
        self.marker
            .as_deref()
            .map(|name| name.parse::<Marker>().map_err(|_| invalid("marker", name)))
            .transpose()
    }

    pub fn inner_mode(&self) -> Result<InnerMode> {
        self.violin_inner
            .parse()
            .map_err(|_| invalid("violin_inner", &self.violin_inner))
    }

    pub fn color_map(&self) -> Result<ColorMap> {
        self.heatmap_cmap
            .parse()
            .map_err(|_| invalid("heatmap_cmap", &self.heatmap_cmap))
    }
}

fn invalid(field: &str, value: impl Into<String>) -> crate::core::DatavizError {
    DatavizErrorKind::InvalidStyle {
        field: field.to_string(),
        value: value.into(),
    }
    .into()
}

/// How a rendered figure is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Write an HTML preview and open it in the system browser
    Browser,
    /// Write an HTML preview and log its location
    File,
    /// Skip presentation entirely
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub display: DisplayMode,
    pub preview_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            display: DisplayMode::Browser,
            preview_dir: None,
        }
    }
}

impl OutputConfig {
    /// Extract the `[output]` section
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        Ok(figment.extract_inner("output")?)
    }

    /// The directory previews are written into
    pub fn preview_dir(&self) -> PathBuf {
        self.preview_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dataviz")
                .join("previews")
        })
    }
}

impl Config {
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        Ok(Self {
            style: StyleConfig::from_figment(figment)?,
            output: OutputConfig::from_figment(figment)?,
        })
    }

    /// Resolve the configuration, using `path` as the config file when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let figment = match path {
            Some(path) => create_figment_from_file(path)?,
            None => create_figment(),
        };
        Self::from_figment(&figment)
    }
}

/// The default config file location, e.g. `~/.config/dataviz/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dataviz").join(CONFIG_FILE_NAME))
}

/// Build a figment from defaults, the default config file if it exists, and the environment
pub fn create_figment() -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = default_config_path().filter(|path| path.is_file()) {
        tracing::debug!("Using config file: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Build a figment from defaults, an explicit config file, and the environment
pub fn create_figment_from_file(path: &Path) -> Result<Figment> {
    if !path.is_file() {
        return Err(DatavizErrorKind::ConfigFileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    tracing::debug!("Using config file: {}", path.display());

    Ok(Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__")))
}
