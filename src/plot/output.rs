//! Persisting and presenting rendered figures.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use charming::{Chart, HtmlRenderer, ImageRenderer, theme::Theme};

use crate::{
    core::{
        DisplayMode, OutputConfig,
        error::{DatavizErrorKind, Result},
        platform, utils,
    },
    plot::ChartKind,
};

/// A chart together with the surface size it is drawn on.
pub struct Figure {
    pub kind: ChartKind,
    pub chart: Chart,
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// File formats a figure can be written as, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Svg,
    Html,
}

impl FigureFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("svg") => Ok(FigureFormat::Svg),
            Some("html" | "htm") => Ok(FigureFormat::Html),
            _ => Err(DatavizErrorKind::UnsupportedOutputFormat {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }
}

/// Write a figure to `path`, creating parent directories as needed
pub fn save_figure(figure: &Figure, path: &Path) -> Result<()> {
    let format = FigureFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        FigureFormat::Svg => {
            let mut renderer =
                ImageRenderer::new(figure.width, figure.height).theme(Theme::Default);
            renderer.save(&figure.chart, path)?;
        }
        FigureFormat::Html => {
            let mut renderer = HtmlRenderer::new(
                figure.title.as_str(),
                u64::from(figure.width),
                u64::from(figure.height),
            )
            .theme(Theme::Default);
            renderer.save(&figure.chart, path)?;
        }
    }

    tracing::info!("Chart written to {}", path.display());
    Ok(())
}

/// Previews kept in the preview directory; older ones are deleted
const MAX_PREVIEWS: usize = 20;

/// Shows a rendered figure to the user.
pub trait Presenter {
    fn present(&self, figure: &Figure) -> Result<()>;
}

/// Writes an HTML preview per figure and optionally opens it in the browser.
#[derive(Debug, Clone)]
pub struct PreviewPresenter {
    dir: PathBuf,
    open: bool,
}

impl PreviewPresenter {
    pub fn new(dir: PathBuf, open: bool) -> Self {
        Self { dir, open }
    }

    /// Where the next preview for `kind` would be written
    fn preview_path(&self, kind: ChartKind) -> PathBuf {
        self.dir
            .join(utils::timestamped_file_name(kind.as_str(), "html"))
    }
}

impl Presenter for PreviewPresenter {
    fn present(&self, figure: &Figure) -> Result<()> {
        let path = self.preview_path(figure.kind);
        save_figure(figure, &path)?;

        match prune_previews(&self.dir, MAX_PREVIEWS) {
            Ok(0) => {}
            Ok(removed) => tracing::debug!("Removed {removed} old previews"),
            Err(e) => tracing::warn!("Could not clean up {}: {e}", self.dir.display()),
        }

        if self.open {
            platform::open_in_default_app(&path)?;
            tracing::info!("Opened preview {}", path.display());
        } else {
            tracing::info!("Preview available at {}", path.display());
        }
        Ok(())
    }
}

/// Delete all but the newest `keep` HTML previews in `dir`, returning how
/// many were removed. Preview names start with a timestamp, so name order
/// is age order.
fn prune_previews(dir: &Path, keep: usize) -> Result<usize> {
    let mut previews: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    if previews.len() <= keep {
        return Ok(0);
    }

    previews.sort();
    let stale = previews.len() - keep;
    for path in &previews[..stale] {
        fs::remove_file(path)?;
    }
    Ok(stale)
}

/// Skips presentation; used for batch runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn present(&self, figure: &Figure) -> Result<()> {
        tracing::debug!("Skipping presentation of {} chart", figure.kind);
        Ok(())
    }
}

/// Build the presenter the output configuration asks for
pub fn presenter_for(config: &OutputConfig) -> Box<dyn Presenter> {
    match config.display {
        DisplayMode::Browser => Box::new(PreviewPresenter::new(config.preview_dir(), true)),
        DisplayMode::File => Box::new(PreviewPresenter::new(config.preview_dir(), false)),
        DisplayMode::None => Box::new(NoopPresenter),
    }
}
