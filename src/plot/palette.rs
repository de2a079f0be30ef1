//! Named color maps and marker styles accepted in the style configuration.

use std::str::FromStr;

use charming::element::Symbol;

/// Color stops for the heatmap's continuous scale, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    Coolwarm,
    Viridis,
    Magma,
    RdBu,
    Blues,
    Greys,
}

impl ColorMap {
    pub fn stops(self) -> Vec<&'static str> {
        match self {
            ColorMap::Coolwarm => vec!["#3b4cc0", "#8db0fe", "#dddddd", "#f49a7b", "#b40426"],
            ColorMap::Viridis => vec!["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"],
            ColorMap::Magma => vec!["#000004", "#51127c", "#b73779", "#fc8961", "#fcfdbf"],
            ColorMap::RdBu => vec!["#67001f", "#d6604d", "#f7f7f7", "#4393c3", "#053061"],
            ColorMap::Blues => vec!["#f7fbff", "#c6dbef", "#6baed6", "#2171b5", "#08306b"],
            ColorMap::Greys => vec!["#ffffff", "#d9d9d9", "#969696", "#525252", "#000000"],
        }
    }
}

impl FromStr for ColorMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coolwarm" => Ok(ColorMap::Coolwarm),
            "viridis" => Ok(ColorMap::Viridis),
            "magma" => Ok(ColorMap::Magma),
            "rdbu" => Ok(ColorMap::RdBu),
            "blues" => Ok(ColorMap::Blues),
            "greys" | "grays" => Ok(ColorMap::Greys),
            other => Err(format!("unknown color map: {other}")),
        }
    }
}

/// Marker style for point series. Accepts the single-character codes
/// (`o`, `s`, `^`, `D`, `p`) as well as the symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    RoundSquare,
    Triangle,
    Diamond,
    Pin,
    Arrow,
}

impl Marker {
    pub fn symbol(self) -> Symbol {
        match self {
            Marker::Circle => Symbol::Circle,
            Marker::Square => Symbol::Rect,
            Marker::RoundSquare => Symbol::RoundRect,
            Marker::Triangle => Symbol::Triangle,
            Marker::Diamond => Symbol::Diamond,
            Marker::Pin => Symbol::Pin,
            Marker::Arrow => Symbol::Arrow,
        }
    }
}

impl FromStr for Marker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "o" | "circle" => Ok(Marker::Circle),
            "s" | "square" | "rect" => Ok(Marker::Square),
            "roundrect" => Ok(Marker::RoundSquare),
            "^" | "triangle" => Ok(Marker::Triangle),
            "D" | "d" | "diamond" => Ok(Marker::Diamond),
            "p" | "pin" => Ok(Marker::Pin),
            "arrow" => Ok(Marker::Arrow),
            other => Err(format!("unknown marker: {other}")),
        }
    }
}
