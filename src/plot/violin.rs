//! Violin plots drawn from kernel density outlines.
//!
//! Each column becomes a closed outline, the density mirrored on both sides
//! and scaled so every violin has the same maximum width. Violins for several
//! columns are drawn one after another on the same centre line, overlapping,
//! with translucent outlines. Inner marks and summary markers are separate
//! series on top.

use std::str::FromStr;

use charming::{
    Chart,
    element::{LineStyle, LineStyleType, Symbol},
    series::{Line, Scatter},
};

use crate::{
    core::{
        StyleConfig,
        error::{DatavizErrorKind, Result},
    },
    dataset::Column,
    plot::{
        ChartRequest,
        charts::{base_chart, column_values, item_style, value_axis},
        stats::{self, BoxStats},
    },
};

const HALF_WIDTH: f64 = 0.4;
const CENTER: f64 = 0.0;
const KDE_POINTS: usize = 128;
const INNER_COLOR: &str = "#333333";

/// What is drawn inside each violin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerMode {
    /// A miniature box plot: whisker line, thick IQR bar and median dot
    Box,
    /// Dashed lines across the violin at each quartile
    Quartile,
    /// Every observation as a point on the centre line
    Point,
    None,
}

impl FromStr for InnerMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(InnerMode::Box),
            "quartile" | "quart" => Ok(InnerMode::Quartile),
            "point" | "points" => Ok(InnerMode::Point),
            "none" | "" => Ok(InnerMode::None),
            other => Err(format!("unknown violin inner mode: {other}")),
        }
    }
}

/// One violin's density outline, already scaled to [`HALF_WIDTH`].
struct Outline {
    /// `(value, half width)` pairs in ascending value order
    curve: Vec<(f64, f64)>,
}

impl Outline {
    fn new(values: &[f64]) -> Self {
        let curve = stats::kde(values, KDE_POINTS);
        let peak = curve.iter().map(|&(_, d)| d).fold(0.0, f64::max);
        let scale = if peak > 0.0 { HALF_WIDTH / peak } else { 0.0 };
        Self {
            curve: curve.into_iter().map(|(v, d)| (v, d * scale)).collect(),
        }
    }

    /// Half width at `value`, interpolated between evaluated points
    fn half_width_at(&self, value: f64) -> f64 {
        let index = self.curve.partition_point(|&(v, _)| v < value);
        match (index.checked_sub(1).and_then(|i| self.curve.get(i)), self.curve.get(index)) {
            (Some(&(v0, w0)), Some(&(v1, w1))) if v1 > v0 => {
                w0 + (w1 - w0) * (value - v0) / (v1 - v0)
            }
            (_, Some(&(_, w))) | (Some(&(_, w)), None) => w,
            (None, None) => 0.0,
        }
    }

    /// Closed polygon: up the right side, back down the left
    fn polygon(&self, center: f64) -> Vec<Vec<f64>> {
        let right = self.curve.iter().map(|&(v, w)| vec![center + w, v]);
        let left = self.curve.iter().rev().map(|&(v, w)| vec![center - w, v]);
        let mut points: Vec<Vec<f64>> = right.chain(left).collect();
        if let Some(first) = points.first().cloned() {
            points.push(first);
        }
        points
    }
}

fn segment(name: &str, from: [f64; 2], to: [f64; 2], line_style: LineStyle) -> Line {
    Line::new()
        .name(name)
        .show_symbol(false)
        .line_style(line_style)
        .data(vec![from.to_vec(), to.to_vec()])
}

fn marker(name: &str, symbol: Symbol, size: f64, color: &str, at: [f64; 2]) -> Scatter {
    Scatter::new()
        .name(name)
        .symbol(symbol)
        .symbol_size(size)
        .item_style(charming::element::ItemStyle::new().color(color))
        .data(vec![at.to_vec()])
}

/// Overlapping violins, one per column, all centred on x = 0
pub fn violin(columns: &[&Column], request: &ChartRequest, style: &StyleConfig) -> Result<Chart> {
    let inner = style.inner_mode()?;
    let alpha = (columns.len() > 1).then_some(style.alpha);
    let mut chart = base_chart(request)
        .x_axis(value_axis(request.xlabel.as_ref(), None))
        .y_axis(value_axis(request.ylabel.as_ref(), match columns {
            [single] => Some(single.name()),
            _ => None,
        }));

    for column in columns {
        let values = column_values(column)?;
        let center = CENTER;
        let outline = Outline::new(&values);

        let mut outline_style = LineStyle::new().width(1.5);
        if let Some(alpha) = alpha {
            outline_style = outline_style.opacity(alpha);
        }
        chart = chart.series(
            Line::new()
                .name(column.name())
                .show_symbol(false)
                .line_style(outline_style)
                .item_style(item_style(style, alpha))
                .data(outline.polygon(center)),
        );

        let box_stats =
            BoxStats::from_values(&values).ok_or_else(|| DatavizErrorKind::NoNumericData {
                column: column.name().to_string(),
            })?;

        match inner {
            InnerMode::Box => {
                chart = chart
                    .series(segment(
                        "whisker",
                        [center, box_stats.lower_whisker],
                        [center, box_stats.upper_whisker],
                        LineStyle::new().width(1.5).color(INNER_COLOR),
                    ))
                    .series(segment(
                        "iqr",
                        [center, box_stats.q1],
                        [center, box_stats.q3],
                        LineStyle::new().width(6.0).color(INNER_COLOR),
                    ))
                    .series(marker(
                        "box median",
                        Symbol::Circle,
                        5.0,
                        "#ffffff",
                        [center, box_stats.median],
                    ));
            }
            InnerMode::Quartile => {
                for (quartile, line_type) in [
                    (box_stats.q1, LineStyleType::Dashed),
                    (box_stats.median, LineStyleType::Solid),
                    (box_stats.q3, LineStyleType::Dashed),
                ] {
                    let half = outline.half_width_at(quartile);
                    chart = chart.series(segment(
                        "quartile",
                        [center - half, quartile],
                        [center + half, quartile],
                        LineStyle::new().width(1.0).color(INNER_COLOR).type_(line_type),
                    ));
                }
            }
            InnerMode::Point => {
                chart = chart.series(
                    Scatter::new()
                        .name("observations")
                        .symbol_size(3.0)
                        .item_style(charming::element::ItemStyle::new().color(INNER_COLOR))
                        .data(values.iter().map(|&v| vec![center, v]).collect::<Vec<_>>()),
                );
            }
            InnerMode::None => {}
        }

        if style.violin_show_means {
            if let Some(mean) = stats::mean(&values) {
                chart = chart.series(marker("mean", Symbol::Diamond, 9.0, "#d62728", [center, mean]));
            }
        }
        if style.violin_show_medians {
            chart = chart.series(marker(
                "median",
                Symbol::Circle,
                7.0,
                "#2ca02c",
                [center, box_stats.median],
            ));
        }
        if style.violin_show_extrema {
            if let Some((min, max)) = stats::extent(&values) {
                for extreme in [min, max] {
                    chart = chart.series(segment(
                        "extrema",
                        [center - HALF_WIDTH / 2.0, extreme],
                        [center + HALF_WIDTH / 2.0, extreme],
                        LineStyle::new().width(1.5).color(INNER_COLOR),
                    ));
                }
            }
        }
    }

    Ok(chart)
}
