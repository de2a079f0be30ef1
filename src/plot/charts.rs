//! One routine per chart kind, each turning a validated request into a
//! [`Chart`].

use std::collections::HashMap;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title, VisualMap, VisualMapChannel},
    datatype::DataPoint,
    element::{AxisType, ItemStyle, Label, LineStyle, Orient, Tooltip, Trigger},
    series::{Bar, Boxplot, Heatmap, Line, Scatter},
};

use crate::{
    core::{
        StyleConfig,
        error::{DatavizErrorKind, Result},
        utils::format_number,
    },
    dataset::{Column, Dataset},
    plot::{
        ChartRequest,
        stats::{self, Bins, BoxStats, LinearFit},
    },
};

const SYMBOL_SIZE: f64 = 8.0;

/// Chart skeleton shared by every routine: title, tooltip, grid and legend
pub(crate) fn base_chart(request: &ChartRequest) -> Chart {
    let mut chart = Chart::new()
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        );

    if let Some(title) = &request.title {
        chart = chart.title(Title::new().text(title.as_str()).left("center"));
    }
    chart
}

/// A value axis, named by the request's label when given, else by `default`
pub(crate) fn value_axis(label: Option<&String>, default: Option<&str>) -> Axis {
    let axis = Axis::new().type_(AxisType::Value).scale(true);
    match label.map(String::as_str).or(default) {
        Some(name) => axis.name(name),
        None => axis,
    }
}

fn category_axis(label: Option<&String>, default: Option<&str>, data: Vec<String>) -> Axis {
    let axis = Axis::new().type_(AxisType::Category).data(data);
    match label.map(String::as_str).or(default) {
        Some(name) => axis.name(name),
        None => axis,
    }
}

/// Series style from the configured color, optionally with transparency
pub(crate) fn item_style(style: &StyleConfig, alpha: Option<f64>) -> ItemStyle {
    let mut item_style = ItemStyle::new();
    if let Some(color) = &style.color {
        item_style = item_style.color(color.as_str());
    }
    if let Some(alpha) = alpha {
        item_style = item_style.opacity(alpha);
    }
    item_style
}

/// Non-missing values of a column, failing when there are none
pub(crate) fn column_values(column: &Column) -> Result<Vec<f64>> {
    let values = column.values();
    if values.is_empty() {
        return Err(DatavizErrorKind::NoNumericData {
            column: column.name().to_string(),
        }
        .into());
    }
    Ok(values)
}

fn column_pairs(dataset: &Dataset, x: &Column, y: &Column) -> Result<Vec<(f64, f64)>> {
    let pairs = dataset.numeric_pairs(x, y);
    if pairs.is_empty() {
        let column = if x.values().is_empty() { x } else { y };
        return Err(DatavizErrorKind::NoNumericData {
            column: column.name().to_string(),
        }
        .into());
    }
    Ok(pairs)
}

fn points(pairs: &[(f64, f64)]) -> Vec<Vec<f64>> {
    pairs.iter().map(|&(x, y)| vec![x, y]).collect()
}

/// Overlapping histograms over shared bins
pub fn histogram(columns: &[&Column], request: &ChartRequest, style: &StyleConfig) -> Result<Chart> {
    let samples = columns
        .iter()
        .map(|column| column_values(column))
        .collect::<Result<Vec<_>>>()?;
    let slices: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
    let Some(bins) = Bins::shared(&slices) else {
        return Err(DatavizErrorKind::NoNumericData {
            column: columns.first().map(|c| c.name()).unwrap_or_default().to_string(),
        }
        .into());
    };

    let labels = bins
        .ranges()
        .map(|(low, high)| format!("{} - {}", format_number(low), format_number(high)))
        .collect();
    let default_x = match columns {
        [single] => Some(single.name()),
        _ => None,
    };
    // Overlaid series need transparency to stay readable
    let alpha = (columns.len() > 1).then_some(style.alpha);

    let mut chart = base_chart(request)
        .x_axis(category_axis(request.xlabel.as_ref(), default_x, labels))
        .y_axis(value_axis(request.ylabel.as_ref(), Some("Count")));

    for (column, values) in columns.iter().zip(&samples) {
        let counts: Vec<f64> = bins.counts(values).into_iter().map(|c| c as f64).collect();
        chart = chart.series(
            Bar::new()
                .name(column.name())
                .bar_gap("-100%")
                .bar_width("100%")
                .item_style(item_style(style, alpha))
                .data(counts),
        );
    }
    Ok(chart)
}

/// Side-by-side box plots, one per column
pub fn box_plot(columns: &[&Column], request: &ChartRequest, style: &StyleConfig) -> Result<Chart> {
    let mut boxes = Vec::with_capacity(columns.len());
    let mut outliers = Vec::new();
    for (index, column) in columns.iter().enumerate() {
        let values = column_values(column)?;
        let box_stats =
            BoxStats::from_values(&values).ok_or_else(|| DatavizErrorKind::NoNumericData {
                column: column.name().to_string(),
            })?;
        outliers.extend(box_stats.outliers.iter().map(|&v| vec![index as f64, v]));
        boxes.push(box_stats.to_vec());
    }

    let names = columns.iter().map(|c| c.name().to_string()).collect();
    let mut chart = base_chart(request)
        .x_axis(category_axis(request.xlabel.as_ref(), None, names))
        .y_axis(value_axis(request.ylabel.as_ref(), None))
        .series(
            Boxplot::new()
                .name("box")
                .item_style(item_style(style, None))
                .data(boxes),
        );

    if style.fliers && !outliers.is_empty() {
        chart = chart.series(
            Scatter::new()
                .name("outliers")
                .symbol_size(5.0)
                .item_style(item_style(style, None))
                .data(outliers),
        );
    }
    Ok(chart)
}

/// Two-axis scatter of `columns[0]` against `columns[1]`
pub fn scatter(
    dataset: &Dataset,
    columns: &[&Column],
    request: &ChartRequest,
    style: &StyleConfig,
) -> Result<Chart> {
    let [x, y] = pair(request, columns)?;
    let pairs = column_pairs(dataset, x, y)?;

    let mut series = Scatter::new()
        .name(y.name())
        .symbol_size(SYMBOL_SIZE)
        .item_style(item_style(style, Some(style.alpha)))
        .data(points(&pairs));
    if let Some(marker) = style.marker_symbol()? {
        series = series.symbol(marker.symbol());
    }

    Ok(base_chart(request)
        .x_axis(value_axis(request.xlabel.as_ref(), Some(x.name())))
        .y_axis(value_axis(request.ylabel.as_ref(), Some(y.name())))
        .series(series))
}

/// Line of the mean y per distinct x, ordered by x
pub fn line(
    dataset: &Dataset,
    columns: &[&Column],
    request: &ChartRequest,
    style: &StyleConfig,
) -> Result<Chart> {
    let [x, y] = pair(request, columns)?;
    let mut pairs = column_pairs(dataset, x, y)?;
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut averaged: Vec<(f64, f64, usize)> = Vec::new();
    for (x_value, y_value) in pairs {
        match averaged.last_mut() {
            Some((last_x, sum, count)) if *last_x == x_value => {
                *sum += y_value;
                *count += 1;
            }
            _ => averaged.push((x_value, y_value, 1)),
        }
    }
    let data: Vec<Vec<f64>> = averaged
        .into_iter()
        .map(|(x_value, sum, count)| vec![x_value, sum / count as f64])
        .collect();

    let mut line_style = LineStyle::new().width(2.0);
    if let Some(color) = &style.color {
        line_style = line_style.color(color.as_str());
    }

    Ok(base_chart(request)
        .x_axis(value_axis(request.xlabel.as_ref(), Some(x.name())))
        .y_axis(value_axis(request.ylabel.as_ref(), Some(y.name())))
        .series(
            Line::new()
                .name(y.name())
                .show_symbol(false)
                .line_style(line_style)
                .item_style(item_style(style, None))
                .data(data),
        ))
}

/// Mean value per category, categories in order of first appearance
pub fn bar(
    dataset: &Dataset,
    columns: &[&Column],
    request: &ChartRequest,
    style: &StyleConfig,
) -> Result<Chart> {
    let [category, value] = pair(request, columns)?;

    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (f64, usize)> = HashMap::new();
    for row in 0..dataset.row_count() {
        let (Some(name), Some(amount)) = (category.text(row), value.value(row)) else {
            continue;
        };
        let entry = totals.entry(name.to_string()).or_insert_with(|| {
            order.push(name.to_string());
            (0.0, 0)
        });
        entry.0 += amount;
        entry.1 += 1;
    }

    if order.is_empty() {
        return Err(DatavizErrorKind::NoNumericData {
            column: value.name().to_string(),
        }
        .into());
    }

    let means: Vec<f64> = order
        .iter()
        .filter_map(|name| totals.get(name))
        .map(|&(sum, count)| sum / count as f64)
        .collect();

    Ok(base_chart(request)
        .x_axis(category_axis(request.xlabel.as_ref(), Some(category.name()), order))
        .y_axis(value_axis(request.ylabel.as_ref(), Some(value.name())))
        .series(
            Bar::new()
                .name(value.name())
                .item_style(item_style(style, None))
                .data(means),
        ))
}

/// Scatter with a least-squares line across the x range
pub fn scatter_reg(
    dataset: &Dataset,
    columns: &[&Column],
    request: &ChartRequest,
    style: &StyleConfig,
) -> Result<Chart> {
    let [x, y] = pair(request, columns)?;
    let pairs = column_pairs(dataset, x, y)?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    let degenerate = || DatavizErrorKind::DegenerateRegression {
        column: x.name().to_string(),
    };
    let fit = LinearFit::fit(&xs, &ys).ok_or_else(degenerate)?;
    let (x_min, x_max) = stats::extent(&xs).ok_or_else(degenerate)?;
    let fitted = vec![
        vec![x_min, fit.predict(x_min)],
        vec![x_max, fit.predict(x_max)],
    ];

    tracing::debug!(
        "Fitted {} ~ {}: slope={}, intercept={}, r2={}",
        y.name(),
        x.name(),
        fit.slope,
        fit.intercept,
        fit.r_squared
    );

    let mut points_series = Scatter::new()
        .name(y.name())
        .symbol_size(SYMBOL_SIZE)
        .item_style(item_style(style, None))
        .data(points(&pairs));
    if let Some(marker) = style.marker_symbol()? {
        points_series = points_series.symbol(marker.symbol());
    }

    Ok(base_chart(request)
        .x_axis(value_axis(request.xlabel.as_ref(), Some(x.name())))
        .y_axis(value_axis(request.ylabel.as_ref(), Some(y.name())))
        .series(points_series)
        .series(
            Line::new()
                .name(format!(
                    "y = {}x + {} (R² = {})",
                    format_number(fit.slope),
                    format_number(fit.intercept),
                    format_number(fit.r_squared)
                ))
                .show_symbol(false)
                .line_style(LineStyle::new().width(2.0))
                .data(fitted),
        ))
}

/// Pairwise Pearson correlations between columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where either column of a pair has no variance
    pub data: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Pairwise correlations over the rows where both columns hold numbers
    pub fn compute(dataset: &Dataset, columns: &[&Column]) -> Self {
        let data = columns
            .iter()
            .enumerate()
            .map(|(i, row)| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(j, col)| {
                        if i == j {
                            stats::has_spread(&row.values()).then_some(1.0)
                        } else {
                            let (xs, ys): (Vec<f64>, Vec<f64>) =
                                dataset.numeric_pairs(row, col).into_iter().unzip();
                            stats::pearson(&xs, &ys)
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
            data,
        }
    }
}

/// Annotated correlation heatmap
pub fn heatmap(
    dataset: &Dataset,
    columns: &[&Column],
    request: &ChartRequest,
    style: &StyleConfig,
) -> Result<Chart> {
    for column in columns {
        column_values(column)?;
    }
    let matrix = CorrelationMatrix::compute(dataset, columns);

    let cells: Vec<Vec<DataPoint>> = matrix
        .data
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter().enumerate().filter_map(move |(j, value)| {
                value.map(|v| {
                    vec![
                        DataPoint::from(j as f64),
                        DataPoint::from(i as f64),
                        DataPoint::from((v * 100.0).round() / 100.0),
                    ]
                })
            })
        })
        .collect();

    let stops = style.color_map()?.stops();

    Ok(base_chart(request)
        .x_axis(category_axis(request.xlabel.as_ref(), None, matrix.columns.clone()))
        .y_axis(category_axis(request.ylabel.as_ref(), None, matrix.columns))
        .visual_map(
            VisualMap::new()
                .min(-1.0)
                .max(1.0)
                .calculable(true)
                .orient(Orient::Vertical)
                .right("0%")
                .top("center")
                .in_range(VisualMapChannel::new().color(stops)),
        )
        .series(
            Heatmap::new()
                .name("correlation")
                .label(Label::new().show(true))
                .data(cells),
        ))
}

/// The x and y columns of a pairwise request
fn pair<'a>(request: &ChartRequest, columns: &[&'a Column]) -> Result<[&'a Column; 2]> {
    match columns {
        [x, y] => Ok([*x, *y]),
        _ => Err(DatavizErrorKind::ColumnCount {
            kind: request.kind.to_string(),
            expected: "exactly 2".to_string(),
            actual: columns.len(),
        }
        .into()),
    }
}
