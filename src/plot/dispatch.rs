//! Request validation and routing to the chart routines.

use std::path::{Path, PathBuf};

use charming::Chart;

use crate::{
    core::{
        StyleConfig,
        error::{DatavizError, DatavizErrorKind, Result},
    },
    dataset::{Column, Dataset},
    plot::{
        ChartKind, ChartRequest, charts,
        output::{self, Figure, NoopPresenter, Presenter},
        violin,
    },
};

/// The outcome of a successful plot call.
#[derive(Debug)]
pub struct Rendered {
    pub figure: Figure,
    /// Where the figure was saved, when saving was requested
    pub saved_to: Option<PathBuf>,
}

impl Rendered {
    pub fn kind(&self) -> ChartKind {
        self.figure.kind
    }

    pub fn chart(&self) -> &Chart {
        &self.figure.chart
    }
}

/// Validates chart requests against a dataset and renders them with a fixed style.
pub struct Plotter {
    style: StyleConfig,
    presenter: Box<dyn Presenter>,
}

impl Plotter {
    pub fn new(style: StyleConfig, presenter: Box<dyn Presenter>) -> Result<Self> {
        style.validate()?;
        Ok(Self { style, presenter })
    }

    /// A plotter that never presents, only builds and optionally saves
    pub fn headless(style: StyleConfig) -> Result<Self> {
        Self::new(style, Box::new(NoopPresenter))
    }

    /// Parse `kind` and plot the given columns
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        dataset: &Dataset,
        kind: &str,
        columns: &[&str],
        title: Option<&str>,
        xlabel: Option<&str>,
        ylabel: Option<&str>,
        save: bool,
        filename: Option<&Path>,
    ) -> Result<Rendered> {
        let kind = kind
            .parse::<ChartKind>()
            .map_err(|input| DatavizErrorKind::InvalidChartKind {
                input,
                valid: ChartKind::valid_tags(),
            })?;

        let mut request = ChartRequest::new(kind, columns.iter().map(|c| c.to_string()).collect());
        if let Some(title) = title {
            request = request.title(title);
        }
        if let Some(xlabel) = xlabel {
            request = request.xlabel(xlabel);
        }
        if let Some(ylabel) = ylabel {
            request = request.ylabel(ylabel);
        }
        if save {
            request = request.save(filename.map(Path::to_path_buf));
        }
        self.plot(dataset, &request)
    }

    /// Validate, draw, optionally save, then present
    pub fn plot(&self, dataset: &Dataset, request: &ChartRequest) -> Result<Rendered> {
        let columns = validate(dataset, request)?;
        tracing::debug!(
            "Dispatching {} chart over [{}]",
            request.kind,
            request.columns.join(", ")
        );

        let chart = self.draw(dataset, &columns, request)?;
        let figure = Figure {
            kind: request.kind,
            chart,
            width: self.style.width,
            height: self.style.height,
            title: request
                .title
                .clone()
                .unwrap_or_else(|| format!("{} of {}", request.kind, request.columns.join(", "))),
        };

        let saved_to = if request.save {
            let path = request
                .filename
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}.svg", request.kind)));
            output::save_figure(&figure, &path)?;
            Some(path)
        } else {
            None
        };

        if let Err(e) = self.presenter.present(&figure) {
            tracing::warn!("Could not present {} plot: {e}", figure.kind);
        }
        Ok(Rendered { figure, saved_to })
    }

    fn draw(&self, dataset: &Dataset, columns: &[&Column], request: &ChartRequest) -> Result<Chart> {
        let style = &self.style;
        match request.kind {
            ChartKind::Histogram => charts::histogram(columns, request, style),
            ChartKind::Violin => violin::violin(columns, request, style),
            ChartKind::Box => charts::box_plot(columns, request, style),
            ChartKind::Scatter => charts::scatter(dataset, columns, request, style),
            ChartKind::Line => charts::line(dataset, columns, request, style),
            ChartKind::Bar => charts::bar(dataset, columns, request, style),
            ChartKind::ScatterReg => charts::scatter_reg(dataset, columns, request, style),
            ChartKind::Heatmap => charts::heatmap(dataset, columns, request, style),
        }
    }
}

/// Resolve the requested columns, checking existence, type and count
pub fn validate<'a>(dataset: &'a Dataset, request: &ChartRequest) -> Result<Vec<&'a Column>> {
    if request.columns.is_empty() {
        return Err(DatavizErrorKind::EmptyColumnList.into());
    }

    let columns = request
        .columns
        .iter()
        .map(|name| {
            dataset.column(name).ok_or_else(|| {
                let available = dataset.column_names().collect::<Vec<_>>().join(", ");
                DatavizError::from(DatavizErrorKind::ColumnNotFound {
                    column: name.clone(),
                })
                .with_hint(Some(format!("available columns: {available}")))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some((_, column)) = columns
        .iter()
        .enumerate()
        .find(|(index, column)| request.kind.requires_numeric(*index) && !column.is_numeric())
    {
        return Err(DatavizErrorKind::NonNumericColumn {
            column: column.name().to_string(),
            kind: request.kind.to_string(),
        }
        .into());
    }

    if request.kind.is_pairwise() && columns.len() != 2 {
        return Err(DatavizErrorKind::ColumnCount {
            kind: request.kind.to_string(),
            expected: "exactly 2".to_string(),
            actual: columns.len(),
        }
        .into());
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::Value;

    use super::*;
    use crate::dataset::parse_csv;

    /// Records the kind of every presented figure.
    #[derive(Clone, Default)]
    struct RecordingPresenter {
        shown: Rc<RefCell<Vec<ChartKind>>>,
    }

    impl Presenter for RecordingPresenter {
        fn present(&self, figure: &Figure) -> Result<()> {
            self.shown.borrow_mut().push(figure.kind);
            Ok(())
        }
    }

    fn people() -> Dataset {
        let csv = "age,income,city\n\
                   34,52000.5,Lisbon\n\
                   28,41000.0,Porto\n\
                   45,61000.25,Lisbon\n\
                   52,70500.0,Faro\n\
                   23,30000.0,Porto\n";
        parse_csv(csv.as_bytes()).unwrap()
    }

    fn recording_plotter() -> (Plotter, Rc<RefCell<Vec<ChartKind>>>) {
        let presenter = RecordingPresenter::default();
        let shown = presenter.shown.clone();
        let plotter = Plotter::new(StyleConfig::default(), Box::new(presenter)).unwrap();
        (plotter, shown)
    }

    fn styled_plotter(style: StyleConfig) -> Plotter {
        Plotter::headless(style).unwrap()
    }

    fn chart_json(rendered: &Rendered) -> Value {
        serde_json::to_value(rendered.chart()).unwrap()
    }

    /// Components serialize as a list; the routines only ever set one
    fn first(value: &Value) -> &Value {
        match value {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        }
    }

    fn series_types(rendered: &Rendered) -> Vec<String> {
        let json = serde_json::to_value(rendered.chart()).unwrap();
        json["series"]
            .as_array()
            .map(|series| {
                series
                    .iter()
                    .filter_map(|s| s["type"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_scatter_on_numeric_columns_succeeds() {
        let (plotter, shown) = recording_plotter();
        let rendered = plotter
            .render(&people(), "scatter", &["age", "income"], None, None, None, false, None)
            .unwrap();

        assert_eq!(rendered.kind(), ChartKind::Scatter);
        assert_eq!(series_types(&rendered), vec!["scatter"]);
        assert!(rendered.saved_to.is_none());
        assert_eq!(*shown.borrow(), vec![ChartKind::Scatter]);
    }

    #[test]
    fn test_non_numeric_column_is_rejected_without_rendering() {
        let (plotter, shown) = recording_plotter();
        let err = plotter
            .render(&people(), "scatter", &["age", "city"], None, None, None, false, None)
            .unwrap_err();

        assert!(matches!(
            err.kind(),
            DatavizErrorKind::NonNumericColumn { column, .. } if column == "city"
        ));
        assert!(shown.borrow().is_empty(), "nothing should be presented");
    }

    #[test]
    fn test_every_numeric_only_kind_rejects_text_columns() {
        let (plotter, shown) = recording_plotter();
        for kind in ChartKind::ALL {
            let request = ChartRequest::new(kind, vec!["income".into(), "city".into()]);
            let result = plotter.plot(&people(), &request);
            assert!(
                matches!(
                    result.as_ref().map_err(|e| e.kind()),
                    Err(DatavizErrorKind::NonNumericColumn { .. })
                ),
                "{kind} should reject a text column"
            );
        }
        assert!(shown.borrow().is_empty());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let (plotter, shown) = recording_plotter();
        let err = plotter
            .render(&people(), "pie", &["age"], None, None, None, false, None)
            .unwrap_err();

        assert!(matches!(err.kind(), DatavizErrorKind::InvalidChartKind { input, .. } if input == "pie"));
        assert!(err.to_string().starts_with("Invalid plot type"));
        assert!(shown.borrow().is_empty());
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let (plotter, _) = recording_plotter();
        let request = ChartRequest::new(ChartKind::Histogram, vec!["age".into(), "height".into()]);
        let err = plotter.plot(&people(), &request).unwrap_err();
        assert!(matches!(
            err.kind(),
            DatavizErrorKind::ColumnNotFound { column } if column == "height"
        ));
        assert_eq!(
            err.to_string(),
            "Column not found in dataset: 'height' (available columns: age, income, city)"
        );
    }

    #[test]
    fn test_pairwise_kinds_need_two_columns() {
        let (plotter, _) = recording_plotter();
        let request = ChartRequest::new(ChartKind::Line, vec!["age".into()]);
        let err = plotter.plot(&people(), &request).unwrap_err();
        assert!(matches!(err.kind(), DatavizErrorKind::ColumnCount { actual: 1, .. }));
    }

    #[test]
    fn test_empty_column_list_is_rejected() {
        let (plotter, _) = recording_plotter();
        let request = ChartRequest::new(ChartKind::Box, Vec::new());
        let err = plotter.plot(&people(), &request).unwrap_err();
        assert!(matches!(err.kind(), DatavizErrorKind::EmptyColumnList));
    }

    #[test]
    fn test_each_kind_routes_to_its_own_routine() {
        let (plotter, shown) = recording_plotter();
        let expected: [(ChartKind, &[&str], &[&str]); 8] = [
            (ChartKind::Histogram, &["age", "income"], &["bar", "bar"]),
            (ChartKind::Violin, &["age"], &["line"]),
            (ChartKind::Box, &["age", "income"], &["boxplot"]),
            (ChartKind::Scatter, &["age", "income"], &["scatter"]),
            (ChartKind::Line, &["age", "income"], &["line"]),
            (ChartKind::Bar, &["city", "income"], &["bar"]),
            (ChartKind::ScatterReg, &["age", "income"], &["scatter", "line"]),
            (ChartKind::Heatmap, &["age", "income"], &["heatmap"]),
        ];

        for (kind, columns, series) in expected {
            let request = ChartRequest::new(kind, columns.iter().map(|c| c.to_string()).collect());
            let rendered = plotter.plot(&people(), &request).unwrap();
            assert_eq!(rendered.kind(), kind);

            let types = series_types(&rendered);
            assert!(
                types.starts_with(&series.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
                "{kind} produced series {types:?}"
            );
        }
        assert_eq!(*shown.borrow(), ChartKind::ALL.to_vec());
    }

    #[test]
    fn test_histogram_and_bar_are_distinct() {
        let (plotter, _) = recording_plotter();
        let histogram = plotter
            .plot(&people(), &ChartRequest::new(ChartKind::Histogram, vec!["age".into()]))
            .unwrap();
        let bar = plotter
            .plot(
                &people(),
                &ChartRequest::new(ChartKind::Bar, vec!["city".into(), "income".into()]),
            )
            .unwrap();

        let categories = |rendered: &Rendered| {
            let json = serde_json::to_value(rendered.chart()).unwrap();
            let axis = match &json["xAxis"] {
                Value::Array(axes) => axes.first().cloned().unwrap_or(Value::Null),
                other => other.clone(),
            };
            axis["data"].clone()
        };
        assert_eq!(
            categories(&bar),
            serde_json::json!(["Lisbon", "Porto", "Faro"])
        );
        assert_ne!(categories(&histogram), categories(&bar));
    }

    #[test]
    fn test_heatmap_is_a_correlation_matrix_with_unit_diagonal() {
        let dataset = people();
        let columns: Vec<&Column> = ["age", "income"]
            .iter()
            .filter_map(|name| dataset.column(name))
            .collect();
        let matrix = charts::CorrelationMatrix::compute(&dataset, &columns);

        assert_eq!(matrix.columns, vec!["age", "income"]);
        assert_eq!(matrix.data.len(), 2);
        assert!(matrix.data.iter().all(|row| row.len() == 2));
        assert_eq!(matrix.data[0][0], Some(1.0));
        assert_eq!(matrix.data[1][1], Some(1.0));
        let off_diagonal = matrix.data[0][1].unwrap();
        assert_eq!(Some(off_diagonal), matrix.data[1][0]);
        assert!(off_diagonal > 0.9, "age and income rise together");

        let (plotter, _) = recording_plotter();
        let rendered = plotter
            .plot(&dataset, &ChartRequest::new(ChartKind::Heatmap, vec!["age".into(), "income".into()]))
            .unwrap();
        let json = serde_json::to_value(rendered.chart()).unwrap();
        let cells = json["series"][0]["data"].as_array().unwrap().clone();
        assert_eq!(cells.len(), 4);
        for cell in cells {
            let [x, y, value] = [&cell[0], &cell[1], &cell[2]].map(|v| v.as_f64().unwrap());
            if x == y {
                assert_eq!(value, 1.0);
            }
        }
    }

    #[test]
    fn test_zero_variance_column_has_no_correlations() {
        let dataset = parse_csv("a,c\n1,5\n2,5\n3,5\n".as_bytes()).unwrap();
        let columns: Vec<&Column> = ["a", "c"]
            .iter()
            .filter_map(|name| dataset.column(name))
            .collect();
        let matrix = charts::CorrelationMatrix::compute(&dataset, &columns);
        assert_eq!(matrix.data, vec![vec![Some(1.0), None], vec![None, None]]);

        let (plotter, _) = recording_plotter();
        let rendered = plotter
            .plot(&dataset, &ChartRequest::new(ChartKind::Heatmap, vec!["a".into(), "c".into()]))
            .unwrap();
        let cells = chart_json(&rendered)["series"][0]["data"].clone();
        assert_eq!(cells, serde_json::json!([[0.0, 0.0, 1.0]]));
    }

    #[test]
    fn test_labels_reach_the_chart() {
        let (plotter, _) = recording_plotter();
        let rendered = plotter
            .render(
                &people(),
                "scatter",
                &["age", "income"],
                Some("Income by age"),
                Some("Age (years)"),
                Some("Income (EUR)"),
                false,
                None,
            )
            .unwrap();
        let json = chart_json(&rendered);
        assert_eq!(first(&json["title"])["text"], "Income by age");
        assert_eq!(first(&json["xAxis"])["name"], "Age (years)");
        assert_eq!(first(&json["yAxis"])["name"], "Income (EUR)");

        let request = ChartRequest::new(ChartKind::Scatter, vec!["age".into(), "income".into()]);
        let json = chart_json(&plotter.plot(&people(), &request).unwrap());
        assert_eq!(json["title"], Value::Null);
        assert_eq!(first(&json["xAxis"])["name"], "age");
        assert_eq!(first(&json["yAxis"])["name"], "income");
    }

    #[test]
    fn test_fliers_toggle_the_outlier_series() {
        let dataset = parse_csv("v\n1\n2\n3\n4\n5\n100\n".as_bytes()).unwrap();
        let request = ChartRequest::new(ChartKind::Box, vec!["v".into()]);

        let hidden = styled_plotter(StyleConfig::default())
            .plot(&dataset, &request)
            .unwrap();
        assert_eq!(series_types(&hidden), vec!["boxplot"]);

        let shown = styled_plotter(StyleConfig {
            fliers: true,
            ..StyleConfig::default()
        })
        .plot(&dataset, &request)
        .unwrap();
        assert_eq!(series_types(&shown), vec!["boxplot", "scatter"]);
        assert_eq!(
            chart_json(&shown)["series"][1]["data"],
            serde_json::json!([[0.0, 100.0]])
        );
    }

    #[test]
    fn test_scatter_follows_color_marker_and_alpha() {
        let plotter = styled_plotter(StyleConfig {
            color: Some("teal".to_string()),
            marker: Some("s".to_string()),
            alpha: 0.3,
            ..StyleConfig::default()
        });
        let request = ChartRequest::new(ChartKind::Scatter, vec!["age".into(), "income".into()]);
        let json = chart_json(&plotter.plot(&people(), &request).unwrap());

        let series = &json["series"][0];
        assert_eq!(series["symbol"], "rect");
        assert_eq!(series["itemStyle"]["color"], "teal");
        assert_eq!(series["itemStyle"]["opacity"], 0.3);
    }

    #[test]
    fn test_heatmap_uses_the_configured_color_map() {
        let request = ChartRequest::new(ChartKind::Heatmap, vec!["age".into(), "income".into()]);
        let color_range = |style: StyleConfig| {
            let json = chart_json(&styled_plotter(style).plot(&people(), &request).unwrap());
            first(&json["visualMap"])["inRange"]["color"].clone()
        };

        assert_eq!(
            color_range(StyleConfig::default()),
            serde_json::json!(["#3b4cc0", "#8db0fe", "#dddddd", "#f49a7b", "#b40426"])
        );
        assert_eq!(
            color_range(StyleConfig {
                heatmap_cmap: "viridis".to_string(),
                ..StyleConfig::default()
            }),
            serde_json::json!(["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"])
        );
    }

    #[test]
    fn test_bar_allows_text_categories() {
        let (plotter, _) = recording_plotter();
        let rendered = plotter
            .render(&people(), "bar", &["city", "income"], Some("Income by city"), None, None, false, None)
            .unwrap();
        assert_eq!(rendered.figure.title, "Income by city");
    }

    #[test]
    fn test_regression_on_constant_x_fails() {
        let dataset = parse_csv("x,y\n1,2\n1,3\n1,4\n".as_bytes()).unwrap();
        let (plotter, shown) = recording_plotter();
        let err = plotter
            .plot(&dataset, &ChartRequest::new(ChartKind::ScatterReg, vec!["x".into(), "y".into()]))
            .unwrap_err();
        assert!(matches!(err.kind(), DatavizErrorKind::DegenerateRegression { .. }));
        assert!(shown.borrow().is_empty());
    }

    #[test]
    fn test_save_writes_artifact_only_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scatter.html");
        let (plotter, _) = recording_plotter();

        let request = ChartRequest::new(ChartKind::Scatter, vec!["age".into(), "income".into()]);
        let rendered = plotter.plot(&people(), &request).unwrap();
        assert!(rendered.saved_to.is_none());
        assert!(!path.exists());

        let rendered = plotter
            .plot(&people(), &request.save(Some(path.clone())))
            .unwrap();
        assert_eq!(rendered.saved_to.as_deref(), Some(path.as_path()));
        assert!(path.exists(), "saved chart should exist at {}", path.display());
    }

    #[test]
    fn test_save_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.svg");
        let (plotter, _) = recording_plotter();

        let request = ChartRequest::new(ChartKind::Box, vec!["age".into(), "income".into()])
            .save(Some(path.clone()));
        plotter.plot(&people(), &request).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"), "not an svg document: {svg}");
    }

    #[test]
    fn test_unsupported_save_format_is_rejected_before_presenting() {
        let (plotter, shown) = recording_plotter();
        let request = ChartRequest::new(ChartKind::Box, vec!["age".into()])
            .save(Some(PathBuf::from("chart.png")));
        let err = plotter.plot(&people(), &request).unwrap_err();
        assert!(matches!(err.kind(), DatavizErrorKind::UnsupportedOutputFormat { .. }));
        assert!(shown.borrow().is_empty());
    }
}
