//! Figure builders for exploratory plots and benchmark comparisons.
//!
//! Each builder validates its column arguments against the table and returns a
//! [`Figure`] with the default backend; callers pick another with
//! [`Figure::with_backend`].
use itertools_num::linspace;
use plotly::box_plot::BoxPoints;
use plotly::common::{DashType, Line, Mode};
use plotly::histogram::HistNorm;
use plotly::layout::{Axis, BarMode, BoxMode, Layout};
use plotly::{Bar, BoxPlot, HeatMap, Histogram, Plot, Scatter};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use crate::analysis::{self, class_counts, CorrelationMethod};
use crate::benchmark::BenchmarkResults;
use crate::config::Task;
use crate::data::table::{Column, Series, Table};
use crate::data::task::detect_task;
use crate::error::{Result, TrainedMlError};
use crate::report::figure::Figure;

fn numeric_cells<'a>(table: &'a Table, argument: &'static str, name: &str) -> Result<&'a [Option<f64>]> {
    table.require(argument, name)?.as_numeric().ok_or_else(|| {
        TrainedMlError::invalid(argument, format!("column '{}' is not numeric", name))
    })
}

/// Rows where both columns are present, in table order.
fn paired(table: &Table, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = numeric_cells(table, "x_column", x)?;
    let ys = numeric_cells(table, "y_column", y)?;
    Ok(xs
        .iter()
        .zip(ys)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip())
}

fn check_bins(bins: usize) -> Result<()> {
    if bins == 0 {
        return Err(TrainedMlError::invalid("bins", "must be a positive integer"));
    }
    Ok(())
}

/// Correlation heatmap; `mask` hides the upper triangle and the diagonal.
pub fn heatmap(
    table: &Table,
    features: Option<&[String]>,
    method: CorrelationMethod,
    mask: bool,
) -> Result<Figure> {
    let corr = analysis::correlation(table, features, method)?;
    let k = corr.columns.len();
    let z: Vec<Vec<Option<f64>>> = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    if mask && j >= i {
                        None
                    } else {
                        Some(corr.values[[i, j]])
                    }
                })
                .collect()
        })
        .collect();

    let mut plot = Plot::new();
    plot.add_trace(HeatMap::new(corr.columns.clone(), corr.columns.clone(), z));
    plot.set_layout(Layout::new().title(format!("Correlation matrix ({})", method).as_str()));
    Ok(Figure::new(plot))
}

/// Overlaid histograms of the selected numeric columns (all of them when `None`).
pub fn histogram(table: &Table, columns: Option<&[String]>, legend: bool, bins: usize) -> Result<Figure> {
    check_bins(bins)?;
    let names = table.resolve_numeric("columns", columns)?;

    let mut plot = Plot::new();
    for name in &names {
        let values = table.require("columns", name)?.numeric_values();
        plot.add_trace(
            Histogram::new(values)
                .name(name.as_str())
                .n_bins_x(bins)
                .opacity(0.7),
        );
    }
    plot.set_layout(
        Layout::new()
            .title("Histogram")
            .bar_mode(BarMode::Overlay)
            .show_legend(legend && names.len() > 1)
            .x_axis(Axis::new().title("Value"))
            .y_axis(Axis::new().title("Frequency")),
    );
    Ok(Figure::new(plot))
}

pub fn line(table: &Table, x: &str, y: &str) -> Result<Figure> {
    let (xs, ys) = paired(table, x, y)?;
    let mut plot = Plot::new();
    plot.add_trace(Scatter::new(xs, ys).mode(Mode::LinesMarkers).name(y));
    plot.set_layout(
        Layout::new()
            .title(format!("{} as a function of {}", y, x).as_str())
            .x_axis(Axis::new().title(x))
            .y_axis(Axis::new().title(y)),
    );
    Ok(Figure::new(plot))
}

/// Density-normalized histograms, one per column, for comparing shapes.
pub fn distribution_plot(table: &Table, columns: Option<&[String]>, bins: usize) -> Result<Figure> {
    check_bins(bins)?;
    let names = table.resolve_numeric("columns", columns)?;
    let mut plot = Plot::new();
    for name in &names {
        let values = table.require("columns", name)?.numeric_values();
        plot.add_trace(
            Histogram::new(values)
                .name(name.as_str())
                .n_bins_x(bins)
                .hist_norm(HistNorm::ProbabilityDensity)
                .opacity(0.6),
        );
    }
    plot.set_layout(
        Layout::new()
            .title("Distributions")
            .bar_mode(BarMode::Overlay)
            .y_axis(Axis::new().title("Density")),
    );
    Ok(Figure::new(plot))
}

/// One box per column, or per column and group of `by` when given.
pub fn boxplot(table: &Table, columns: Option<&[String]>, by: Option<&str>) -> Result<Figure> {
    let mut names = table.resolve_numeric("columns", columns)?;
    let groups = by.map(|b| table.require("by", b)).transpose()?;
    if let Some(b) = by {
        names.retain(|n| n != b);
    }

    let mut plot = Plot::new();
    for name in &names {
        let cells = numeric_cells(table, "columns", name)?;
        match groups {
            None => {
                let values: Vec<f64> = cells.iter().flatten().copied().collect();
                plot.add_trace(BoxPlot::new(values).name(name.as_str()));
            }
            Some(group_column) => {
                let (labels, values): (Vec<String>, Vec<f64>) = cells
                    .iter()
                    .enumerate()
                    .filter_map(|(row, cell)| Some((group_column.label_at(row)?, (*cell)?)))
                    .unzip();
                plot.add_trace(BoxPlot::new_xy(labels, values).name(name.as_str()));
            }
        }
    }

    let mut layout = Layout::new().title("Boxplots");
    if let Some(b) = by {
        layout = layout.box_mode(BoxMode::Group).x_axis(Axis::new().title(b));
    }
    plot.set_layout(layout);
    Ok(Figure::new(plot))
}

/// Fit `y = a + b x` and evaluate it on `grid`.
fn least_squares(xs: &[f64], ys: &[f64], grid: &[f64]) -> Result<Vec<f64>> {
    let x = DenseMatrix::new(xs.len(), 1, xs.to_vec(), true);
    let parameters =
        LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::QR);
    let model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
        LinearRegression::fit(&x, &ys.to_vec(), parameters)
            .map_err(|e| TrainedMlError::estimator("bivariate", e))?;
    model
        .predict(&DenseMatrix::new(grid.len(), 1, grid.to_vec(), true))
        .map_err(|e| TrainedMlError::estimator("bivariate", e))
}

/// Scatter of `y` against `x` with its least-squares line.
pub fn bivariate(table: &Table, x: &str, y: &str) -> Result<Figure> {
    let (xs, ys) = paired(table, x, y)?;
    if xs.len() < 2 {
        return Err(TrainedMlError::invalid(
            "x_column",
            format!("'{}' and '{}' share fewer than two complete rows", x, y),
        ));
    }
    let mut plot = Plot::new();
    if xs.as_slice().std_dev() > 0.0 {
        let lo = Statistics::min(xs.as_slice());
        let hi = Statistics::max(xs.as_slice());
        let fit_x: Vec<f64> = linspace(lo, hi, 50).collect();
        match least_squares(&xs, &ys, &fit_x) {
            Ok(fit_y) => {
                plot.add_trace(
                    Scatter::new(fit_x, fit_y)
                        .mode(Mode::Lines)
                        .name("Least squares")
                        .line(Line::new().color("red")),
                );
            }
            Err(e) => log::debug!("[trainedml::plots] No fit line for {} vs {}: {}", y, x, e),
        }
    }
    plot.add_trace(Scatter::new(xs, ys).mode(Mode::Markers).name(format!("{} vs {}", y, x).as_str()));
    plot.set_layout(
        Layout::new()
            .title(format!("{} vs {}", y, x).as_str())
            .x_axis(Axis::new().title(x))
            .y_axis(Axis::new().title(y)),
    );
    Ok(Figure::new(plot))
}

/// Standardized sample quantiles against standard normal quantiles (Blom positions).
pub fn qq_plot(table: &Table, columns: Option<&[String]>) -> Result<Figure> {
    let names = table.resolve_numeric("columns", columns)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| TrainedMlError::invalid("columns", e.to_string()))?;

    let mut plot = Plot::new();
    let mut extent: f64 = 0.0;
    for name in &names {
        let mut values = table.require("columns", name)?.numeric_values();
        if values.len() < 2 {
            continue;
        }
        let n = values.len() as f64;
        let mean = values.as_slice().mean();
        let std = values.as_slice().std_dev();
        if std == 0.0 {
            continue;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let sample: Vec<f64> = values.iter().map(|v| (v - mean) / std).collect();
        let theoretical: Vec<f64> = (0..values.len())
            .map(|i| normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (n + 0.25)))
            .collect();
        extent = theoretical
            .iter()
            .chain(&sample)
            .fold(extent, |acc, v| acc.max(v.abs()));
        plot.add_trace(Scatter::new(theoretical, sample).mode(Mode::Markers).name(name.as_str()));
    }
    if extent > 0.0 {
        plot.add_trace(
            Scatter::new(vec![-extent, extent], vec![-extent, extent])
                .mode(Mode::Lines)
                .name("y = x")
                .line(Line::new().color("red").dash(DashType::Dash)),
        );
    }
    plot.set_layout(
        Layout::new()
            .title("Normal Q-Q plot")
            .x_axis(Axis::new().title("Theoretical quantiles"))
            .y_axis(Axis::new().title("Standardized sample quantiles")),
    );
    Ok(Figure::new(plot))
}

pub fn missing_plot(table: &Table) -> Figure {
    let summary = analysis::missing(table);
    let names: Vec<String> = summary.iter().map(|m| m.column.clone()).collect();
    let percents: Vec<f64> = summary.iter().map(|m| m.percent).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(names, percents).name("Missing"));
    plot.set_layout(
        Layout::new()
            .title("Missing values")
            .y_axis(Axis::new().title("Missing (%)")),
    );
    Figure::new(plot)
}

pub fn vif_plot(table: &Table) -> Result<Figure> {
    let vifs = analysis::multicollinearity(table)?;
    let names: Vec<String> = vifs.iter().map(|v| v.column.clone()).collect();
    // JSON has no infinity; perfectly collinear columns render as gaps.
    let values: Vec<Option<f64>> = vifs
        .iter()
        .map(|v| v.vif.is_finite().then_some(v.vif))
        .collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(names, values).name("VIF"));
    plot.set_layout(
        Layout::new()
            .title("Variance inflation factors")
            .y_axis(Axis::new().title("VIF")),
    );
    Ok(Figure::new(plot))
}

/// Class counts for a categorical target, a histogram for a continuous one.
pub fn target_plot(table: &Table, column: &str) -> Result<Figure> {
    let values = table.require("target_column", column)?;
    let mut plot = Plot::new();
    match detect_task(&Series::new(column, values.clone())) {
        Task::Classification => {
            let (labels, counts): (Vec<String>, Vec<usize>) = class_counts(values).into_iter().unzip();
            plot.add_trace(Bar::new(labels, counts).name(column));
            plot.set_layout(
                Layout::new()
                    .title(format!("Class counts of {}", column).as_str())
                    .y_axis(Axis::new().title("Count")),
            );
        }
        Task::Regression => {
            plot.add_trace(Histogram::new(values.numeric_values()).name(column));
            plot.set_layout(
                Layout::new()
                    .title(format!("Distribution of {}", column).as_str())
                    .x_axis(Axis::new().title(column))
                    .y_axis(Axis::new().title("Frequency")),
            );
        }
    }
    Ok(Figure::new(plot))
}

/// Boxplots of every numeric column with the points beyond the whiskers drawn.
pub fn outlier_plot(table: &Table) -> Figure {
    let mut plot = Plot::new();
    for (name, column) in table.iter() {
        if let Column::Numeric(_) = column {
            plot.add_trace(
                BoxPlot::new(column.numeric_values())
                    .name(name)
                    .box_points(BoxPoints::Outliers),
            );
        }
    }
    plot.set_layout(Layout::new().title("Outliers"));
    Figure::new(plot)
}

/// Grouped bars of every metric for each successful model.
pub fn benchmark_plot(results: &BenchmarkResults) -> Figure {
    let ranking = results.ranking();
    let models: Vec<String> = ranking.iter().map(|(name, _)| name.to_string()).collect();

    let mut plot = Plot::new();
    if let Some((_, first)) = ranking.first() {
        for (metric, _) in first.scores.entries() {
            let values: Vec<f64> = ranking
                .iter()
                .map(|(_, run)| run.scores.get(metric).unwrap_or(f64::NAN))
                .collect();
            plot.add_trace(Bar::new(models.clone(), values).name(metric));
        }
    }
    plot.set_layout(
        Layout::new()
            .title("Benchmark")
            .bar_mode(BarMode::Group)
            .x_axis(Axis::new().title("Model"))
            .y_axis(Axis::new().title("Score")),
    );
    Figure::new(plot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let n = 12;
        Table::new(vec![
            ("a".to_string(), Column::Numeric((0..n).map(|i| Some(i as f64)).collect())),
            (
                "b".to_string(),
                Column::Numeric((0..n).map(|i| if i == 3 { None } else { Some((i * i) as f64) }).collect()),
            ),
            (
                "group".to_string(),
                Column::Text((0..n).map(|i| Some(if i % 2 == 0 { "even" } else { "odd" }.to_string())).collect()),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_histogram_validates_arguments() {
        let t = table();
        assert!(histogram(&t, None, true, 10).is_ok());
        assert!(histogram(&t, None, true, 0).is_err());
        let err = histogram(&t, Some(&["missing".to_string()]), false, 5).unwrap_err();
        assert!(matches!(err, TrainedMlError::UnknownColumn { argument: "columns", .. }));
    }

    #[test]
    fn test_heatmap_masks_upper_triangle() {
        let fig = heatmap(&table(), None, CorrelationMethod::Spearman, true).unwrap();
        let json = fig.to_json();
        assert!(json.contains("heatmap"));
        assert!(json.contains("null"));
    }

    #[test]
    fn test_line_and_bivariate_need_numeric_columns() {
        let t = table();
        assert!(line(&t, "a", "b").is_ok());
        assert!(bivariate(&t, "a", "b").is_ok());
        assert!(line(&t, "a", "group").is_err());
        assert!(bivariate(&t, "nope", "b").is_err());
    }

    #[test]
    fn test_least_squares_line_through_exact_points() {
        let fit = least_squares(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0], &[0.0, 10.0]).unwrap();
        assert!((fit[0] - 1.0).abs() < 1e-9);
        assert!((fit[1] - 21.0).abs() < 1e-9);

        let flat = Table::new(vec![
            ("x".to_string(), Column::Numeric(vec![Some(2.0); 4])),
            ("y".to_string(), Column::Numeric(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])),
        ])
        .unwrap();
        assert!(!bivariate(&flat, "x", "y").unwrap().to_json().contains("Least squares"));
    }

    #[test]
    fn test_remaining_builders() {
        let t = table();
        assert!(boxplot(&t, None, Some("group")).is_ok());
        assert!(boxplot(&t, None, Some("nope")).is_err());
        assert!(qq_plot(&t, None).is_ok());
        assert!(distribution_plot(&t, None, 5).is_ok());
        assert!(target_plot(&t, "group").unwrap().to_json().contains("even"));
        assert!(missing_plot(&t).to_json().contains("Missing"));
        assert!(outlier_plot(&t).to_json().contains("outliers"));
    }
}
