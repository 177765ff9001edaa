//! Stateless exploratory summaries over a [`Table`].
//!
//! Every function validates its column arguments and reports the offending
//! argument and column on failure. Statistics skip missing cells; pairwise
//! measures (correlation) use the rows where both columns are present, and
//! the VIF uses rows where every numeric column is present.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};

use crate::config::Task;
use crate::data::table::{Column, Series, Table};
use crate::data::task::detect_task;
use crate::error::{Result, TrainedMlError};
use crate::evaluation::regression_scores;
use crate::models::utils::to_dense;

/// Significance level used by [`NormalityResult::is_normal`].
pub const NORMALITY_ALPHA: f64 = 0.05;
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// `count, mean, std, min, 25%, 50%, 75%, max` of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Describe {
            column: column.to_string(),
            count: values.len(),
            mean: values.mean(),
            std: values.std_dev(),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn numeric_column<'a>(table: &'a Table, argument: &'static str, name: &str) -> Result<&'a [Option<f64>]> {
    table.require(argument, name)?.as_numeric().ok_or_else(|| {
        TrainedMlError::invalid(argument, format!("column '{}' is not numeric", name))
    })
}

pub fn distribution(table: &Table, columns: Option<&[String]>) -> Result<Vec<Describe>> {
    let names = table.resolve_numeric("columns", columns)?;
    names
        .iter()
        .map(|name| {
            let values = table.require("columns", name)?.numeric_values();
            Ok(Describe::from_values(name, &values))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }

    fn coefficient(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            CorrelationMethod::Pearson => pearson(x, y),
            CorrelationMethod::Spearman => pearson(&average_ranks(x), &average_ranks(y)),
            CorrelationMethod::Kendall => kendall_tau_b(x, y),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationMethod {
    type Err = TrainedMlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            "kendall" => Ok(CorrelationMethod::Kendall),
            other => Err(TrainedMlError::invalid(
                "method",
                format!("unknown correlation method '{}'; expected pearson, spearman or kendall", other),
            )),
        }
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (sx, sy) = (x.std_dev(), y.std_dev());
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }
    x.covariance(y) / (sx * sy)
}

/// 1-based ranks; ties share the mean of the ranks they span.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    Data::new(values.to_vec()).ranks(RankTieBreaker::Average)
}

fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let (mut concordant, mut discordant) = (0.0_f64, 0.0_f64);
    let (mut ties_x, mut ties_y) = (0.0_f64, 0.0_f64);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 {
                ties_x += 1.0;
            }
            if dy == 0.0 {
                ties_y += 1.0;
            }
            if dx != 0.0 && dy != 0.0 {
                if dx.signum() == dy.signum() {
                    concordant += 1.0;
                } else {
                    discordant += 1.0;
                }
            }
        }
    }
    let n0 = (n * n.saturating_sub(1)) as f64 / 2.0;
    let denominator = ((n0 - ties_x) * (n0 - ties_y)).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) / denominator
}

/// Symmetric correlation matrix over a set of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[[i, j]])
    }
}

pub fn correlation(
    table: &Table,
    features: Option<&[String]>,
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    let names = table.resolve_numeric("features", features)?;
    if names.is_empty() {
        return Err(TrainedMlError::invalid("features", "no numeric columns to correlate"));
    }
    let columns: Vec<&[Option<f64>]> = names
        .iter()
        .map(|name| numeric_column(table, "features", name))
        .collect::<Result<_>>()?;

    let k = names.len();
    let mut values = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                .iter()
                .zip(columns[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            let r = method.coefficient(&x, &y);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }
    log::debug!("Computed {} correlation over {} columns", method, k);
    Ok(CorrelationMatrix {
        method,
        columns: names,
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSummary {
    pub column: String,
    pub missing: usize,
    pub percent: f64,
}

pub fn missing(table: &Table) -> Vec<MissingSummary> {
    let n = table.nrows();
    table
        .iter()
        .map(|(name, column)| {
            let count = column.missing_count();
            MissingSummary {
                column: name.to_string(),
                missing: count,
                percent: if n == 0 { 0.0 } else { 100.0 * count as f64 / n as f64 },
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Outside `[Q1 - k * IQR, Q3 + k * IQR]`.
    #[default]
    Iqr,
    /// More than `k` sample standard deviations away from the mean.
    ZScore,
}

impl OutlierMethod {
    pub fn default_threshold(&self) -> f64 {
        match self {
            OutlierMethod::Iqr => DEFAULT_IQR_FACTOR,
            OutlierMethod::ZScore => DEFAULT_ZSCORE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    /// Row positions of the outliers in the table.
    pub rows: Vec<usize>,
    pub values: Vec<f64>,
}

impl OutlierSummary {
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

pub fn outliers(table: &Table, method: OutlierMethod, threshold: Option<f64>) -> Result<Vec<OutlierSummary>> {
    let k = threshold.unwrap_or_else(|| method.default_threshold());
    if !(k.is_finite() && k > 0.0) {
        return Err(TrainedMlError::invalid(
            "threshold",
            format!("must be a positive number, got {}", k),
        ));
    }

    let mut out = Vec::new();
    for name in table.numeric_column_names() {
        let cells = numeric_column(table, "columns", &name)?;
        let present: Vec<f64> = cells.iter().flatten().copied().collect();
        if present.is_empty() {
            continue;
        }
        let (lower, upper) = match method {
            OutlierMethod::Iqr => {
                let mut sorted = present.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                let q1 = quantile_sorted(&sorted, 0.25);
                let q3 = quantile_sorted(&sorted, 0.75);
                let iqr = q3 - q1;
                (q1 - k * iqr, q3 + k * iqr)
            }
            OutlierMethod::ZScore => {
                let m = present.as_slice().mean();
                let s = present.as_slice().std_dev();
                (m - k * s, m + k * s)
            }
        };

        let mut rows = Vec::new();
        let mut values = Vec::new();
        for (row, cell) in cells.iter().enumerate() {
            if let Some(v) = cell {
                if *v < lower || *v > upper {
                    rows.push(row);
                    values.push(*v);
                }
            }
        }
        out.push(OutlierSummary {
            column: name,
            lower,
            upper,
            rows,
            values,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSummary {
    /// Class counts, most frequent first.
    Categorical { column: String, counts: Vec<(String, usize)> },
    Numeric(Describe),
}

pub fn class_counts(column: &Column) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in (0..column.len()).filter_map(|i| column.label_at(i)) {
        *counts.entry(label).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

pub fn target(table: &Table, column: &str) -> Result<TargetSummary> {
    let values = table.require("target_column", column)?;
    let series = Series::new(column, values.clone());
    Ok(match detect_task(&series) {
        Task::Classification => TargetSummary::Categorical {
            column: column.to_string(),
            counts: class_counts(values),
        },
        Task::Regression => TargetSummary::Numeric(Describe::from_values(column, &values.numeric_values())),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    pub column: String,
    pub n: usize,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution).
    pub kurtosis: f64,
    /// D'Agostino-Pearson omnibus statistic; needs at least 8 observations.
    pub k2: Option<f64>,
    pub k2_pvalue: Option<f64>,
    pub jarque_bera: f64,
    pub jb_pvalue: f64,
    pub is_normal: bool,
}

/// Biased sample skewness and excess kurtosis.
fn moments(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let m = values.mean();
    let m2 = values.population_variance();
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / n;
    if m2 == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
}

fn skew_z(skewness: f64, n: f64) -> f64 {
    let y = skewness * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    delta * (y / alpha + ((y / alpha).powi(2) + 1.0).sqrt()).ln()
}

fn kurtosis_z(excess: f64, n: f64) -> f64 {
    let b2 = excess + 3.0;
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / sqrt_beta1.powi(2)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

fn chi2_sf(statistic: f64, chi2: &ChiSquared) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    chi2.sf(statistic)
}

pub fn normality(table: &Table, columns: Option<&[String]>) -> Result<Vec<NormalityResult>> {
    let names = table.resolve_numeric("columns", columns)?;
    let chi2 = ChiSquared::new(2.0).map_err(|e| TrainedMlError::invalid("columns", e.to_string()))?;

    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let values = table.require("columns", &name)?.numeric_values();
        let n = values.len();
        if n < 3 {
            return Err(TrainedMlError::invalid(
                "columns",
                format!("column '{}' needs at least 3 values for a normality test, has {}", name, n),
            ));
        }
        let nf = n as f64;
        let (skewness, kurtosis) = moments(&values);

        let jarque_bera = nf / 6.0 * (skewness.powi(2) + kurtosis.powi(2) / 4.0);
        let jb_pvalue = chi2_sf(jarque_bera, &chi2);

        let (k2, k2_pvalue) = if n >= 8 && skewness.is_finite() {
            let k2 = skew_z(skewness, nf).powi(2) + kurtosis_z(kurtosis, nf).powi(2);
            (Some(k2), Some(chi2_sf(k2, &chi2)))
        } else {
            (None, None)
        };

        let p = k2_pvalue.unwrap_or(jb_pvalue);
        out.push(NormalityResult {
            column: name,
            n,
            skewness,
            kurtosis,
            k2,
            k2_pvalue,
            jarque_bera,
            jb_pvalue,
            is_normal: p.is_finite() && p > NORMALITY_ALPHA,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VifEntry {
    pub column: String,
    /// `1 / (1 - R²)`; infinite under perfect collinearity.
    pub vif: f64,
}

fn r_squared_against_others(matrix: &Array2<f64>, column: usize) -> f64 {
    let y: Vec<f64> = matrix.column(column).to_vec();
    let others = matrix.select(
        Axis(1),
        &(0..matrix.ncols()).filter(|&c| c != column).collect::<Vec<_>>(),
    );
    let fit = to_dense(&others).and_then(|x: DenseMatrix<f64>| {
        let parameters =
            LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
        let model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
            LinearRegression::fit(&x, &y, parameters)
                .map_err(|e| TrainedMlError::estimator("vif", e))?;
        let predictions = model
            .predict(&x)
            .map_err(|e| TrainedMlError::estimator("vif", e))?;
        Ok(regression_scores(&y, &predictions)?.r2)
    });
    match fit {
        Ok(r2) => r2,
        Err(e) => {
            log::debug!("VIF regression failed, treating column as collinear: {}", e);
            1.0
        }
    }
}

pub fn multicollinearity(table: &Table) -> Result<Vec<VifEntry>> {
    let names = table.numeric_column_names();
    if names.len() < 2 {
        return Err(TrainedMlError::invalid(
            "columns",
            "variance inflation factors need at least two numeric columns",
        ));
    }
    let matrix = table.complete_rows(&names)?;
    if matrix.nrows() <= names.len() {
        return Err(TrainedMlError::invalid(
            "columns",
            format!(
                "{} complete rows are too few for {} numeric columns",
                matrix.nrows(),
                names.len()
            ),
        ));
    }

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(j, column)| {
            let r2 = r_squared_against_others(&matrix, j);
            let vif = if r2 >= 1.0 - 1e-12 { f64::INFINITY } else { 1.0 / (1.0 - r2) };
            VifEntry { column, vif }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub count: usize,
    pub missing: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Whole-table overview rendered by [`crate::report::html::profile_report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub nrows: usize,
    pub ncols: usize,
    pub columns: Vec<ColumnProfile>,
}

impl Profile {
    pub fn to_html(&self) -> String {
        crate::report::html::profile_report(self).into_string()
    }
}

pub fn profiling(table: &Table) -> Profile {
    let columns = table
        .iter()
        .map(|(name, column)| {
            let missing = column.missing_count();
            let mut profile = ColumnProfile {
                name: name.to_string(),
                dtype: column.dtype().to_string(),
                count: column.len() - missing,
                missing,
                unique: column.n_unique(),
                top: None,
                freq: None,
                mean: None,
                std: None,
                min: None,
                max: None,
            };
            match column {
                Column::Text(_) => {
                    if let Some((label, count)) = class_counts(column).into_iter().next() {
                        profile.top = Some(label);
                        profile.freq = Some(count);
                    }
                }
                Column::Numeric(_) => {
                    let values = column.numeric_values();
                    if !values.is_empty() {
                        let d = Describe::from_values(name, &values);
                        profile.mean = Some(d.mean);
                        profile.std = Some(d.std);
                        profile.min = Some(d.min);
                        profile.max = Some(d.max);
                    }
                }
            }
            profile
        })
        .collect();
    Profile {
        nrows: table.nrows(),
        ncols: table.ncols(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(values: &[f64]) -> Column {
        Column::Numeric(values.iter().map(|v| Some(*v)).collect())
    }

    fn table() -> Table {
        Table::new(vec![
            ("a".to_string(), numeric(&[1.0, 2.0, 3.0, 4.0, 5.0])),
            ("b".to_string(), numeric(&[2.0, 4.0, 6.0, 8.0, 10.0])),
            ("c".to_string(), numeric(&[5.0, 3.0, 4.0, 1.0, 2.0])),
            (
                "label".to_string(),
                Column::Text(vec![
                    Some("x".into()),
                    Some("y".into()),
                    Some("x".into()),
                    None,
                    Some("x".into()),
                ]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_describe_matches_linear_quantiles() {
        let d = &distribution(&table(), Some(&["a".to_string()])).unwrap()[0];
        assert_eq!(d.count, 5);
        assert_eq!(d.mean, 3.0);
        assert!((d.std - 2.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!((d.min, d.q25, d.median, d.q75, d.max), (1.0, 2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn test_unknown_or_text_column_rejected() {
        let err = distribution(&table(), Some(&["nope".to_string()])).unwrap_err();
        assert!(matches!(err, TrainedMlError::UnknownColumn { argument: "columns", .. }));
        assert!(distribution(&table(), Some(&["label".to_string()])).is_err());
    }

    #[test]
    fn test_correlation_methods() {
        let t = table();
        let pearson = correlation(&t, None, CorrelationMethod::Pearson).unwrap();
        assert_eq!(pearson.columns, vec!["a", "b", "c"]);
        assert!((pearson.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson.get("a", "a").unwrap() - 1.0).abs() < 1e-12);

        let spearman = correlation(&t, None, CorrelationMethod::Spearman).unwrap();
        assert!((spearman.get("a", "c").unwrap() + 0.8).abs() < 1e-12);

        // a vs c: 2 concordant, 8 discordant pairs.
        let kendall = correlation(&t, None, CorrelationMethod::Kendall).unwrap();
        assert!((kendall.get("a", "c").unwrap() + 0.6).abs() < 1e-12);

        assert!("matplotlib".parse::<CorrelationMethod>().is_err());
    }

    #[test]
    fn test_average_ranks_share_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_missing_percentages() {
        let report = missing(&table());
        let label = report.iter().find(|m| m.column == "label").unwrap();
        assert_eq!(label.missing, 1);
        assert!((label.percent - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_iqr_outliers() {
        let t = Table::new(vec![(
            "v".to_string(),
            numeric(&[10.0, 11.0, 12.0, 11.0, 10.0, 12.0, 11.0, 95.0]),
        )])
        .unwrap();
        let found = outliers(&t, OutlierMethod::Iqr, None).unwrap();
        assert_eq!(found[0].rows, vec![7]);
        assert_eq!(found[0].values, vec![95.0]);
        assert!(outliers(&t, OutlierMethod::ZScore, Some(0.0)).is_err());
    }

    #[test]
    fn test_target_summary() {
        match target(&table(), "label").unwrap() {
            TargetSummary::Categorical { counts, .. } => {
                assert_eq!(counts[0], ("x".to_string(), 3));
            }
            other => panic!("expected categorical summary, got {:?}", other),
        }
        let c = Table::new(vec![("y".to_string(), numeric(&[0.5, 1.25, 2.75]))]).unwrap();
        assert!(matches!(target(&c, "y").unwrap(), TargetSummary::Numeric(_)));
    }

    #[test]
    fn test_normality_of_symmetric_sample() {
        let values: Vec<f64> = (0..50).map(|i| ((i as f64 + 0.5) / 50.0 - 0.5) * 2.0).collect();
        let t = Table::new(vec![("u".to_string(), numeric(&values))]).unwrap();
        let result = &normality(&t, None).unwrap()[0];
        assert_eq!(result.n, 50);
        assert!(result.skewness.abs() < 1e-9);
        // A uniform sample is platykurtic.
        assert!(result.kurtosis < -1.0);
        assert!(result.k2.is_some());
        assert!(result.jb_pvalue > 0.0 && result.jb_pvalue <= 1.0);
    }

    #[test]
    fn test_vif_of_orthogonal_columns_is_one() {
        let cols: Vec<(String, Column)> = (0..3)
            .map(|k| {
                let values: Vec<f64> = (0..16).map(|i| ((i >> k) & 1) as f64).collect();
                (format!("f{}", k), numeric(&values))
            })
            .collect();
        let vifs = multicollinearity(&Table::new(cols).unwrap()).unwrap();
        assert_eq!(vifs.len(), 3);
        for entry in vifs {
            assert!((entry.vif - 1.0).abs() < 1e-6, "{} vif = {}", entry.column, entry.vif);
        }
    }

    #[test]
    fn test_profile_columns() {
        let profile = profiling(&table());
        assert_eq!((profile.nrows, profile.ncols), (5, 4));
        let label = &profile.columns[3];
        assert_eq!(label.dtype, "text");
        assert_eq!(label.top.as_deref(), Some("x"));
        assert_eq!(label.freq, Some(3));
        assert_eq!(profile.columns[0].mean, Some(3.0));
        assert!(profile.to_html().contains("label"));
    }
}
