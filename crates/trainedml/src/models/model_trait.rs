use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::Task;
use crate::data::table::{Column, Series};
use crate::error::{Result, TrainedMlError};

/// Target values in the form a model consumes and produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Labels(Vec<String>),
    Values(Vec<f64>),
}

impl Target {
    /// Convert a series for the given task. Missing cells are rejected.
    pub fn from_series(series: &Series, task: Task) -> Result<Self> {
        if series.values.missing_count() > 0 {
            return Err(TrainedMlError::invalid(
                "target",
                format!("target column '{}' has missing values", series.name),
            ));
        }
        match (task, &series.values) {
            (Task::Classification, column) => Ok(Target::Labels(
                (0..column.len()).filter_map(|i| column.label_at(i)).collect(),
            )),
            (Task::Regression, Column::Numeric(values)) => {
                Ok(Target::Values(values.iter().flatten().copied().collect()))
            }
            (Task::Regression, Column::Text(_)) => Err(TrainedMlError::invalid(
                "target",
                format!("regression needs a numeric target, '{}' is text", series.name),
            )),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::Labels(v) => v.len(),
            Target::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn task(&self) -> Task {
        match self {
            Target::Labels(_) => Task::Classification,
            Target::Values(_) => Task::Regression,
        }
    }
}

/// Uniform fit / predict / evaluate surface over a wrapped estimator.
///
/// `predict` and `evaluate` fail with [`TrainedMlError::NotFitted`] until `fit`
/// has succeeded.
pub trait Model: Send {
    fn name(&self) -> &str;

    /// Task of the model family; independent of the data it is fitted on.
    fn task(&self) -> Task;

    fn is_fitted(&self) -> bool;

    fn fit(&mut self, x: &Array2<f64>, y: &Target) -> Result<()>;

    /// One prediction per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Target>;

    /// Accuracy for classifiers, R² for regressors.
    fn evaluate(&self, x: &Array2<f64>, y: &Target) -> Result<f64> {
        if !self.is_fitted() {
            return Err(self.not_fitted("evaluate"));
        }
        let predictions = self.predict(x)?;
        crate::evaluation::default_score(y, &predictions)
    }

    fn not_fitted(&self, operation: &'static str) -> TrainedMlError {
        TrainedMlError::NotFitted {
            model: self.name().to_string(),
            operation,
        }
    }
}
