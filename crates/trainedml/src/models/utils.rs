//! Conversions between crate types and smartcore inputs, plus label encoding.
use std::collections::BTreeSet;

use ndarray::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::config::Task;
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::Target;

/// Maps class labels to dense `u32` codes in sorted label order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit(labels: &[String]) -> Self {
        let classes: BTreeSet<&String> = labels.iter().collect();
        Self {
            classes: classes.into_iter().cloned().collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, labels: &[String]) -> Result<Vec<u32>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map(|i| i as u32)
                    .map_err(|_| {
                        TrainedMlError::invalid("target", format!("unseen label '{}'", label))
                    })
            })
            .collect()
    }

    pub fn inverse_transform(&self, codes: &[u32]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code as usize).cloned().ok_or_else(|| {
                    TrainedMlError::invalid("predictions", format!("unknown class code {}", code))
                })
            })
            .collect()
    }
}

pub(crate) fn to_dense(x: &Array2<f64>) -> Result<DenseMatrix<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(TrainedMlError::invalid(
            "features",
            format!("feature matrix must be non-empty, got {:?}", x.shape()),
        ));
    }
    let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|row| row.to_vec()).collect();
    Ok(DenseMatrix::from_2d_vec(&rows))
}

/// Shape and task checks shared by every adapter's `fit`.
pub(crate) fn check_fit_inputs(model: &str, task: Task, x: &Array2<f64>, y: &Target) -> Result<()> {
    if y.task() != task {
        return Err(TrainedMlError::TaskMismatch {
            model: model.to_string(),
            expected: task.as_str(),
            found: y.task().as_str(),
        });
    }
    if x.nrows() != y.len() {
        return Err(TrainedMlError::invalid(
            "target",
            format!("{} feature rows but {} target values", x.nrows(), y.len()),
        ));
    }
    Ok(())
}

pub(crate) fn check_n_features(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(TrainedMlError::invalid(
            "features",
            format!("model was fitted on {} features, got {}", expected, x.ncols()),
        ));
    }
    Ok(())
}

pub(crate) fn labels<'a>(model: &str, y: &'a Target) -> Result<&'a [String]> {
    match y {
        Target::Labels(labels) => Ok(labels),
        Target::Values(_) => Err(TrainedMlError::TaskMismatch {
            model: model.to_string(),
            expected: Task::Classification.as_str(),
            found: Task::Regression.as_str(),
        }),
    }
}

pub(crate) fn values(model: &str, y: &Target) -> Result<Vec<f64>> {
    match y {
        Target::Values(values) => Ok(values.clone()),
        Target::Labels(_) => Err(TrainedMlError::TaskMismatch {
            model: model.to_string(),
            expected: Task::Regression.as_str(),
            found: Task::Classification.as_str(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder_sorted_codes() {
        let labels: Vec<String> = ["b", "a", "c", "a"].iter().map(|s| s.to_string()).collect();
        let encoder = LabelEncoder::fit(&labels);
        assert_eq!(encoder.classes(), &["a", "b", "c"]);
        let codes = encoder.transform(&labels).unwrap();
        assert_eq!(codes, vec![1, 0, 2, 0]);
        assert_eq!(encoder.inverse_transform(&codes).unwrap(), labels);
        assert!(encoder.transform(&["z".to_string()]).is_err());
    }

    #[test]
    fn test_to_dense_rejects_empty() {
        assert!(to_dense(&Array2::zeros((0, 3))).is_err());
        assert!(to_dense(&Array2::zeros((2, 3))).is_ok());
    }
}
