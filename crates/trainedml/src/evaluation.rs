//! Metric sets reported by the trainer and the benchmark runner.
//!
//! Classification uses accuracy plus support-weighted precision, recall and F1;
//! a class with an empty denominator contributes 0 instead of failing.
//! Regression uses R², MSE, RMSE and MAE.
use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::Task;
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::Target;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RegressionScores {
    pub r2: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Scores {
    Classification(ClassificationScores),
    Regression(RegressionScores),
}

impl Scores {
    pub fn task(&self) -> Task {
        match self {
            Scores::Classification(_) => Task::Classification,
            Scores::Regression(_) => Task::Regression,
        }
    }

    /// Metric name/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        match self {
            Scores::Classification(s) => vec![
                ("accuracy", s.accuracy),
                ("precision", s.precision),
                ("recall", s.recall),
                ("f1", s.f1),
            ],
            Scores::Regression(s) => vec![
                ("r2", s.r2),
                ("mse", s.mse),
                ("rmse", s.rmse),
                ("mae", s.mae),
            ],
        }
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == metric)
            .map(|(_, value)| value)
    }

    /// The metric models are ranked by: accuracy or R².
    pub fn primary(&self) -> (&'static str, f64) {
        match self {
            Scores::Classification(s) => ("accuracy", s.accuracy),
            Scores::Regression(s) => ("r2", s.r2),
        }
    }
}

fn check_lengths(true_len: usize, pred_len: usize) -> Result<()> {
    if true_len != pred_len {
        return Err(TrainedMlError::invalid(
            "y_pred",
            format!("expected {} predictions, got {}", true_len, pred_len),
        ));
    }
    if true_len == 0 {
        return Err(TrainedMlError::invalid("y_true", "cannot score an empty sequence"));
    }
    Ok(())
}

#[derive(Default)]
struct ClassCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
    support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Accuracy and weighted precision / recall / F1 over the union of observed labels.
pub fn evaluate_all<T: Eq + Hash>(y_true: &[T], y_pred: &[T]) -> Result<ClassificationScores> {
    check_lengths(y_true.len(), y_pred.len())?;

    let mut counts: HashMap<&T, ClassCounts> = HashMap::new();
    let mut correct = 0;
    for (t, p) in y_true.iter().zip(y_pred) {
        counts.entry(t).or_default().support += 1;
        if t == p {
            correct += 1;
            counts.entry(t).or_default().tp += 1;
        } else {
            counts.entry(t).or_default().fn_ += 1;
            counts.entry(p).or_default().fp += 1;
        }
    }

    let total = y_true.len() as f64;
    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
    for c in counts.values() {
        let weight = c.support as f64 / total;
        let p = ratio(c.tp, c.tp + c.fp);
        let r = ratio(c.tp, c.tp + c.fn_);
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
        precision += weight * p;
        recall += weight * r;
        f1 += weight * f;
    }

    Ok(ClassificationScores {
        accuracy: correct as f64 / total,
        precision,
        recall,
        f1,
    })
}

pub fn regression_scores(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionScores> {
    check_lengths(y_true.len(), y_pred.len())?;
    let n = y_true.len() as f64;
    let mean = y_true.iter().sum::<f64>() / n;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let mae = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / n;

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };
    let mse = ss_res / n;

    Ok(RegressionScores {
        r2,
        mse,
        rmse: mse.sqrt(),
        mae,
    })
}

/// Task-appropriate metric set for a pair of targets.
pub fn score(y_true: &Target, y_pred: &Target) -> Result<Scores> {
    match (y_true, y_pred) {
        (Target::Labels(t), Target::Labels(p)) => evaluate_all(t, p).map(Scores::Classification),
        (Target::Values(t), Target::Values(p)) => regression_scores(t, p).map(Scores::Regression),
        _ => Err(TrainedMlError::TaskMismatch {
            model: "evaluation".to_string(),
            expected: y_true.task().as_str(),
            found: y_pred.task().as_str(),
        }),
    }
}

/// Accuracy for labels, R² for values.
pub fn default_score(y_true: &Target, y_pred: &Target) -> Result<f64> {
    score(y_true, y_pred).map(|s| s.primary().1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_binary_reference_values() {
        let scores = evaluate_all(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap();
        assert!(close(scores.accuracy, 0.75));
        assert!(close(scores.precision, (2.0 / 3.0 * 2.0 + 2.0) / 4.0));
        assert!(close(scores.recall, 0.75));
        assert!(close(scores.f1, (0.8 * 2.0 + 2.0 / 3.0 * 2.0) / 4.0));

        let entries = Scores::Classification(scores).entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|(_, v)| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_zero_division_resolves_to_zero() {
        // "c" is never predicted correctly and "b" never appears in y_true.
        let scores = evaluate_all(&["a", "c"], &["a", "b"]).unwrap();
        assert!(close(scores.accuracy, 0.5));
        assert!(close(scores.precision, 0.5));
        assert!(close(scores.recall, 0.5));
        assert!(close(scores.f1, 0.5));
    }

    #[test]
    fn test_length_mismatch_fails() {
        assert!(evaluate_all(&[1, 2], &[1]).is_err());
        assert!(evaluate_all::<u8>(&[], &[]).is_err());
    }

    #[test]
    fn test_regression_scores() {
        let scores = regression_scores(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
        assert!(close(scores.mse, 1.0 / 3.0));
        assert!(close(scores.mae, 1.0 / 3.0));
        assert!(close(scores.r2, 0.5));

        let constant = regression_scores(&[2.0, 2.0], &[2.0, 2.0]).unwrap();
        assert_eq!(constant.r2, 1.0);
    }

    #[test]
    fn test_score_rejects_mixed_targets() {
        let t = Target::Labels(vec!["a".into()]);
        let p = Target::Values(vec![1.0]);
        assert!(score(&t, &p).is_err());
    }
}
