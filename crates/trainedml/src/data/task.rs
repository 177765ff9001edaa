use crate::config::Task;
use crate::data::table::{Column, Series};

/// Largest number of distinct integer values still treated as class labels.
pub const DEFAULT_MAX_CLASSES: usize = 20;

/// Guess the learning task from a target column, using [`DEFAULT_MAX_CLASSES`].
pub fn detect_task(target: &Series) -> Task {
    detect_task_with_threshold(target, DEFAULT_MAX_CLASSES)
}

/// Text targets are classification. Numeric targets are classification only when
/// complete, integer-valued and with at most `max_classes` distinct values.
pub fn detect_task_with_threshold(target: &Series, max_classes: usize) -> Task {
    match &target.values {
        Column::Text(_) => Task::Classification,
        Column::Numeric(values) => {
            let integral = values
                .iter()
                .all(|v| matches!(v, Some(x) if x.is_finite() && x.fract() == 0.0));
            if integral && target.values.n_unique() <= max_classes {
                Task::Classification
            } else {
                Task::Regression
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_classification() {
        let s = Series::new(
            "species",
            Column::Text(vec![Some("setosa".into()), Some("virginica".into())]),
        );
        assert_eq!(detect_task(&s), Task::Classification);
    }

    #[test]
    fn test_small_integer_is_classification() {
        let s = Series::new("class", Column::Numeric((0..30).map(|i| Some((i % 3) as f64)).collect()));
        assert_eq!(detect_task(&s), Task::Classification);
    }

    #[test]
    fn test_continuous_is_regression() {
        let s = Series::new("y", Column::Numeric((0..1000).map(|i| Some(i as f64 * 0.37)).collect()));
        assert_eq!(detect_task(&s), Task::Regression);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let s = Series::new("y", Column::Numeric((0..30).map(|i| Some(i as f64)).collect()));
        assert_eq!(detect_task(&s), Task::Regression);
        assert_eq!(detect_task_with_threshold(&s, 30), Task::Classification);
    }

    #[test]
    fn test_missing_values_mean_regression() {
        let s = Series::new("y", Column::Numeric(vec![Some(1.0), None, Some(2.0)]));
        assert_eq!(detect_task(&s), Task::Regression);
    }
}
