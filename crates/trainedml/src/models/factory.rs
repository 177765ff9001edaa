use std::str::FromStr;

use crate::config::{ModelConfig, ModelKind, Task};
use crate::error::{Result, TrainedMlError};
use crate::models::knn::{KnnClassifier, KnnRegressor};
use crate::models::linear::{LassoRegressor, LinearRegressor, RidgeRegressor};
use crate::models::logistic::LogisticClassifier;
use crate::models::model_trait::Model;
use crate::models::random_forest::{RandomForestClassifier, RandomForestRegressor};

/// Build a boxed model from a `ModelConfig`, validating its hyperparameters first.
pub fn build_model(config: ModelConfig) -> Result<Box<dyn Model>> {
    config.validate()?;
    let model: Box<dyn Model> = match config {
        ModelConfig::Knn(params) => Box::new(KnnClassifier::new(params)),
        ModelConfig::Logistic(params) => Box::new(LogisticClassifier::new(params)),
        ModelConfig::RandomForest(params) => Box::new(RandomForestClassifier::new(params)),
        ModelConfig::KnnRegressor(params) => Box::new(KnnRegressor::new(params)),
        ModelConfig::Linear(params) => Box::new(LinearRegressor::new(params)),
        ModelConfig::Ridge(params) => Box::new(RidgeRegressor::new(params)),
        ModelConfig::Lasso(params) => Box::new(LassoRegressor::new(params)),
        ModelConfig::RandomForestRegressor(params) => {
            Box::new(RandomForestRegressor::new(params))
        }
    };
    Ok(model)
}

/// Model with default hyperparameters for any registered name.
pub fn get_model(name: &str) -> Result<Box<dyn Model>> {
    build_model(ModelKind::from_str(name)?.default_config())
}

/// Like [`get_model`], but only accepts classifier names.
pub fn get_classifier(name: &str) -> Result<Box<dyn Model>> {
    get_for_task(name, Task::Classification)
}

/// Like [`get_model`], but only accepts regressor names.
pub fn get_regressor(name: &str) -> Result<Box<dyn Model>> {
    get_for_task(name, Task::Regression)
}

fn get_for_task(name: &str, task: Task) -> Result<Box<dyn Model>> {
    let kind = ModelKind::from_str(name)?;
    if kind.task() != task {
        return Err(TrainedMlError::UnknownModel {
            name: name.to_string(),
            available: ModelKind::for_task(task)
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    build_model(kind.default_config())
}

/// Every registered model for `task` with default hyperparameters, in registry order.
pub fn models_for_task(task: Task) -> Result<Vec<(String, Box<dyn Model>)>> {
    ModelKind::for_task(task)
        .iter()
        .map(|kind| Ok((kind.name().to_string(), build_model(kind.default_config())?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_builds_with_matching_name_and_task() {
        for kind in ModelKind::all() {
            let model = build_model(kind.default_config()).unwrap();
            assert_eq!(model.name(), kind.name());
            assert_eq!(model.task(), kind.task());
            assert!(!model.is_fitted());
        }
    }

    #[test]
    fn test_task_specific_lookup() {
        assert!(get_classifier("knn").is_ok());
        assert!(get_classifier("ridge").is_err());
        assert!(get_regressor("ridge").is_ok());
        assert!(get_regressor("logistic").is_err());
        match get_model("unknown") {
            Err(err) => assert!(err.is_config_error()),
            Ok(_) => panic!("unknown model name accepted"),
        }
    }

    #[test]
    fn test_models_for_task_order() {
        let names: Vec<String> = models_for_task(Task::Classification)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["knn", "logistic", "random_forest"]);
    }
}
