use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrainedMlError;

/// Learning task of a model family or a target column.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Classification,
    Regression,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of registered model families.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Knn,
    Logistic,
    RandomForest,
    KnnRegressor,
    Linear,
    Ridge,
    Lasso,
    RandomForestRegressor,
}

impl ModelKind {
    const CLASSIFIERS: [ModelKind; 3] = [ModelKind::Knn, ModelKind::Logistic, ModelKind::RandomForest];

    const REGRESSORS: [ModelKind; 5] = [
        ModelKind::KnnRegressor,
        ModelKind::Linear,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::RandomForestRegressor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Knn => "knn",
            ModelKind::Logistic => "logistic",
            ModelKind::RandomForest => "random_forest",
            ModelKind::KnnRegressor => "knn_regressor",
            ModelKind::Linear => "linear",
            ModelKind::Ridge => "ridge",
            ModelKind::Lasso => "lasso",
            ModelKind::RandomForestRegressor => "random_forest_regressor",
        }
    }

    pub fn task(&self) -> Task {
        match self {
            ModelKind::Knn | ModelKind::Logistic | ModelKind::RandomForest => Task::Classification,
            _ => Task::Regression,
        }
    }

    /// Registered classifiers, in registry order.
    pub fn classifiers() -> &'static [ModelKind] {
        &Self::CLASSIFIERS
    }

    /// Registered regressors, in registry order.
    pub fn regressors() -> &'static [ModelKind] {
        &Self::REGRESSORS
    }

    pub fn for_task(task: Task) -> &'static [ModelKind] {
        match task {
            Task::Classification => Self::classifiers(),
            Task::Regression => Self::regressors(),
        }
    }

    pub fn all() -> impl Iterator<Item = ModelKind> {
        Self::CLASSIFIERS.into_iter().chain(Self::REGRESSORS)
    }

    pub fn available_names() -> String {
        Self::all().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    }

    /// Default hyperparameters for this family.
    pub fn default_config(&self) -> ModelConfig {
        match self {
            ModelKind::Knn => ModelConfig::Knn(KnnParams::default()),
            ModelKind::Logistic => ModelConfig::Logistic(LogisticParams::default()),
            ModelKind::RandomForest => ModelConfig::RandomForest(ForestParams::default()),
            ModelKind::KnnRegressor => ModelConfig::KnnRegressor(KnnParams::default()),
            ModelKind::Linear => ModelConfig::Linear(LinearParams::default()),
            ModelKind::Ridge => ModelConfig::Ridge(RidgeParams::default()),
            ModelKind::Lasso => ModelConfig::Lasso(LassoParams::default()),
            ModelKind::RandomForestRegressor => {
                ModelConfig::RandomForestRegressor(ForestParams::default())
            }
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = TrainedMlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "knn" | "k-nn" => Ok(ModelKind::Knn),
            "logistic" | "logistic_regression" => Ok(ModelKind::Logistic),
            "random_forest" | "rf" => Ok(ModelKind::RandomForest),
            "knn_regressor" => Ok(ModelKind::KnnRegressor),
            "linear" | "linear_regression" => Ok(ModelKind::Linear),
            "ridge" => Ok(ModelKind::Ridge),
            "lasso" => Ok(ModelKind::Lasso),
            "random_forest_regressor" | "rf_regressor" => Ok(ModelKind::RandomForestRegressor),
            _ => Err(TrainedMlError::UnknownModel {
                name: s.to_string(),
                available: Self::available_names(),
            }),
        }
    }
}

/// Neighbor weighting used by the KNN families.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KnnWeights {
    #[default]
    Uniform,
    Distance,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KnnParams {
    pub n_neighbors: usize,
    pub weights: KnnWeights,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            weights: KnnWeights::Uniform,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogisticParams {
    /// L2 regularization strength, the inverse of scikit-learn's `C`; 0 disables the penalty.
    pub alpha: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Shared by the random forest classifier and regressor.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: u16,
    pub max_depth: Option<u16>,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    /// Features considered per split; `None` lets the estimator pick sqrt(n) / n/3.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    #[default]
    Qr,
    Svd,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct LinearParams {
    pub solver: LinearSolver,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RidgeParams {
    pub alpha: f64,
    pub normalize: bool,
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            normalize: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LassoParams {
    pub alpha: f64,
    pub normalize: bool,
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for LassoParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            normalize: false,
            tol: 1e-4,
            max_iter: 1000,
        }
    }
}

/// A model family together with its hyperparameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "model", content = "params", rename_all = "snake_case")]
pub enum ModelConfig {
    Knn(KnnParams),
    Logistic(LogisticParams),
    RandomForest(ForestParams),
    KnnRegressor(KnnParams),
    Linear(LinearParams),
    Ridge(RidgeParams),
    Lasso(LassoParams),
    RandomForestRegressor(ForestParams),
}

impl ModelConfig {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelConfig::Knn(_) => ModelKind::Knn,
            ModelConfig::Logistic(_) => ModelKind::Logistic,
            ModelConfig::RandomForest(_) => ModelKind::RandomForest,
            ModelConfig::KnnRegressor(_) => ModelKind::KnnRegressor,
            ModelConfig::Linear(_) => ModelKind::Linear,
            ModelConfig::Ridge(_) => ModelKind::Ridge,
            ModelConfig::Lasso(_) => ModelKind::Lasso,
            ModelConfig::RandomForestRegressor(_) => ModelKind::RandomForestRegressor,
        }
    }

    /// Checks hyperparameters before any estimator is constructed.
    pub fn validate(&self) -> Result<(), TrainedMlError> {
        match self {
            ModelConfig::Knn(p) | ModelConfig::KnnRegressor(p) if p.n_neighbors == 0 => Err(
                TrainedMlError::invalid("n_neighbors", "must be at least 1"),
            ),
            ModelConfig::RandomForest(p) | ModelConfig::RandomForestRegressor(p)
                if p.n_estimators == 0 =>
            {
                Err(TrainedMlError::invalid("n_estimators", "must be at least 1"))
            }
            ModelConfig::Logistic(p) if p.alpha < 0.0 => {
                Err(TrainedMlError::invalid("alpha", "must be non-negative"))
            }
            ModelConfig::Ridge(p) if p.alpha < 0.0 => {
                Err(TrainedMlError::invalid("alpha", "must be non-negative"))
            }
            ModelConfig::Lasso(p) if p.alpha < 0.0 || p.max_iter == 0 => Err(
                TrainedMlError::invalid("alpha", "must be non-negative with max_iter >= 1"),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::RandomForest(ForestParams::default())
    }
}

impl FromStr for ModelConfig {
    type Err = TrainedMlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModelKind::from_str(s)?.default_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_names_round_trip() {
        for kind in ModelKind::all() {
            assert_eq!(ModelKind::from_str(kind.name()).unwrap(), kind);
        }
        assert_eq!(ModelKind::from_str("RF").unwrap(), ModelKind::RandomForest);
    }

    #[test]
    fn test_unknown_model_lists_available() {
        let err = ModelKind::from_str("svm").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("random_forest_regressor"));
    }

    #[test]
    fn test_registry_partitions_by_task() {
        assert!(ModelKind::classifiers()
            .iter()
            .all(|k| k.task() == Task::Classification));
        assert!(ModelKind::regressors()
            .iter()
            .all(|k| k.task() == Task::Regression));
        assert_eq!(ModelKind::all().count(), 8);
    }

    #[test]
    fn test_model_config_json_is_tagged() {
        let config = ModelConfig::Ridge(RidgeParams {
            alpha: 0.5,
            normalize: false,
        });
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"model\":\"ridge\""));
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_defaults_follow_scikit_learn() {
        assert_eq!(LogisticParams::default().alpha, 1.0);
        assert!(!RidgeParams::default().normalize);
        assert!(!LassoParams::default().normalize);
        assert_eq!(KnnParams::default().n_neighbors, 5);
    }

    #[test]
    fn test_validate_rejects_zero_neighbors() {
        let config = ModelConfig::Knn(KnnParams {
            n_neighbors: 0,
            ..KnnParams::default()
        });
        assert!(config.validate().is_err());
        assert!(ModelConfig::default().validate().is_ok());
    }
}
