use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, Task};
use crate::data::cache::{self, default_cache_dir, FetchCache};
use crate::data::loader::{DataSource, Dataset, DatasetLoader};
use crate::data::split::{train_test_split, Split};
use crate::data::table::Table;
use crate::data::task::detect_task;
use crate::error::{Result, TrainedMlError};
use crate::evaluation::{score, Scores};
use crate::models::factory::build_model;
use crate::models::model_trait::{Model, Target};

pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub source: DataSource,
    pub model: ModelConfig,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Named("iris".to_string()),
            model: ModelConfig::default(),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Load a dataset, split it, fit one model and score it on the held-out rows.
pub struct Trainer {
    config: TrainerConfig,
    model: Box<dyn Model>,
    loader: Option<DatasetLoader>,
    dataset: Option<Dataset>,
    split: Option<Split>,
    task: Option<Task>,
}

impl Trainer {
    /// Fails on an unknown model, invalid hyperparameters or a test size outside (0, 1).
    pub fn new(config: TrainerConfig) -> Result<Self> {
        if !(config.test_size > 0.0 && config.test_size < 1.0) {
            return Err(TrainedMlError::invalid(
                "test_size",
                format!("must lie strictly between 0 and 1, got {}", config.test_size),
            ));
        }
        let model = build_model(config.model.clone())?;
        Ok(Self {
            config,
            model,
            loader: None,
            dataset: None,
            split: None,
            task: None,
        })
    }

    pub fn with_loader(mut self, loader: DatasetLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    fn default_loader() -> Result<DatasetLoader> {
        let cache = match cache::global() {
            Ok(cache) => cache.clone(),
            Err(_) => FetchCache::new(default_cache_dir())?,
        };
        Ok(DatasetLoader::new(cache))
    }

    /// Load and split the configured source, checking the target suits the model.
    pub fn load_data(&mut self) -> Result<&Dataset> {
        if self.loader.is_none() {
            self.loader = Some(Self::default_loader()?);
        }
        let loader = self.loader.as_ref().ok_or(TrainedMlError::CacheNotInitialized)?;
        let dataset = loader.load_dataset(&self.config.source)?;

        let task = detect_task(&dataset.target);
        if task != self.model.task() {
            return Err(TrainedMlError::TaskMismatch {
                model: self.model.name().to_string(),
                expected: self.model.task().as_str(),
                found: task.as_str(),
            });
        }

        let split = train_test_split(&dataset, self.config.test_size, self.config.seed)?;
        log::info!(
            "[trainedml::trainer] {} task on '{}': {} train / {} test rows",
            task,
            dataset.target.name,
            split.x_train.nrows(),
            split.x_test.nrows()
        );
        self.task = Some(task);
        self.split = Some(split);
        Ok(self.dataset.insert(dataset))
    }

    /// Fit the model on the train side, loading data first when needed.
    pub fn fit(&mut self) -> Result<()> {
        if self.split.is_none() {
            self.load_data()?;
        }
        let split = self.split.as_ref().ok_or_else(|| self.model.not_fitted("fit"))?;
        let x = split.x_train.to_matrix()?;
        let y = Target::from_series(&split.y_train, self.model.task())?;
        self.model.fit(&x, &y)?;
        log::info!("[trainedml::trainer] Fitted {} on {} rows", self.model.name(), x.nrows());
        Ok(())
    }

    /// Task-appropriate scores on the test side.
    pub fn evaluate(&self) -> Result<Scores> {
        let split = match (&self.split, self.model.is_fitted()) {
            (Some(split), true) => split,
            _ => return Err(self.model.not_fitted("evaluate")),
        };
        let y_true = Target::from_series(&split.y_test, self.model.task())?;
        let y_pred = self.model.predict(&split.x_test.to_matrix()?)?;
        score(&y_true, &y_pred)
    }

    /// Predict for new rows; the table must contain the training feature columns.
    pub fn predict(&self, table: &Table) -> Result<Target> {
        let split = match (&self.split, self.model.is_fitted()) {
            (Some(split), true) => split,
            _ => return Err(self.model.not_fitted("predict")),
        };
        let features = table.select(split.x_train.column_names())?;
        self.model.predict(&features.to_matrix()?)
    }

    pub fn task(&self) -> Option<Task> {
        self.task
    }

    pub fn split(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_rejected_at_construction() {
        let config: Result<ModelConfig> = "svm".parse();
        assert!(config.unwrap_err().is_config_error());

        let err = Trainer::new(TrainerConfig {
            test_size: 1.5,
            ..TrainerConfig::default()
        })
        .err()
        .unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_evaluate_and_predict_before_fit() {
        let trainer = Trainer::new(TrainerConfig::default()).unwrap();
        assert!(matches!(trainer.evaluate(), Err(TrainedMlError::NotFitted { .. })));
        assert!(matches!(
            trainer.predict(&Table::default()),
            Err(TrainedMlError::NotFitted { .. })
        ));
        assert!(trainer.task().is_none());
        assert!(trainer.split().is_none());
    }
}
