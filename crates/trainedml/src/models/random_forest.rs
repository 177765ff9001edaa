use ndarray::Array2;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier as SmartForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor as SmartForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::config::{ForestParams, Task};
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::{Model, Target};
use crate::models::utils::{
    check_fit_inputs, check_n_features, labels, to_dense, values, LabelEncoder,
};

type ForestClassifier = SmartForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;
type ForestRegressor = SmartForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

fn classifier_parameters(params: &ForestParams) -> RandomForestClassifierParameters {
    let mut parameters = RandomForestClassifierParameters::default()
        .with_n_trees(params.n_estimators)
        .with_min_samples_leaf(params.min_samples_leaf)
        .with_min_samples_split(params.min_samples_split)
        .with_seed(params.seed);
    if let Some(depth) = params.max_depth {
        parameters = parameters.with_max_depth(depth);
    }
    if let Some(m) = params.max_features {
        parameters = parameters.with_m(m);
    }
    parameters
}

fn regressor_parameters(params: &ForestParams) -> RandomForestRegressorParameters {
    let mut parameters = RandomForestRegressorParameters::default()
        .with_n_trees(params.n_estimators as usize)
        .with_min_samples_leaf(params.min_samples_leaf)
        .with_min_samples_split(params.min_samples_split)
        .with_seed(params.seed);
    if let Some(depth) = params.max_depth {
        parameters = parameters.with_max_depth(depth);
    }
    if let Some(m) = params.max_features {
        parameters = parameters.with_m(m);
    }
    parameters
}

struct FittedForestClassifier {
    model: ForestClassifier,
    encoder: LabelEncoder,
    n_features: usize,
}

/// Bagged decision trees voting on the class label. Seeded, so refits are reproducible.
pub struct RandomForestClassifier {
    params: ForestParams,
    fitted: Option<FittedForestClassifier>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self { params, fitted: None }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

impl Model for RandomForestClassifier {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Target) -> Result<()> {
        check_fit_inputs(self.name(), self.task(), x, y)?;
        let labels = labels(self.name(), y)?;
        let encoder = LabelEncoder::fit(labels);
        let codes = encoder.transform(labels)?;

        let model: ForestClassifier =
            SmartForestClassifier::fit(&to_dense(x)?, &codes, classifier_parameters(&self.params))
                .map_err(|e| TrainedMlError::estimator(self.name(), e))?;

        self.fitted = Some(FittedForestClassifier {
            model,
            encoder,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Target> {
        let fitted = self.fitted.as_ref().ok_or_else(|| self.not_fitted("predict"))?;
        check_n_features(fitted.n_features, x)?;
        let codes = fitted
            .model
            .predict(&to_dense(x)?)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;
        Ok(Target::Labels(fitted.encoder.inverse_transform(&codes)?))
    }
}

struct FittedForestRegressor {
    model: ForestRegressor,
    n_features: usize,
}

/// Bagged regression trees averaging their predictions.
pub struct RandomForestRegressor {
    params: ForestParams,
    fitted: Option<FittedForestRegressor>,
}

impl RandomForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self { params, fitted: None }
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

impl Model for RandomForestRegressor {
    fn name(&self) -> &str {
        "random_forest_regressor"
    }

    fn task(&self) -> Task {
        Task::Regression
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Target) -> Result<()> {
        check_fit_inputs(self.name(), self.task(), x, y)?;
        let y = values(self.name(), y)?;

        let model: ForestRegressor =
            SmartForestRegressor::fit(&to_dense(x)?, &y, regressor_parameters(&self.params))
                .map_err(|e| TrainedMlError::estimator(self.name(), e))?;

        self.fitted = Some(FittedForestRegressor {
            model,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Target> {
        let fitted = self.fitted.as_ref().ok_or_else(|| self.not_fitted("predict"))?;
        check_n_features(fitted.n_features, x)?;
        let predictions = fitted
            .model
            .predict(&to_dense(x)?)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;
        Ok(Target::Values(predictions))
    }
}
