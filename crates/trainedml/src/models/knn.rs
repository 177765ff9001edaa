use ndarray::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};
use smartcore::neighbors::knn_regressor::{KNNRegressor, KNNRegressorParameters};
use smartcore::neighbors::KNNWeightFunction;

use crate::config::{KnnParams, KnnWeights, Task};
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::{Model, Target};
use crate::models::utils::{
    check_fit_inputs, check_n_features, labels, to_dense, values, LabelEncoder,
};

type SmartKnnClassifier = KNNClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>, Euclidian<f64>>;
type SmartKnnRegressor = KNNRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>, Euclidian<f64>>;

fn weight_function(weights: KnnWeights) -> KNNWeightFunction {
    match weights {
        KnnWeights::Uniform => KNNWeightFunction::Uniform,
        KnnWeights::Distance => KNNWeightFunction::Distance,
    }
}

fn check_neighbors(params: &KnnParams, n_samples: usize) -> Result<()> {
    if params.n_neighbors == 0 || params.n_neighbors > n_samples {
        return Err(TrainedMlError::invalid(
            "n_neighbors",
            format!(
                "must be between 1 and the number of training samples ({}), got {}",
                n_samples, params.n_neighbors
            ),
        ));
    }
    Ok(())
}

struct FittedKnnClassifier {
    model: SmartKnnClassifier,
    encoder: LabelEncoder,
    n_features: usize,
}

/// k-nearest-neighbors classifier (majority vote among the `n_neighbors` closest rows).
pub struct KnnClassifier {
    params: KnnParams,
    fitted: Option<FittedKnnClassifier>,
}

impl KnnClassifier {
    pub fn new(params: KnnParams) -> Self {
        Self { params, fitted: None }
    }

    pub fn params(&self) -> &KnnParams {
        &self.params
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(KnnParams::default())
    }
}

impl Model for KnnClassifier {
    fn name(&self) -> &str {
        "knn"
    }

    fn task(&self) -> Task {
        Task::Classification
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Target) -> Result<()> {
        check_fit_inputs(self.name(), self.task(), x, y)?;
        check_neighbors(&self.params, x.nrows())?;
        let labels = labels(self.name(), y)?;
        let encoder = LabelEncoder::fit(labels);
        let codes = encoder.transform(labels)?;

        let parameters = KNNClassifierParameters::default()
            .with_k(self.params.n_neighbors)
            .with_weight(weight_function(self.params.weights));
        let model: SmartKnnClassifier = KNNClassifier::fit(&to_dense(x)?, &codes, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;

        self.fitted = Some(FittedKnnClassifier {
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

struct FittedKnnRegressor {
    model: SmartKnnRegressor,
    n_features: usize,
}

/// k-nearest-neighbors regressor (mean of the `n_neighbors` closest targets).
pub struct KnnRegressor {
    params: KnnParams,
    fitted: Option<FittedKnnRegressor>,
}

impl KnnRegressor {
    pub fn new(params: KnnParams) -> Self {
        Self { params, fitted: None }
    }
}

impl Default for KnnRegressor {
    fn default() -> Self {
        Self::new(KnnParams::default())
    }
}

impl Model for KnnRegressor {
    fn name(&self) -> &str {
        "knn_regressor"
    }

    fn task(&self) -> Task {
        Task::Regression
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Target) -> Result<()> {
        check_fit_inputs(self.name(), self.task(), x, y)?;
        check_neighbors(&self.params, x.nrows())?;
        let y = values(self.name(), y)?;

        let parameters = KNNRegressorParameters::default()
            .with_k(self.params.n_neighbors)
            .with_weight(weight_function(self.params.weights));
        let model: SmartKnnRegressor = KNNRegressor::fit(&to_dense(x)?, &y, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;

        self.fitted = Some(FittedKnnRegressor {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (Array2<f64>, Vec<String>) {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                0.0, 0.0, 0.1, 0.2, 0.2, 0.1, 0.1, 0.0, //
                5.0, 5.0, 5.1, 5.2, 5.2, 5.1, 4.9, 5.0,
            ],
        )
        .unwrap();
        let y = ["a", "a", "a", "a", "b", "b", "b", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (x, y)
    }

    #[test]
    fn test_knn_classifier_separates_blobs() {
        let (x, y) = blobs();
        let mut model = KnnClassifier::new(KnnParams {
            n_neighbors: 3,
            ..KnnParams::default()
        });
        model.fit(&x, &Target::Labels(y.clone())).unwrap();
        assert_eq!(model.predict(&x).unwrap(), Target::Labels(y.clone()));
        assert_eq!(model.evaluate(&x, &Target::Labels(y)).unwrap(), 1.0);
    }

    #[test]
    fn test_knn_predict_before_fit() {
        let (x, _) = blobs();
        let model = KnnClassifier::default();
        let err = model.predict(&x).unwrap_err();
        assert!(matches!(err, TrainedMlError::NotFitted { .. }));
    }

    #[test]
    fn test_knn_rejects_too_many_neighbors() {
        let (x, y) = blobs();
        let mut model = KnnClassifier::new(KnnParams {
            n_neighbors: 20,
            ..KnnParams::default()
        });
        assert!(model.fit(&x, &Target::Labels(y)).is_err());
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_knn_regressor_cardinality() {
        let (x, _) = blobs();
        let y: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let mut model = KnnRegressor::new(KnnParams {
            n_neighbors: 2,
            ..KnnParams::default()
        });
        model.fit(&x, &Target::Values(y)).unwrap();
        assert_eq!(model.predict(&x).unwrap().len(), 8);
    }
}
