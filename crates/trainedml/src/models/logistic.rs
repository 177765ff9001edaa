use ndarray::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};

use crate::config::{LogisticParams, Task};
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::{Model, Target};
use crate::models::utils::{check_fit_inputs, check_n_features, labels, to_dense, LabelEncoder};

type SmartLogistic = LogisticRegression<f64, u32, DenseMatrix<f64>, Vec<u32>>;

struct FittedLogistic {
    model: SmartLogistic,
    encoder: LabelEncoder,
    n_features: usize,
}

/// Multinomial logistic regression fitted with L-BFGS.
pub struct LogisticClassifier {
    params: LogisticParams,
    fitted: Option<FittedLogistic>,
}

impl LogisticClassifier {
    pub fn new(params: LogisticParams) -> Self {
        Self { params, fitted: None }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self::new(LogisticParams::default())
    }
}

impl Model for LogisticClassifier {
    fn name(&self) -> &str {
        "logistic"
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
        if encoder.classes().len() < 2 {
            return Err(TrainedMlError::invalid(
                "target",
                "logistic regression needs at least two classes",
            ));
        }
        let codes = encoder.transform(labels)?;

        let parameters = LogisticRegressionParameters::default().with_alpha(self.params.alpha);
        let model: SmartLogistic = LogisticRegression::fit(&to_dense(x)?, &codes, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;

        self.fitted = Some(FittedLogistic {
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
