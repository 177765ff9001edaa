//! Ordinary least squares and its L2 (ridge) and L1 (lasso) penalized variants.
use ndarray::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::lasso::{Lasso, LassoParameters};
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};

use crate::config::{LassoParams, LinearParams, LinearSolver, RidgeParams, Task};
use crate::error::{Result, TrainedMlError};
use crate::models::model_trait::{Model, Target};
use crate::models::utils::{check_fit_inputs, check_n_features, to_dense, values};

type SmartLinear = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
type SmartRidge = RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
type SmartLasso = Lasso<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Fitted estimator plus the feature count it was trained on.
struct Fitted<M> {
    model: M,
    n_features: usize,
}

pub struct LinearRegressor {
    params: LinearParams,
    fitted: Option<Fitted<SmartLinear>>,
}

impl LinearRegressor {
    pub fn new(params: LinearParams) -> Self {
        Self { params, fitted: None }
    }
}

impl Default for LinearRegressor {
    fn default() -> Self {
        Self::new(LinearParams::default())
    }
}

impl Model for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
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
        let solver = match self.params.solver {
            LinearSolver::Qr => LinearRegressionSolverName::QR,
            LinearSolver::Svd => LinearRegressionSolverName::SVD,
        };
        let parameters = LinearRegressionParameters::default().with_solver(solver);
        let model: SmartLinear = LinearRegression::fit(&to_dense(x)?, &y, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;
        self.fitted = Some(Fitted {
            model,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Target> {
        let fitted = self.fitted.as_ref().ok_or_else(|| self.not_fitted("predict"))?;
        check_n_features(fitted.n_features, x)?;
        fitted
            .model
            .predict(&to_dense(x)?)
            .map(Target::Values)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))
    }
}

pub struct RidgeRegressor {
    params: RidgeParams,
    fitted: Option<Fitted<SmartRidge>>,
}

impl RidgeRegressor {
    pub fn new(params: RidgeParams) -> Self {
        Self { params, fitted: None }
    }
}

impl Default for RidgeRegressor {
    fn default() -> Self {
        Self::new(RidgeParams::default())
    }
}

impl Model for RidgeRegressor {
    fn name(&self) -> &str {
        "ridge"
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
        let parameters = RidgeRegressionParameters::default()
            .with_alpha(self.params.alpha)
            .with_normalize(self.params.normalize);
        let model: SmartRidge = RidgeRegression::fit(&to_dense(x)?, &y, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;
        self.fitted = Some(Fitted {
            model,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Target> {
        let fitted = self.fitted.as_ref().ok_or_else(|| self.not_fitted("predict"))?;
        check_n_features(fitted.n_features, x)?;
        fitted
            .model
            .predict(&to_dense(x)?)
            .map(Target::Values)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))
    }
}

pub struct LassoRegressor {
    params: LassoParams,
    fitted: Option<Fitted<SmartLasso>>,
}

impl LassoRegressor {
    pub fn new(params: LassoParams) -> Self {
        Self { params, fitted: None }
    }
}

impl Default for LassoRegressor {
    fn default() -> Self {
        Self::new(LassoParams::default())
    }
}

impl Model for LassoRegressor {
    fn name(&self) -> &str {
        "lasso"
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
        let parameters = LassoParameters::default()
            .with_alpha(self.params.alpha)
            .with_normalize(self.params.normalize)
            .with_tol(self.params.tol)
            .with_max_iter(self.params.max_iter);
        let model: SmartLasso = Lasso::fit(&to_dense(x)?, &y, parameters)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))?;
        self.fitted = Some(Fitted {
            model,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Target> {
        let fitted = self.fitted.as_ref().ok_or_else(|| self.not_fitted("predict"))?;
        check_n_features(fitted.n_features, x)?;
        fitted
            .model
            .predict(&to_dense(x)?)
            .map(Target::Values)
            .map_err(|e| TrainedMlError::estimator(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((12, 2), |(i, j)| (i as f64) * (j as f64 + 1.0) + (i % 3) as f64);
        let y = x
            .rows()
            .into_iter()
            .map(|row| 2.0 * row[0] - 0.5 * row[1] + 1.0)
            .collect();
        (x, y)
    }

    #[test]
    fn test_linear_recovers_exact_fit() {
        let (x, y) = line();
        let mut model = LinearRegressor::default();
        model.fit(&x, &Target::Values(y.clone())).unwrap();
        let r2 = model.evaluate(&x, &Target::Values(y)).unwrap();
        assert!(r2 > 0.999, "r2 = {}", r2);
    }

    #[test]
    fn test_penalized_models_predict_each_row() {
        let (x, y) = line();
        let mut ridge = RidgeRegressor::default();
        let mut lasso = LassoRegressor::default();
        ridge.fit(&x, &Target::Values(y.clone())).unwrap();
        lasso.fit(&x, &Target::Values(y)).unwrap();
        assert_eq!(ridge.predict(&x).unwrap().len(), 12);
        assert_eq!(lasso.predict(&x).unwrap().len(), 12);
    }

    #[test]
    fn test_predict_checks_feature_count() {
        let (x, y) = line();
        let mut model = LinearRegressor::default();
        model.fit(&x, &Target::Values(y)).unwrap();
        assert!(model.predict(&Array2::zeros((3, 5))).is_err());
    }
}
