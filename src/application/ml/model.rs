use super::arima::ArimaModel;
use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::FeatureVector;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use smartcore::linear::ridge_regression::RidgeRegression;
use std::fmt;

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type RidgeRegressor = RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type LinearRegressor = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Candidate model families, in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    RandomForest,
    Ridge,
    LinearBaseline,
    Arima,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::Ridge => "ridge",
            ModelKind::LinearBaseline => "linear_baseline",
            ModelKind::Arima => "arima",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a fitted model produces a multi-day path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Forecasts the whole horizon in one call.
    DirectMultiStep,
    /// Predicts one step from a feature vector; needs feature feedback.
    SingleStepRecursive,
}

pub enum FittedModel {
    RandomForest(Box<ForestRegressor>),
    Ridge(Box<RidgeRegressor>),
    LinearBaseline(Box<LinearRegressor>),
    Arima(ArimaModel),
}

/// A fitted model tagged with its prediction contract.
///
/// The capability is fixed by the constructor for each model family.
pub struct ModelCandidate {
    kind: ModelKind,
    capability: Capability,
    model: FittedModel,
}

impl fmt::Debug for ModelCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCandidate")
            .field("kind", &self.kind)
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

impl ModelCandidate {
    pub fn random_forest(model: ForestRegressor) -> Self {
        Self {
            kind: ModelKind::RandomForest,
            capability: Capability::SingleStepRecursive,
            model: FittedModel::RandomForest(Box::new(model)),
        }
    }

    pub fn ridge(model: RidgeRegressor) -> Self {
        Self {
            kind: ModelKind::Ridge,
            capability: Capability::SingleStepRecursive,
            model: FittedModel::Ridge(Box::new(model)),
        }
    }

    pub fn linear_baseline(model: LinearRegressor) -> Self {
        Self {
            kind: ModelKind::LinearBaseline,
            capability: Capability::SingleStepRecursive,
            model: FittedModel::LinearBaseline(Box::new(model)),
        }
    }

    pub fn arima(model: ArimaModel) -> Self {
        Self {
            kind: ModelKind::Arima,
            capability: Capability::DirectMultiStep,
            model: FittedModel::Arima(model),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Batch prediction over feature rows (single-step models only).
    pub fn predict_rows(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        let matrix: Vec<Vec<f64>> = rows.iter().map(FeatureVector::to_vec).collect();
        let x = DenseMatrix::from_2d_vec(&matrix).map_err(|e| self.predict_error(e))?;

        let predictions = match &self.model {
            FittedModel::RandomForest(m) => m.predict(&x),
            FittedModel::Ridge(m) => m.predict(&x),
            FittedModel::LinearBaseline(m) => m.predict(&x),
            FittedModel::Arima(_) => return Err(self.unsupported("feature-based prediction")),
        }
        .map_err(|e| self.predict_error(e))?;

        if predictions.len() != rows.len() {
            return Err(self.predict_error(format!(
                "expected {} predictions, got {}",
                rows.len(),
                predictions.len()
            )));
        }
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFinite {
                model: self.name().to_string(),
            });
        }
        Ok(predictions)
    }

    /// Next-step price from one feature vector.
    pub fn predict_next(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.predict_rows(std::slice::from_ref(features))?
            .first()
            .copied()
            .ok_or_else(|| self.predict_error("no prediction returned"))
    }

    /// Whole-horizon forecast continuing `history` (direct multi-step models only).
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>, ModelError> {
        match &self.model {
            FittedModel::Arima(m) => {
                let path = m.forecast(history, horizon)?;
                if path.len() != horizon {
                    return Err(self.predict_error(format!(
                        "expected {} steps, got {}",
                        horizon,
                        path.len()
                    )));
                }
                Ok(path)
            }
            _ => Err(self.unsupported("multi-step forecasting")),
        }
    }

    fn predict_error(&self, reason: impl fmt::Display) -> ModelError {
        ModelError::Predict {
            model: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    fn unsupported(&self, operation: &str) -> ModelError {
        ModelError::Unsupported {
            model: self.name().to_string(),
            operation: operation.to_string(),
        }
    }
}
