use super::arima::{ArimaModel, ArimaOrder};
use super::feature_builder::FeatureBuilder;
use super::model::{ModelCandidate, ModelKind};
use crate::domain::errors::ModelError;
use crate::domain::ml::evaluation::ChronologicalSplit;
use crate::domain::ml::feature_registry::FeatureVector;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};
use std::fmt;

/// Lag-feature table with a chronological train/test split.
#[derive(Debug, Clone)]
pub struct SupervisedTable {
    rows: Vec<FeatureVector>,
    targets: Vec<f64>,
    split: ChronologicalSplit,
}

impl SupervisedTable {
    pub fn build(
        closes: &[f64],
        builder: &FeatureBuilder,
        test_fraction: f64,
    ) -> Result<Self, ModelError> {
        let (rows, targets) = builder.supervised(closes);
        let split = ChronologicalSplit::new(rows.len(), test_fraction).ok_or_else(|| {
            ModelError::InsufficientSamples {
                model: "feature table".to_string(),
                required: builder.layout().warmup() + 3,
                actual: closes.len(),
            }
        })?;
        Ok(Self {
            rows,
            targets,
            split,
        })
    }

    pub fn split(&self) -> &ChronologicalSplit {
        &self.split
    }

    pub fn train_rows(&self) -> &[FeatureVector] {
        &self.rows[self.split.train.clone()]
    }

    pub fn train_targets(&self) -> &[f64] {
        &self.targets[self.split.train.clone()]
    }

    pub fn test_rows(&self) -> &[FeatureVector] {
        &self.rows[self.split.test.clone()]
    }

    pub fn test_targets(&self) -> &[f64] {
        &self.targets[self.split.test.clone()]
    }
}

/// Everything a candidate may train on. The feature table is built once and shared.
pub struct TrainingSet<'a> {
    closes: &'a [f64],
    test_fraction: f64,
    table: Result<SupervisedTable, ModelError>,
}

impl<'a> TrainingSet<'a> {
    pub fn new(closes: &'a [f64], builder: &FeatureBuilder, test_fraction: f64) -> Self {
        Self {
            closes,
            test_fraction,
            table: SupervisedTable::build(closes, builder, test_fraction),
        }
    }

    pub fn closes(&self) -> &'a [f64] {
        self.closes
    }

    pub fn supervised(&self) -> Result<&SupervisedTable, ModelError> {
        self.table.as_ref().map_err(Clone::clone)
    }

    /// Chronological split over the raw closes, for models that skip the feature table.
    pub fn raw_split(&self) -> Option<ChronologicalSplit> {
        ChronologicalSplit::new(self.closes.len(), self.test_fraction)
    }
}

/// A fitted candidate with its hold-out predictions.
pub struct CandidateFit {
    pub model: ModelCandidate,
    pub predicted: Vec<f64>,
    pub actual: Vec<f64>,
}

/// Fits one model family on the training side and predicts the test side.
pub trait CandidateTrainer: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&self, data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError>;
}

fn to_matrix(rows: &[FeatureVector], kind: ModelKind) -> Result<DenseMatrix<f64>, ModelError> {
    let values: Vec<Vec<f64>> = rows.iter().map(FeatureVector::to_vec).collect();
    DenseMatrix::from_2d_vec(&values).map_err(|e| fit_error(kind, e))
}

fn fit_error(kind: ModelKind, reason: impl fmt::Display) -> ModelError {
    ModelError::Fit {
        model: kind.name().to_string(),
        reason: reason.to_string(),
    }
}

/// Scores a fitted feature-based candidate on the test rows.
fn score_on_table(
    model: ModelCandidate,
    table: &SupervisedTable,
) -> Result<CandidateFit, ModelError> {
    let predicted = model.predict_rows(table.test_rows())?;
    Ok(CandidateFit {
        model,
        predicted,
        actual: table.test_targets().to_vec(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomForestTrainer {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
}

impl Default for RandomForestTrainer {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
        }
    }
}

impl CandidateTrainer for RandomForestTrainer {
    fn name(&self) -> &str {
        ModelKind::RandomForest.name()
    }

    fn fit(&self, data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError> {
        let kind = ModelKind::RandomForest;
        let table = data.supervised()?;
        let x = to_matrix(table.train_rows(), kind)?;
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split);

        let model = RandomForestRegressor::fit(&x, &table.train_targets().to_vec(), params)
            .map_err(|e| fit_error(kind, e))?;
        score_on_table(ModelCandidate::random_forest(model), table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeTrainer {
    pub alpha: f64,
}

impl Default for RidgeTrainer {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl CandidateTrainer for RidgeTrainer {
    fn name(&self) -> &str {
        ModelKind::Ridge.name()
    }

    fn fit(&self, data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError> {
        let kind = ModelKind::Ridge;
        let table = data.supervised()?;
        let x = to_matrix(table.train_rows(), kind)?;
        let params = RidgeRegressionParameters::default().with_alpha(self.alpha);

        let model = RidgeRegression::fit(&x, &table.train_targets().to_vec(), params)
            .map_err(|e| fit_error(kind, e))?;
        score_on_table(ModelCandidate::ridge(model), table)
    }
}

/// Plain least squares on the lag features.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearBaselineTrainer;

impl CandidateTrainer for LinearBaselineTrainer {
    fn name(&self) -> &str {
        ModelKind::LinearBaseline.name()
    }

    fn fit(&self, data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError> {
        let kind = ModelKind::LinearBaseline;
        let table = data.supervised()?;
        let x = to_matrix(table.train_rows(), kind)?;
        let params =
            LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);

        let model = LinearRegression::fit(&x, &table.train_targets().to_vec(), params)
            .map_err(|e| fit_error(kind, e))?;
        score_on_table(ModelCandidate::linear_baseline(model), table)
    }
}

/// ARIMA on the raw closes: fit the train prefix, forecast the test length in one call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArimaTrainer {
    pub order: ArimaOrder,
}

impl CandidateTrainer for ArimaTrainer {
    fn name(&self) -> &str {
        ModelKind::Arima.name()
    }

    fn fit(&self, data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError> {
        let closes = data.closes();
        let split = data
            .raw_split()
            .ok_or_else(|| ModelError::InsufficientSamples {
                model: ModelKind::Arima.name().to_string(),
                required: 2,
                actual: closes.len(),
            })?;

        let train = &closes[split.train.clone()];
        let actual = closes[split.test.clone()].to_vec();
        let model = ArimaModel::fit(train, self.order)?;
        let predicted = model.forecast(train, actual.len())?;

        Ok(CandidateFit {
            model: ModelCandidate::arima(model),
            predicted,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FeatureLayout;

    fn series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    fn small_builder() -> FeatureBuilder {
        FeatureBuilder::new(FeatureLayout {
            lag_window: 5,
            rolling_window: 3,
        })
    }

    #[test]
    fn test_table_split_has_no_leakage() {
        let closes = series(60);
        let table = SupervisedTable::build(&closes, &small_builder(), 0.2).unwrap();
        let split = table.split();

        assert_eq!(split.train.end, split.test.start);
        assert_eq!(table.train_rows().len() + table.test_rows().len(), 60 - 5 - 1);
        assert_eq!(table.test_targets().last().copied(), closes.last().copied());
    }

    #[test]
    fn test_short_series_fails_every_feature_model() {
        let closes = series(6);
        let data = TrainingSet::new(&closes, &small_builder(), 0.2);

        assert!(RidgeTrainer::default().fit(&data).is_err());
        assert!(LinearBaselineTrainer.fit(&data).is_err());
        assert!(ArimaTrainer::default().fit(&data).is_err());
    }

    #[test]
    fn test_linear_models_fit() {
        let closes = series(120);
        let data = TrainingSet::new(&closes, &small_builder(), 0.2);

        for trainer in [
            Box::new(RidgeTrainer::default()) as Box<dyn CandidateTrainer>,
            Box::new(LinearBaselineTrainer),
        ] {
            let fit = trainer.fit(&data).unwrap();
            assert_eq!(fit.predicted.len(), fit.actual.len());
            assert!(fit.predicted.iter().all(|p| p.is_finite()));
        }
    }

    #[test]
    fn test_random_forest_fit() {
        let closes = series(80);
        let data = TrainingSet::new(&closes, &small_builder(), 0.2);
        let trainer = RandomForestTrainer {
            n_trees: 5,
            max_depth: 4,
            min_samples_split: 2,
        };

        let fit = trainer.fit(&data).unwrap();
        assert_eq!(fit.model.kind(), ModelKind::RandomForest);
        assert_eq!(fit.predicted.len(), fit.actual.len());
    }
}
