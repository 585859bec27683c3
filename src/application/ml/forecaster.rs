use super::feature_builder::FeatureBuilder;
use super::model::{Capability, ModelCandidate};
use crate::domain::errors::ModelError;
use crate::domain::market::price_series::PriceSeries;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ml::forecast_path::ForecastPath;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastStatus {
    ModelDriven,
    /// No model: the current price repeated over the horizon.
    Persistence,
    /// The model stopped after `completed_steps`; the rest is the current price.
    Degraded {
        completed_steps: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub path: ForecastPath,
    pub current_price: f64,
    pub status: ForecastStatus,
}

/// Rolls a selected model forward over the forecast horizon.
#[derive(Debug, Clone, Copy)]
pub struct Forecaster {
    horizon: usize,
    builder: FeatureBuilder,
}

impl Forecaster {
    pub fn new(horizon: usize, builder: FeatureBuilder) -> Self {
        Self { horizon, builder }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn forecast(&self, model: Option<&ModelCandidate>, series: &PriceSeries) -> Forecast {
        let current_price = series.last_close();
        let Some(model) = model else {
            return Forecast {
                path: ForecastPath::flat(current_price, self.horizon),
                current_price,
                status: ForecastStatus::Persistence,
            };
        };

        let (prices, failure) = match model.capability() {
            Capability::DirectMultiStep => self.direct(model, series.closes()),
            Capability::SingleStepRecursive => match self.builder.seed(series.closes()) {
                Some(seed) => {
                    recursive_path(seed, self.horizon, |features| model.predict_next(features))
                }
                None => (
                    Vec::new(),
                    Some(ModelError::InsufficientSamples {
                        model: model.name().to_string(),
                        required: self.builder.layout().warmup() + 1,
                        actual: series.len(),
                    }),
                ),
            },
        };

        let completed_steps = prices.len();
        let status = match failure {
            None => ForecastStatus::ModelDriven,
            Some(e) => {
                warn!(
                    "Forecast with {} degraded after {} of {} steps: {}",
                    model.name(),
                    completed_steps,
                    self.horizon,
                    e
                );
                ForecastStatus::Degraded {
                    completed_steps,
                    reason: e.to_string(),
                }
            }
        };

        let mut path = prices;
        path.resize(self.horizon, current_price);
        debug!("Forecast path for {}: {:?}", model.name(), path);

        Forecast {
            path: ForecastPath::new(path),
            current_price,
            status,
        }
    }

    fn direct(&self, model: &ModelCandidate, closes: &[f64]) -> (Vec<f64>, Option<ModelError>) {
        match model.forecast(closes, self.horizon) {
            Ok(path) if path.iter().all(|p| p.is_finite()) => (path, None),
            Ok(_) => (
                Vec::new(),
                Some(ModelError::NonFinite {
                    model: model.name().to_string(),
                }),
            ),
            Err(e) => (Vec::new(), Some(e)),
        }
    }
}

/// Feeds each prediction back in as `lag_1` until the horizon is reached or a step fails.
///
/// Returns the completed steps and the error that stopped the loop, if any.
pub(crate) fn recursive_path<F>(
    seed: FeatureVector,
    horizon: usize,
    mut predict: F,
) -> (Vec<f64>, Option<ModelError>)
where
    F: FnMut(&FeatureVector) -> Result<f64, ModelError>,
{
    let mut path = Vec::with_capacity(horizon);
    let mut features = seed;
    for _ in 0..horizon {
        match predict(&features) {
            Ok(next) if next.is_finite() => {
                path.push(next);
                features = features.advance(next);
            }
            Ok(_) => {
                return (
                    path,
                    Some(ModelError::NonFinite {
                        model: "recursive forecast".to_string(),
                    }),
                );
            }
            Err(e) => return (path, Some(e)),
        }
    }
    (path, None)
}
