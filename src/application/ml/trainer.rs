use super::arima::ArimaOrder;
use super::candidates::{
    ArimaTrainer, CandidateTrainer, LinearBaselineTrainer, RandomForestTrainer, RidgeTrainer,
    TrainingSet,
};
use super::feature_builder::FeatureBuilder;
use super::model::ModelCandidate;
use crate::domain::ml::evaluation::{self, EvaluationResult};
use crate::domain::ml::feature_registry::FeatureLayout;
use tracing::{debug, info, warn};

/// Name reported when no candidate produced a usable model.
pub const PERSISTENCE_MODEL: &str = "persistence";

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub layout: FeatureLayout,
    pub test_fraction: f64,
    pub random_forest: RandomForestTrainer,
    pub ridge_alpha: f64,
    pub arima_order: ArimaOrder,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            layout: FeatureLayout::default(),
            test_fraction: 0.2,
            random_forest: RandomForestTrainer::default(),
            ridge_alpha: 1.0,
            arima_order: ArimaOrder::default(),
        }
    }
}

/// Result of a training round. `model` is `None` when every candidate failed.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: Option<ModelCandidate>,
    pub best_rmse: f64,
    pub name: String,
    pub evaluations: Vec<EvaluationResult>,
}

impl TrainingOutcome {
    fn persistence(evaluations: Vec<EvaluationResult>) -> Self {
        Self {
            model: None,
            best_rmse: f64::INFINITY,
            name: PERSISTENCE_MODEL.to_string(),
            evaluations,
        }
    }

    pub fn is_persistence(&self) -> bool {
        self.model.is_none()
    }
}

/// Fits every candidate on the same chronological split and keeps the lowest RMSE.
pub struct ModelTrainer {
    builder: FeatureBuilder,
    test_fraction: f64,
    candidates: Vec<Box<dyn CandidateTrainer>>,
}

impl ModelTrainer {
    pub fn new(config: &TrainerConfig) -> Self {
        let candidates: Vec<Box<dyn CandidateTrainer>> = vec![
            Box::new(config.random_forest),
            Box::new(RidgeTrainer {
                alpha: config.ridge_alpha,
            }),
            Box::new(LinearBaselineTrainer),
            Box::new(ArimaTrainer {
                order: config.arima_order,
            }),
        ];
        Self::with_candidates(config, candidates)
    }

    pub fn with_candidates(
        config: &TrainerConfig,
        candidates: Vec<Box<dyn CandidateTrainer>>,
    ) -> Self {
        Self {
            builder: FeatureBuilder::new(config.layout),
            test_fraction: config.test_fraction,
            candidates,
        }
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn train_and_select(&self, closes: &[f64]) -> TrainingOutcome {
        let data = TrainingSet::new(closes, &self.builder, self.test_fraction);
        if let Err(e) = data.supervised() {
            debug!("Feature table unavailable: {}", e);
        }

        let mut evaluations = Vec::with_capacity(self.candidates.len());
        let mut best: Option<(ModelCandidate, f64, String)> = None;

        for trainer in &self.candidates {
            let name = trainer.name().to_string();
            let fit = match trainer.fit(&data) {
                Ok(fit) => fit,
                Err(e) => {
                    warn!("Candidate {} failed: {}", name, e);
                    evaluations.push(EvaluationResult::failed(&name));
                    continue;
                }
            };

            let score = EvaluationResult {
                name: name.clone(),
                rmse: evaluation::rmse(&fit.actual, &fit.predicted),
                mape: evaluation::mape(&fit.actual, &fit.predicted),
            };
            if !score.is_finite() {
                warn!("Candidate {} produced a non-finite RMSE, skipping", name);
                evaluations.push(EvaluationResult::failed(&name));
                continue;
            }

            info!(
                "Candidate {}: RMSE={:.4}, MAPE={:.2}%",
                name,
                score.rmse,
                score.mape * 100.0
            );

            let improves = best
                .as_ref()
                .is_none_or(|(_, best_rmse, _)| score.rmse < *best_rmse);
            if improves {
                best = Some((fit.model, score.rmse, name));
            }
            evaluations.push(score);
        }

        match best {
            Some((model, best_rmse, name)) => {
                info!("Selected model {} (RMSE={:.4})", name, best_rmse);
                TrainingOutcome {
                    model: Some(model),
                    best_rmse,
                    name,
                    evaluations,
                }
            }
            None => {
                warn!("All candidates failed, falling back to persistence");
                TrainingOutcome::persistence(evaluations)
            }
        }
    }
}
