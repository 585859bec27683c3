pub mod arima;
pub mod candidates;
pub mod feature_builder;
pub mod forecaster;
pub mod model;
pub mod trainer;

pub use feature_builder::FeatureBuilder;
pub use forecaster::{Forecast, ForecastStatus, Forecaster};
pub use model::{Capability, ModelCandidate, ModelKind};
pub use trainer::{ModelTrainer, TrainerConfig, TrainingOutcome, PERSISTENCE_MODEL};
