pub mod evaluation;
pub mod feature_registry;
pub mod forecast_path;

pub use evaluation::{ChronologicalSplit, EvaluationResult};
pub use feature_registry::{FeatureLayout, FeatureVector};
pub use forecast_path::ForecastPath;
