//! Configuration module for Trendcast.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by domain: Model, Strategy, Service, and Observability.

mod model_config;
mod observability_config;
mod service_config;
mod strategy_config;

pub use model_config::ModelEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use service_config::ServiceEnvConfig;
pub use strategy_config::StrategyEnvConfig;

use crate::application::ml::TrainerConfig;
use crate::application::ml::candidates::RandomForestTrainer;
use crate::application::pipeline::AnalysisConfig;
use crate::domain::ml::feature_registry::FeatureLayout;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Source of raw configuration values, keyed by variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Parses `key` from the lookup, or returns `default` when it is unset.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub strategy: StrategyEnvConfig,
    pub service: ServiceEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let model = ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?;
        let strategy =
            StrategyEnvConfig::from_lookup(lookup).context("Failed to load strategy config")?;
        let service =
            ServiceEnvConfig::from_lookup(lookup).context("Failed to load service config")?;
        let observability = ObservabilityEnvConfig::from_lookup(lookup);

        Ok(Self {
            model,
            strategy,
            service,
            observability,
        })
    }

    /// Builds and validates the pipeline settings.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let model = &self.model;
        if model.lag_window == 0 {
            anyhow::bail!("LAG_WINDOW must be at least 1");
        }
        if model.rolling_window < 2 {
            anyhow::bail!("ROLLING_WINDOW must be at least 2 for a sample standard deviation");
        }
        if !(model.test_fraction > 0.0 && model.test_fraction < 1.0) {
            anyhow::bail!(
                "TEST_FRACTION must be between 0 and 1 (exclusive), got {}",
                model.test_fraction
            );
        }
        if model.rf_trees == 0 {
            anyhow::bail!("RF_TREES must be at least 1");
        }
        if !(model.ridge_alpha.is_finite() && model.ridge_alpha >= 0.0) {
            anyhow::bail!("RIDGE_ALPHA must be a non-negative number");
        }

        let strategy = &self.strategy;
        if strategy.horizon_days == 0 {
            anyhow::bail!("FORECAST_HORIZON_DAYS must be at least 1");
        }
        if strategy.extrema_window == 0 {
            anyhow::bail!("EXTREMA_WINDOW must be at least 1");
        }

        Ok(AnalysisConfig {
            trainer: TrainerConfig {
                layout: FeatureLayout {
                    lag_window: model.lag_window,
                    rolling_window: model.rolling_window,
                },
                test_fraction: model.test_fraction,
                random_forest: RandomForestTrainer {
                    n_trees: model.rf_trees,
                    max_depth: model.rf_max_depth,
                    min_samples_split: model.rf_min_samples_split,
                },
                ridge_alpha: model.ridge_alpha,
                arima_order: model.arima_order,
            },
            horizon_days: strategy.horizon_days,
            extrema_window: strategy.extrema_window,
            min_observations: strategy.min_observations,
        })
    }
}
