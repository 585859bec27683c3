//! Model training configuration parsing from environment variables.
//!
//! Feature windows, the hold-out fraction and per-candidate hyperparameters.

use super::{Lookup, parse_or};
use crate::application::ml::arima::ArimaOrder;
use anyhow::{Context, Result};

/// Model environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    // Features
    pub lag_window: usize,
    pub rolling_window: usize,

    // Evaluation
    pub test_fraction: f64,

    // Random forest
    pub rf_trees: usize,
    pub rf_max_depth: u16,
    pub rf_min_samples_split: usize,

    // Ridge
    pub ridge_alpha: f64,

    // ARIMA
    pub arima_order: ArimaOrder,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            lag_window: 30,
            rolling_window: 7,
            test_fraction: 0.2,
            rf_trees: 100,
            rf_max_depth: 10,
            rf_min_samples_split: 2,
            ridge_alpha: 1.0,
            arima_order: ArimaOrder::default(),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();

        let arima_order = match lookup("ARIMA_ORDER") {
            Some(raw) => raw
                .parse::<ArimaOrder>()
                .context("Failed to parse ARIMA_ORDER")?,
            None => defaults.arima_order,
        };

        Ok(Self {
            lag_window: parse_or(lookup, "LAG_WINDOW", defaults.lag_window)?,
            rolling_window: parse_or(lookup, "ROLLING_WINDOW", defaults.rolling_window)?,
            test_fraction: parse_or(lookup, "TEST_FRACTION", defaults.test_fraction)?,
            rf_trees: parse_or(lookup, "RF_TREES", defaults.rf_trees)?,
            rf_max_depth: parse_or(lookup, "RF_MAX_DEPTH", defaults.rf_max_depth)?,
            rf_min_samples_split: parse_or(
                lookup,
                "RF_MIN_SAMPLES_SPLIT",
                defaults.rf_min_samples_split,
            )?,
            ridge_alpha: parse_or(lookup, "RIDGE_ALPHA", defaults.ridge_alpha)?,
            arima_order,
        })
    }
}
