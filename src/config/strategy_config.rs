//! Forecast and strategy configuration parsing from environment variables.

use super::{Lookup, parse_or};
use anyhow::Result;

/// Strategy environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEnvConfig {
    pub horizon_days: usize,
    pub extrema_window: usize,
    pub min_observations: usize,
}

impl Default for StrategyEnvConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            extrema_window: 3,
            min_observations: 100,
        }
    }
}

impl StrategyEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            horizon_days: parse_or(lookup, "FORECAST_HORIZON_DAYS", defaults.horizon_days)?,
            extrema_window: parse_or(lookup, "EXTREMA_WINDOW", defaults.extrema_window)?,
            min_observations: parse_or(lookup, "MIN_OBSERVATIONS", defaults.min_observations)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_config_defaults() {
        let config = StrategyEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.extrema_window, 3);
        assert_eq!(config.min_observations, 100);
    }

    #[test]
    fn test_negative_window_rejected() {
        let lookup = |key: &str| (key == "EXTREMA_WINDOW").then(|| "-1".to_string());
        assert!(StrategyEnvConfig::from_lookup(&lookup).is_err());
    }
}
