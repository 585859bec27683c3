//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the push-based metrics reporter settings.

use super::Lookup;

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    /// Unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            enabled: lookup("OBSERVABILITY_ENABLED")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
            interval_seconds: lookup("OBSERVABILITY_INTERVAL")
                .unwrap_or_else(|| "60".to_string())
                .parse::<u64>()
                .unwrap_or(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(&|_| None);
        assert!(config.enabled);
        assert_eq!(config.interval_seconds, 60);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let lookup = |key: &str| match key {
            "OBSERVABILITY_ENABLED" => Some("false".to_string()),
            "OBSERVABILITY_INTERVAL" => Some("soon".to_string()),
            _ => None,
        };
        let config = ObservabilityEnvConfig::from_lookup(&lookup);
        assert!(!config.enabled);
        assert_eq!(config.interval_seconds, 60);
    }
}
