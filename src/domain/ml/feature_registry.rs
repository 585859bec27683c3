//! Feature layout shared by training and forecasting.
//!
//! Vector layout is `[lag_1 .. lag_L, rolling_mean, rolling_std, price_change]`.
//! Any change here is a breaking change for fitted models: the trainer and the
//! recursive forecaster must agree on it.

use serde::{Deserialize, Serialize};

pub const ROLLING_MEAN: &str = "rolling_mean";
pub const ROLLING_STD: &str = "rolling_std";
pub const PRICE_CHANGE: &str = "price_change";

/// Number of derived (non-lag) features appended after the lags.
pub const DERIVED_FEATURES: usize = 3;

/// Window sizes that define the feature vector shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub lag_window: usize,
    pub rolling_window: usize,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self {
            lag_window: 30,
            rolling_window: 7,
        }
    }
}

impl FeatureLayout {
    pub fn width(&self) -> usize {
        self.lag_window + DERIVED_FEATURES
    }

    /// First time step with a full lag history and a full rolling window.
    pub fn warmup(&self) -> usize {
        self.lag_window.max(self.rolling_window)
    }

    /// Ordered feature names.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = (1..=self.lag_window).map(|i| format!("lag_{i}")).collect();
        names.push(ROLLING_MEAN.to_string());
        names.push(ROLLING_STD.to_string());
        names.push(PRICE_CHANGE.to_string());
        names
    }
}

/// Feature vector for one time step.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    lag_window: usize,
    values: Vec<f64>,
}

impl FeatureVector {
    /// `lags[0]` is `lag_1` (the most recent prior price).
    pub fn new(lags: &[f64], rolling_mean: f64, rolling_std: f64, price_change: f64) -> Self {
        let mut values = Vec::with_capacity(lags.len() + DERIVED_FEATURES);
        values.extend_from_slice(lags);
        values.push(rolling_mean);
        values.push(rolling_std);
        values.push(price_change);
        Self {
            lag_window: lags.len(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn lag_window(&self) -> usize {
        self.lag_window
    }

    /// `lag(1)` is the most recent lag. Returns `None` outside `1..=lag_window`.
    pub fn lag(&self, i: usize) -> Option<f64> {
        if i == 0 || i > self.lag_window {
            return None;
        }
        self.values.get(i - 1).copied()
    }

    pub fn lags(&self) -> &[f64] {
        &self.values[..self.lag_window]
    }

    pub fn rolling_mean(&self) -> f64 {
        self.values[self.lag_window]
    }

    pub fn rolling_std(&self) -> f64 {
        self.values[self.lag_window + 1]
    }

    pub fn price_change(&self) -> f64 {
        self.values[self.lag_window + 2]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    /// Next recursive input: every lag moves one step older and `price` becomes `lag_1`.
    ///
    /// The derived features are carried over unchanged.
    pub fn advance(&self, price: f64) -> Self {
        let mut values = self.values.clone();
        if self.lag_window > 0 {
            values.copy_within(0..self.lag_window - 1, 1);
            values[0] = price;
        }
        Self {
            lag_window: self.lag_window,
            values,
        }
    }
}
