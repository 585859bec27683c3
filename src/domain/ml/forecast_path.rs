use serde::{Deserialize, Serialize};

/// Predicted closes for days 1..=H after the last observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastPath(Vec<f64>);

impl ForecastPath {
    pub fn new(prices: Vec<f64>) -> Self {
        Self(prices)
    }

    /// Flat path repeating `price` for `horizon` days.
    pub fn flat(price: f64, horizon: usize) -> Self {
        Self(vec![price; horizon])
    }

    pub fn prices(&self) -> &[f64] {
        &self.0
    }

    pub fn horizon(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Price on forecast day `day` (1-based).
    pub fn day(&self, day: usize) -> Option<f64> {
        day.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }
}
