use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Train/test division where every train index precedes every test index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronologicalSplit {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

impl ChronologicalSplit {
    /// Splits `len` rows at `floor(len * (1 - test_fraction))`.
    ///
    /// Returns `None` when either side would be empty or the fraction is outside (0, 1).
    pub fn new(len: usize, test_fraction: f64) -> Option<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return None;
        }
        let split = (len as f64 * (1.0 - test_fraction)).floor() as usize;
        if split == 0 || split >= len {
            return None;
        }
        Some(Self {
            train: 0..split,
            test: split..len,
        })
    }

    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }
}

/// Hold-out score of one candidate. Failed candidates carry infinite errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub name: String,
    pub rmse: f64,
    pub mape: f64,
}

impl EvaluationResult {
    pub fn failed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rmse: f64::INFINITY,
            mape: f64::INFINITY,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.rmse.is_finite()
    }
}

/// Root mean squared error. `NaN` for empty or mismatched inputs.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let sq_err: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sq_err / actual.len() as f64).sqrt()
}

/// Mean absolute percentage error as a fraction, guarding zero actuals with `f64::EPSILON`.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / a.abs().max(f64::EPSILON))
        .sum();
    total / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_80_20() {
        let split = ChronologicalSplit::new(100, 0.2).unwrap();
        assert_eq!(split.train, 0..80);
        assert_eq!(split.test, 80..100);
    }

    #[test]
    fn test_split_rejects_degenerate() {
        assert!(ChronologicalSplit::new(1, 0.2).is_none());
        assert!(ChronologicalSplit::new(100, 0.0).is_none());
        assert!(ChronologicalSplit::new(100, 1.0).is_none());
    }

    #[test]
    fn test_metrics() {
        let actual = [100.0, 200.0];
        let predicted = [110.0, 180.0];
        assert!((rmse(&actual, &predicted) - 250.0_f64.sqrt()).abs() < 1e-12);
        assert!((mape(&actual, &predicted) - 0.1).abs() < 1e-12);
        assert!(rmse(&actual, &[1.0]).is_nan());
    }
}
