use crate::domain::ml::feature_registry::{FeatureLayout, FeatureVector};
use statrs::statistics::{Data, Distribution};

/// Turns a close-price series into lag + rolling-statistics feature vectors.
///
/// The same builder (and layout) must be used for training and for seeding the
/// recursive forecast, otherwise the fitted model sees a different vector shape.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder {
    layout: FeatureLayout,
}

impl FeatureBuilder {
    pub fn new(layout: FeatureLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    /// One vector per step `t` in `warmup..len`. Steps without a full history are dropped.
    pub fn build(&self, closes: &[f64]) -> Vec<FeatureVector> {
        (self.layout.warmup()..closes.len())
            .filter_map(|t| self.vector_at(closes, t))
            .collect()
    }

    /// Supervised rows: the vector for step `t` paired with the close at `t + 1`.
    pub fn supervised(&self, closes: &[f64]) -> (Vec<FeatureVector>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for t in self.layout.warmup()..closes.len().saturating_sub(1) {
            if let Some(fv) = self.vector_at(closes, t) {
                rows.push(fv);
                targets.push(closes[t + 1]);
            }
        }
        (rows, targets)
    }

    /// Vector for the last observed step, used to start recursive forecasting.
    pub fn seed(&self, closes: &[f64]) -> Option<FeatureVector> {
        let last = closes.len().checked_sub(1)?;
        self.vector_at(closes, last)
    }

    pub fn vector_at(&self, closes: &[f64], t: usize) -> Option<FeatureVector> {
        let lag_window = self.layout.lag_window;
        let rolling_window = self.layout.rolling_window;
        if t >= closes.len() || t < self.layout.warmup() || t == 0 || rolling_window == 0 {
            return None;
        }

        let lags: Vec<f64> = (1..=lag_window).map(|i| closes[t - i]).collect();

        let window = Data::new(closes[t + 1 - rolling_window..=t].to_vec());
        let rolling_mean = window.mean()?;
        let rolling_std = window.std_dev()?;
        if !rolling_mean.is_finite() || !rolling_std.is_finite() {
            return None;
        }

        let prev = closes[t - 1];
        let price_change = (closes[t] - prev) / prev;

        Some(FeatureVector::new(
            &lags,
            rolling_mean,
            rolling_std,
            price_change,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_vector_count_and_width() {
        let builder = FeatureBuilder::new(FeatureLayout::default());
        let closes = ramp(100);
        let vectors = builder.build(&closes);

        assert_eq!(vectors.len(), 100 - 30);
        assert!(vectors.iter().all(|v| v.len() == 33));
    }

    #[test]
    fn test_vector_contents() {
        let builder = FeatureBuilder::new(FeatureLayout {
            lag_window: 3,
            rolling_window: 2,
        });
        let closes = vec![10.0, 11.0, 12.0, 15.0];
        let vectors = builder.build(&closes);

        assert_eq!(vectors.len(), 1);
        let fv = &vectors[0];
        assert_eq!(fv.lags(), &[12.0, 11.0, 10.0]);
        assert!((fv.rolling_mean() - 13.5).abs() < 1e-12);
        // sample std of [12, 15]
        assert!((fv.rolling_std() - 4.5_f64.sqrt()).abs() < 1e-12);
        assert!((fv.price_change() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_supervised_targets_are_next_close() {
        let builder = FeatureBuilder::new(FeatureLayout {
            lag_window: 2,
            rolling_window: 2,
        });
        let closes = ramp(6);
        let (rows, targets) = builder.supervised(&closes);

        assert_eq!(rows.len(), 3);
        assert_eq!(targets, vec![4.0, 5.0, 6.0]);
        assert_eq!(rows[0].lags(), &[2.0, 1.0]);
    }

    #[test]
    fn test_seed_uses_last_step() {
        let builder = FeatureBuilder::new(FeatureLayout {
            lag_window: 2,
            rolling_window: 2,
        });
        let seed = builder.seed(&ramp(5)).unwrap();
        assert_eq!(seed.lags(), &[4.0, 3.0]);
        assert!(builder.seed(&[1.0]).is_none());
    }
}
