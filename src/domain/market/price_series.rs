use crate::domain::errors::DataError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Closing-price history of one instrument.
///
/// Timestamps are strictly increasing and every close is finite and positive.
/// The series is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    timestamps: Vec<DateTime<Utc>>,
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, DataError> {
        if points.is_empty() {
            return Err(DataError::EmptySeries);
        }

        let mut timestamps = Vec::with_capacity(points.len());
        let mut closes = Vec::with_capacity(points.len());

        for (index, point) in points.into_iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(DataError::InvalidPrice {
                    index,
                    value: point.close,
                });
            }
            if let Some(prev) = timestamps.last() {
                if point.timestamp <= *prev {
                    return Err(DataError::NonIncreasingTimestamp { index });
                }
            }
            timestamps.push(point.timestamp);
            closes.push(point.close);
        }

        Ok(Self { timestamps, closes })
    }

    /// Builds a daily series starting at `start` from bare closes.
    pub fn from_daily_closes(start: DateTime<Utc>, closes: &[f64]) -> Result<Self, DataError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Last observed close. A validated series is never empty.
    pub fn last_close(&self) -> f64 {
        self.closes.last().copied().unwrap_or_default()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Rejects series shorter than `required` observations.
    pub fn ensure_min_len(&self, required: usize) -> Result<(), DataError> {
        if self.len() < required {
            return Err(DataError::InsufficientData {
                required,
                actual: self.len(),
            });
        }
        Ok(())
    }
}
