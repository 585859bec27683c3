//! ARIMA(p, d, q) estimated with the two-stage Hannan-Rissanen procedure.
//!
//! 1. A long autoregression on the differenced series yields innovation estimates.
//! 2. The differenced value is regressed on its own `p` lags and on `q` lagged
//!    innovations. Both stages are ordinary least squares with an intercept.
//!
//! Forecasts are produced on the differenced scale (future innovations are zero) and
//! integrated back onto the price scale.

use crate::domain::errors::ModelError;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use std::fmt;
use std::str::FromStr;

const MODEL_NAME: &str = "arima";
/// Lower bound on the stage-one autoregression order.
const MIN_LONG_AR_ORDER: usize = 10;

type Ols = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 2, d: 1, q: 2 }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = anyhow::Error;

    /// Parses `"p,d,q"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid ARIMA order '{}': {}", s, e))?;
        match parts.as_slice() {
            [p, d, q] if p + q > 0 => Ok(Self {
                p: *p,
                d: *d,
                q: *q,
            }),
            _ => anyhow::bail!(
                "Invalid ARIMA order '{}': expected 'p,d,q' with p + q > 0",
                s
            ),
        }
    }
}

/// Fitted ARIMA model.
pub struct ArimaModel {
    order: ArimaOrder,
    long_ar_order: usize,
    long_ar: Ols,
    arma: Ols,
}

impl fmt::Debug for ArimaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArimaModel")
            .field("order", &self.order)
            .field("long_ar_order", &self.long_ar_order)
            .finish_non_exhaustive()
    }
}

impl ArimaModel {
    pub fn fit(prices: &[f64], order: ArimaOrder) -> Result<Self, ModelError> {
        if order.p + order.q == 0 {
            return Err(fit_error("order must have p + q > 0"));
        }

        let diffed = difference(prices, order.d);
        let n = diffed.len();
        let long_ar_order = (order.p + order.q).max(MIN_LONG_AR_ORDER).min(n / 4);
        let start = long_ar_order.max(order.p) + order.q;
        let required_rows = order.p + order.q + 2;

        if long_ar_order < order.p.max(order.q).max(1) || n < start + required_rows {
            return Err(ModelError::InsufficientSamples {
                model: MODEL_NAME.to_string(),
                required: start + required_rows + order.d,
                actual: prices.len(),
            });
        }

        // Stage 1: long autoregression for innovation estimates
        let (x, y) = lagged_rows(&diffed, long_ar_order);
        let long_ar = fit_ols(x, &y)?;
        let innovations = innovations(&long_ar, &diffed, long_ar_order)?;

        // Stage 2: ARMA regression on own lags and lagged innovations
        let mut rows = Vec::with_capacity(n - start);
        let mut targets = Vec::with_capacity(n - start);
        for t in start..n {
            rows.push(arma_row(&diffed, &innovations, t, order));
            targets.push(diffed[t]);
        }
        let arma = fit_ols(rows, &targets)?;

        Ok(Self {
            order,
            long_ar_order,
            long_ar,
            arma,
        })
    }

    /// Forecasts `horizon` prices following `history`.
    ///
    /// Innovations are re-estimated over `history` with the fitted stage-one model, so
    /// the same fit can be conditioned on a longer history than it was trained on.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>, ModelError> {
        let order = self.order;
        let diffed = difference(history, order.d);
        if diffed.len() <= self.long_ar_order.max(order.p).max(order.q) {
            return Err(ModelError::InsufficientSamples {
                model: MODEL_NAME.to_string(),
                required: self.long_ar_order.max(order.p).max(order.q) + order.d + 1,
                actual: history.len(),
            });
        }

        let mut values = diffed;
        let mut shocks = innovations(&self.long_ar, &values, self.long_ar_order)?;

        for _ in 0..horizon {
            let t = values.len();
            let row = arma_row(&values, &shocks, t, order);
            let next = predict_one(&self.arma, row)?;
            values.push(next);
            shocks.push(0.0);
        }

        let forecast_diffs = &values[values.len() - horizon..];
        let prices = integrate(history, forecast_diffs, order.d);
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFinite {
                model: MODEL_NAME.to_string(),
            });
        }
        Ok(prices)
    }
}

/// `d`-th order differences.
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undoes `d` rounds of differencing for values that continue `history`.
fn integrate(history: &[f64], diffs: &[f64], d: usize) -> Vec<f64> {
    // Last value of each differencing level 0..d, taken from the history.
    let anchors: Vec<f64> = (0..d)
        .map(|level| difference(history, level).last().copied().unwrap_or(0.0))
        .collect();

    let mut result = diffs.to_vec();
    for level in (0..d).rev() {
        let mut acc = anchors[level];
        for value in result.iter_mut() {
            acc += *value;
            *value = acc;
        }
    }
    result
}

fn lagged_rows(data: &[f64], lags: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut x = Vec::with_capacity(data.len().saturating_sub(lags));
    let mut y = Vec::with_capacity(data.len().saturating_sub(lags));
    for t in lags..data.len() {
        x.push((1..=lags).map(|i| data[t - i]).collect());
        y.push(data[t]);
    }
    (x, y)
}

/// Residuals of the long autoregression; zero where its lags are unavailable.
fn innovations(long_ar: &Ols, data: &[f64], lags: usize) -> Result<Vec<f64>, ModelError> {
    let (x, y) = lagged_rows(data, lags);
    let fitted = predict_rows(long_ar, x)?;
    let mut residuals = vec![0.0; lags];
    residuals.extend(y.iter().zip(&fitted).map(|(actual, fit)| actual - fit));
    Ok(residuals)
}

fn arma_row(values: &[f64], shocks: &[f64], t: usize, order: ArimaOrder) -> Vec<f64> {
    let mut row = Vec::with_capacity(order.p + order.q);
    row.extend((1..=order.p).map(|i| values[t - i]));
    row.extend((1..=order.q).map(|i| shocks[t - i]));
    row
}

fn fit_ols(rows: Vec<Vec<f64>>, targets: &[f64]) -> Result<Ols, ModelError> {
    let x = DenseMatrix::from_2d_vec(&rows).map_err(fit_error)?;
    let params =
        LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
    LinearRegression::fit(&x, &targets.to_vec(), params).map_err(fit_error)
}

fn predict_rows(model: &Ols, rows: Vec<Vec<f64>>) -> Result<Vec<f64>, ModelError> {
    let x = DenseMatrix::from_2d_vec(&rows).map_err(predict_error)?;
    model.predict(&x).map_err(predict_error)
}

fn predict_one(model: &Ols, row: Vec<f64>) -> Result<f64, ModelError> {
    predict_rows(model, vec![row])?
        .first()
        .copied()
        .ok_or_else(|| predict_error("no prediction returned"))
}

fn fit_error(reason: impl fmt::Display) -> ModelError {
    ModelError::Fit {
        model: MODEL_NAME.to_string(),
        reason: reason.to_string(),
    }
}

fn predict_error(reason: impl fmt::Display) -> ModelError {
    ModelError::Predict {
        model: MODEL_NAME.to_string(),
        reason: reason.to_string(),
    }
}
