use rust_decimal::Decimal;
use thiserror::Error;

/// Errors related to loading and validating a price history
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("Price series is empty")]
    EmptySeries,

    #[error("Insufficient data points: need {required}, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Timestamps must be strictly increasing (violation at index {index})")]
    NonIncreasingTimestamp { index: usize },

    #[error("Invalid close price at index {index}: {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("No price history found for {ticker}: {reason}")]
    NotFound { ticker: String, reason: String },

    #[error("Malformed price history for {ticker}: {reason}")]
    Malformed { ticker: String, reason: String },
}

/// Errors raised while fitting or querying a forecasting model
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("{model}: not enough samples (need {required}, got {actual})")]
    InsufficientSamples {
        model: String,
        required: usize,
        actual: usize,
    },

    #[error("{model}: fitting failed: {reason}")]
    Fit { model: String, reason: String },

    #[error("{model}: prediction failed: {reason}")]
    Predict { model: String, reason: String },

    #[error("{model}: produced a non-finite value")]
    NonFinite { model: String },

    #[error("{model}: does not support {operation}")]
    Unsupported { model: String, operation: String },
}

/// Errors raised while turning a forecast into a trading plan
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    #[error("Forecast path is empty")]
    EmptyForecast,

    #[error("Extrema window must be at least 1")]
    InvalidWindow,

    #[error("Invalid price on day {day}: {price}")]
    InvalidPrice { day: usize, price: f64 },

    #[error("Investment amount must be positive, got {amount}")]
    InvalidInvestment { amount: String },

    #[error("Arithmetic overflow on day {day} at price {price}")]
    Overflow { day: usize, price: Decimal },
}

/// Errors that reject a task before the analysis pipeline starts
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskError {
    #[error("Ticker must not be empty")]
    EmptyTicker,

    #[error("Investment amount must be a positive number, got {amount}")]
    InvalidAmount { amount: String },

    #[error(transparent)]
    Data(#[from] DataError),
}
