use crate::domain::errors::DataError;
use crate::domain::market::price_series::PriceSeries;
use crate::domain::task::AnalysisResult;
use anyhow::Result;
use async_trait::async_trait;

/// Source of previously acquired closing-price histories.
pub trait PriceHistoryProvider: Send + Sync {
    fn load(&self, ticker: &str) -> Result<PriceSeries, DataError>;
}

/// Destination for finished analysis results.
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, result: &AnalysisResult) -> Result<()>;
}
