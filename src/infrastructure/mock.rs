use crate::domain::errors::DataError;
use crate::domain::market::price_series::PriceSeries;
use crate::domain::ports::{PriceHistoryProvider, ResultPublisher};
use crate::domain::task::AnalysisResult;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Price histories held in memory, keyed by upper-case ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceHistoryProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.insert(ticker, series);
        self
    }

    pub fn insert(&mut self, ticker: &str, series: PriceSeries) {
        self.series.insert(ticker.to_uppercase(), series);
    }
}

impl PriceHistoryProvider for InMemoryPriceHistoryProvider {
    fn load(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        self.series
            .get(&ticker.to_uppercase())
            .cloned()
            .ok_or_else(|| DataError::NotFound {
                ticker: ticker.to_string(),
                reason: "not loaded".to_string(),
            })
    }
}

/// Publisher that keeps every result, for tests and dry runs.
#[derive(Clone, Default)]
pub struct MockResultPublisher {
    results: Arc<RwLock<Vec<AnalysisResult>>>,
}

impl MockResultPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn results(&self) -> Vec<AnalysisResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl ResultPublisher for MockResultPublisher {
    async fn publish(&self, result: &AnalysisResult) -> Result<()> {
        info!("MockResultPublisher: received result for {:?}", result.task_id());
        self.results.write().await.push(result.clone());
        Ok(())
    }
}
