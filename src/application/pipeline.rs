use crate::application::ml::{
    ForecastStatus, Forecaster, ModelTrainer, TrainerConfig, TrainingOutcome,
};
use crate::application::strategist::{Recommendation, Strategist, report};
use crate::domain::errors::TaskError;
use crate::domain::market::price_series::PriceSeries;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::task::{AnalysisFailure, AnalysisReport, AnalysisResult, AnalysisTask};
use crate::infrastructure::observability::Metrics;
use std::time::Instant;
use tracing::{error, info, info_span};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub trainer: TrainerConfig,
    pub horizon_days: usize,
    pub extrema_window: usize,
    pub min_observations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trainer: TrainerConfig::default(),
            horizon_days: 30,
            extrema_window: 3,
            min_observations: 100,
        }
    }
}

/// Runs one task through training, forecasting and strategy, strictly in that order.
pub struct AnalysisPipeline {
    trainer: ModelTrainer,
    forecaster: Forecaster,
    strategist: Strategist,
    min_observations: usize,
    metrics: Option<Metrics>,
}

impl AnalysisPipeline {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_trainer(config, ModelTrainer::new(&config.trainer))
    }

    pub fn with_trainer(config: &AnalysisConfig, trainer: ModelTrainer) -> Self {
        let forecaster = Forecaster::new(config.horizon_days, *trainer.builder());
        Self {
            trainer,
            forecaster,
            strategist: Strategist::new(config.extrema_window),
            min_observations: config.min_observations,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Loads the task's history and analyses it. Never panics on bad input; every
    /// rejection becomes an error result.
    pub fn process(
        &self,
        task: &AnalysisTask,
        provider: &dyn PriceHistoryProvider,
    ) -> AnalysisResult {
        let span = info_span!("analysis", task_id = %task.task_id, ticker = %task.ticker);
        let _enter = span.enter();
        let started = Instant::now();

        let outcome = task
            .validate()
            .and_then(|_| provider.load(&task.ticker).map_err(TaskError::from))
            .and_then(|series| self.run(task, &series));

        let result = match outcome {
            Ok(report) => {
                info!(
                    "Analysis complete: model={}, predicted={:.2}, profit={}",
                    report.best_model, report.predicted_price, report.calculated_profit
                );
                AnalysisResult::Success(Box::new(report))
            }
            Err(e) => {
                error!("Analysis rejected: {}", e);
                AnalysisResult::Error(AnalysisFailure::for_task(task, e))
            }
        };

        if let Some(metrics) = &self.metrics {
            let status = if result.is_success() { "success" } else { "error" };
            metrics.inc_tasks(status);
            metrics.observe_task_duration(started.elapsed().as_secs_f64());
        }
        result
    }

    /// Analyses an already loaded series.
    pub fn run(
        &self,
        task: &AnalysisTask,
        series: &PriceSeries,
    ) -> Result<AnalysisReport, TaskError> {
        task.validate()?;
        series.ensure_min_len(self.min_observations)?;
        match series.last_timestamp() {
            Some(last) => info!(
                "Analysing {} observations up to {}",
                series.len(),
                last.format("%Y-%m-%d")
            ),
            None => info!("Analysing {} observations", series.len()),
        }

        let training = self.trainer.train_and_select(series.closes());
        let forecast = self.forecaster.forecast(training.model.as_ref(), series);
        let recommendation = self.strategist.recommend(&forecast.path, task.amount);
        self.record_stage_metrics(&training, &forecast.status, &recommendation);

        let current_price = forecast.current_price;
        let predicted_price = forecast.path.last().unwrap_or(current_price);
        let simulation = recommendation.simulation;

        Ok(AnalysisReport {
            task_id: task.task_id,
            user_id: task.user_id,
            chat_id: task.chat_id,
            wait_message_id: task.wait_message_id,
            ticker: task.ticker.clone(),
            amount: task.amount,
            current_price,
            predicted_price,
            price_change_percent: report::percent_change(current_price, predicted_price),
            recommendation: recommendation.text,
            transactions: simulation.transaction_lines(),
            calculated_profit: report::cents(simulation.profit),
            simulation,
            rmse: training.model.as_ref().map(|_| training.best_rmse),
            best_model: training.name,
            evaluations: training.evaluations,
            forecast: forecast.path,
            chart: None,
        })
    }

    fn record_stage_metrics(
        &self,
        training: &TrainingOutcome,
        status: &ForecastStatus,
        recommendation: &Recommendation,
    ) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        metrics.inc_model_selected(&training.name);
        if training.is_persistence() {
            metrics.inc_fallback("trainer");
        }
        if matches!(status, ForecastStatus::Degraded { .. }) {
            metrics.inc_fallback("forecaster");
        }
        if recommendation.is_fallback() {
            metrics.inc_fallback("strategist");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::candidates::RandomForestTrainer;
    use crate::domain::errors::DataError;
    use crate::domain::ml::feature_registry::FeatureLayout;
    use crate::infrastructure::mock::InMemoryPriceHistoryProvider;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn quick_config() -> AnalysisConfig {
        AnalysisConfig {
            trainer: TrainerConfig {
                layout: FeatureLayout {
                    lag_window: 10,
                    rolling_window: 5,
                },
                random_forest: RandomForestTrainer {
                    n_trees: 5,
                    max_depth: 4,
                    min_samples_split: 2,
                },
                ..TrainerConfig::default()
            },
            ..AnalysisConfig::default()
        }
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        PriceSeries::from_daily_closes(start, closes).unwrap()
    }

    #[test]
    fn test_constant_prices_break_even() {
        let pipeline = AnalysisPipeline::new(&quick_config());
        let task = AnalysisTask::new("FLAT", dec!(1000));
        let report = pipeline.run(&task, &series(&[100.0; 150])).unwrap();

        assert_eq!(report.forecast.prices(), &[100.0; 30]);
        assert_eq!(report.calculated_profit, dec!(0));
        assert_eq!(report.current_price, 100.0);
        assert!(report.chart.is_none());
    }

    #[test]
    fn test_short_history_is_rejected() {
        let pipeline = AnalysisPipeline::new(&quick_config());
        let task = AnalysisTask::new("TINY", dec!(1000));
        let err = pipeline.run(&task, &series(&[100.0; 99])).unwrap_err();

        assert_eq!(
            err,
            TaskError::Data(DataError::InsufficientData {
                required: 100,
                actual: 99
            })
        );
    }

    #[test]
    fn test_process_reports_missing_ticker_and_metrics() {
        let metrics = Metrics::new().expect("metrics");
        let pipeline = AnalysisPipeline::new(&quick_config()).with_metrics(metrics.clone());
        let provider = InMemoryPriceHistoryProvider::new();
        let task = AnalysisTask::new("NOPE", dec!(50));

        let result = pipeline.process(&task, &provider);

        match result {
            AnalysisResult::Error(failure) => {
                assert_eq!(failure.ticker.as_deref(), Some("NOPE"));
                assert_eq!(failure.task_id, Some(task.task_id));
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(metrics.task_count("error"), 1);
    }
}
