use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use trendcast::application::ml::PERSISTENCE_MODEL;
use trendcast::application::ml::candidates::{
    CandidateFit, CandidateTrainer, RandomForestTrainer, TrainingSet,
};
use trendcast::application::ml::{ModelTrainer, TrainerConfig};
use trendcast::application::pipeline::{AnalysisConfig, AnalysisPipeline};
use trendcast::domain::errors::ModelError;
use trendcast::domain::market::PriceSeries;
use trendcast::domain::ml::FeatureLayout;
use trendcast::domain::task::{AnalysisResult, AnalysisTask};
use trendcast::domain::trading::TransactionKind;
use trendcast::infrastructure::CsvPriceHistoryProvider;
use trendcast::infrastructure::json_lines::encode_result;
use trendcast::infrastructure::observability::Metrics;

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

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.1)
        .collect()
}

fn series(closes: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
    PriceSeries::from_daily_closes(start, closes).unwrap()
}

struct Broken;

impl CandidateTrainer for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn fit(&self, _data: &TrainingSet<'_>) -> Result<CandidateFit, ModelError> {
        Err(ModelError::Fit {
            model: "broken".to_string(),
            reason: "singular matrix".to_string(),
        })
    }
}

#[test]
fn test_csv_history_produces_full_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("WAVE.csv")).unwrap();
    writeln!(file, "Date,Close").unwrap();
    let start = chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    for (i, close) in wave(160).iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        writeln!(file, "{},{:.4}", date.format("%Y-%m-%d"), close).unwrap();
    }
    drop(file);

    let metrics = Metrics::new().unwrap();
    let pipeline = AnalysisPipeline::new(&quick_config()).with_metrics(metrics.clone());
    let provider = CsvPriceHistoryProvider::new(dir.path());
    let task = AnalysisTask::new("wave", dec!(1000));

    let report = match pipeline.process(&task, &provider) {
        AnalysisResult::Success(report) => report,
        AnalysisResult::Error(failure) => panic!("analysis failed: {}", failure.error),
    };

    assert_eq!(report.task_id, task.task_id);
    assert_eq!(report.forecast.horizon(), 30);
    assert!(report.forecast.prices().iter().all(|p| p.is_finite()));
    assert_eq!(report.evaluations.len(), 4);
    assert_ne!(report.best_model, PERSISTENCE_MODEL);
    assert!(report.rmse.is_some_and(f64::is_finite));
    assert_eq!(report.predicted_price, report.forecast.last().unwrap());
    assert_eq!(report.calculated_profit, report.simulation.profit.round_dp(2));
    assert!(report.recommendation.contains("**Profit calculation:**"));
    assert_eq!(report.transactions.len(), report.simulation.transactions.len());

    let last = report.simulation.transactions.last().unwrap();
    assert!(last.day <= 29);
    assert_eq!(last.shares_after, Decimal::ZERO);

    assert_eq!(metrics.task_count("success"), 1);
    assert_eq!(metrics.model_count(&report.best_model), 1);
}

#[test]
fn test_constant_history_breaks_even() {
    let pipeline = AnalysisPipeline::new(&quick_config());
    let mut task = AnalysisTask::new("FLAT", dec!(1000));
    task.chat_id = Some(12);
    task.wait_message_id = Some(345);
    let report = pipeline.run(&task, &series(&[100.0; 150])).unwrap();

    assert_eq!(report.chat_id, Some(12));
    assert_eq!(report.wait_message_id, Some(345));
    let line = encode_result(&AnalysisResult::Success(Box::new(report.clone()))).unwrap();
    let json: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["wait_message_id"], 345);

    assert!(report.forecast.prices().iter().all(|p| *p == 100.0));
    assert_eq!(report.predicted_price, 100.0);
    assert_eq!(report.price_change_percent, 0.0);
    assert_eq!(report.calculated_profit, Decimal::ZERO);
    assert_eq!(report.simulation.final_value, dec!(1000));
}

#[test]
fn test_failed_training_falls_back_to_persistence() {
    let config = quick_config();
    let candidates: Vec<Box<dyn CandidateTrainer>> =
        vec![Box::new(Broken), Box::new(Broken), Box::new(Broken), Box::new(Broken)];
    let trainer = ModelTrainer::with_candidates(&config.trainer, candidates);
    let metrics = Metrics::new().unwrap();
    let pipeline = AnalysisPipeline::with_trainer(&config, trainer).with_metrics(metrics.clone());

    let closes = wave(150);
    let last = *closes.last().unwrap();
    let task = AnalysisTask::new("WAVE", dec!(500));
    let report = pipeline.run(&task, &series(&closes)).unwrap();

    assert_eq!(report.best_model, PERSISTENCE_MODEL);
    assert_eq!(report.rmse, None);
    assert!(report.forecast.prices().iter().all(|p| *p == last));
    assert_eq!(report.calculated_profit, Decimal::ZERO);
    assert_eq!(metrics.fallback_count("trainer"), 1);
    assert_eq!(metrics.model_count(PERSISTENCE_MODEL), 1);
}

#[test]
fn test_rejections_become_error_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("TINY.csv")).unwrap();
    writeln!(file, "Date,Close").unwrap();
    for day in 1..=20 {
        writeln!(file, "2024-01-{:02},{}", day, 10.0 + day as f64).unwrap();
    }
    drop(file);

    let pipeline = AnalysisPipeline::new(&quick_config());
    let provider = CsvPriceHistoryProvider::new(dir.path());

    let mut task = AnalysisTask::new("TINY", dec!(1000));
    task.user_id = Some(42);
    task.chat_id = Some(-7);
    task.wait_message_id = Some(8);
    match pipeline.process(&task, &provider) {
        AnalysisResult::Error(failure) => {
            assert!(failure.error.contains("need 100"));
            assert_eq!(failure.task_id, Some(task.task_id));
            assert_eq!(failure.user_id, Some(42));
            assert_eq!(failure.chat_id, Some(-7));
            assert_eq!(failure.wait_message_id, Some(8));
            assert_eq!(failure.ticker.as_deref(), Some("TINY"));
        }
        other => panic!("expected error, got {:?}", other),
    }

    let missing = AnalysisTask::new("GHOST", dec!(1000));
    assert!(!pipeline.process(&missing, &provider).is_success());

    let free = AnalysisTask::new("TINY", Decimal::ZERO);
    assert!(!pipeline.process(&free, &provider).is_success());
}

#[test]
fn test_account_is_all_in_or_all_out() {
    let pipeline = AnalysisPipeline::new(&quick_config());
    let task = AnalysisTask::new("WAVE", dec!(1000));
    let report = pipeline.run(&task, &series(&wave(150))).unwrap();

    let sim = &report.simulation;
    for tx in &sim.transactions {
        assert!(tx.cash_after.is_zero() != tx.shares_after.is_zero());
    }
    let liquidations: Vec<_> = sim
        .transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::FinalLiquidation)
        .collect();
    assert!(liquidations.len() <= 1);
    assert!(liquidations.iter().all(|tx| tx.day == 29));
    assert_eq!(sim.profit, sim.final_value - sim.initial_investment);
}
