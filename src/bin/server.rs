//! Trendcast Server - Headless analysis service
//!
//! Reads one JSON task per line from stdin and writes one JSON result per line to
//! stdout. Logs and metric snapshots go to stderr.
//!
//! # Usage
//! ```sh
//! echo '{"ticker":"AAPL","amount":1000}' | cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `ANALYSIS_WORKERS` - Concurrent analyses (default: available parallelism)
//! - `DATA_DIR` - Directory with <TICKER>.csv histories (default: data)
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;
use trendcast::application::pipeline::AnalysisPipeline;
use trendcast::application::worker_pool::{AnalysisWorkerPool, TaskEnvelope};
use trendcast::config::Config;
use trendcast::infrastructure::json_lines::parse_task_line;
use trendcast::infrastructure::observability::{Metrics, MetricsReporter};
use trendcast::infrastructure::{CsvPriceHistoryProvider, JsonLinesPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging (stderr only, stdout carries results)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    info!("Trendcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    let analysis = config.analysis_config()?;
    info!(
        "Configuration loaded: Workers={}, DataDir={}, Horizon={}d",
        config.service.workers,
        config.service.data_dir.display(),
        analysis.horizon_days
    );

    let metrics = Metrics::new()?;
    let pipeline = Arc::new(AnalysisPipeline::new(&analysis).with_metrics(metrics.clone()));
    let provider = Arc::new(CsvPriceHistoryProvider::new(config.service.data_dir.clone()));
    let pool = Arc::new(
        AnalysisWorkerPool::new(pipeline, provider, config.service.workers)
            .with_metrics(metrics.clone()),
    );

    // Start metrics reporter if enabled
    if config.observability.enabled {
        let interval = config.observability.interval_seconds;
        let reporter = MetricsReporter::new(metrics.clone(), interval);
        tokio::spawn(async move {
            reporter.run().await;
        });
        info!("Metrics reporter started (interval: {}s)", interval);
    } else {
        info!("Metrics reporting disabled.");
    }

    let (tx, rx) = mpsc::channel::<TaskEnvelope>(config.service.workers * 4);
    let publisher = Arc::new(JsonLinesPublisher::stdout());
    let worker = tokio::spawn(pool.run(rx, publisher));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read task from stdin")? else {
                    info!("Input closed, draining remaining tasks...");
                    break;
                };
                if let Some(envelope) = parse_task_line(&line) {
                    if tx.send(envelope).await.is_err() {
                        warn!("Worker pool stopped accepting tasks");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Draining in-flight tasks...");
                break;
            }
        }
    }

    drop(tx);
    let published = worker.await.context("Worker pool task failed")?;
    info!("Server exiting after {} results.", published);

    Ok(())
}
