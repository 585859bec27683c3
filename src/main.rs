//! Trendcast CLI - one-shot price forecasts and trading plans from CSV histories.
//!
//! # Usage
//! ```sh
//! cargo run -- analyze --ticker AAPL --amount 1000
//! cargo run -- batch --amount 1000 --data-dir data --json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;
use trendcast::application::pipeline::AnalysisPipeline;
use trendcast::config::Config;
use trendcast::domain::task::{AnalysisReport, AnalysisResult, AnalysisTask};
use trendcast::infrastructure::CsvPriceHistoryProvider;
use trendcast::infrastructure::json_lines::encode_result;
use trendcast::infrastructure::observability::Metrics;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory with <TICKER>.csv files (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON result records instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single ticker
    Analyze {
        /// Ticker whose CSV history is analysed
        #[arg(short, long)]
        ticker: String,

        /// Hypothetical investment amount
        #[arg(short, long, default_value = "1000")]
        amount: String,
    },
    /// Analyse several tickers in parallel
    Batch {
        /// Tickers (comma separated); defaults to every CSV in the data directory
        #[arg(short, long)]
        tickers: Option<String>,

        /// Hypothetical investment amount per ticker
        #[arg(short, long, default_value = "1000")]
        amount: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let analysis = config.analysis_config()?;
    let data_dir = cli.data_dir.unwrap_or(config.service.data_dir);
    let provider = CsvPriceHistoryProvider::new(data_dir);
    let metrics = Metrics::new()?;
    let pipeline = AnalysisPipeline::new(&analysis).with_metrics(metrics.clone());

    match cli.command {
        Commands::Analyze { ticker, amount } => {
            let task = AnalysisTask::new(ticker, parse_amount(&amount)?);
            let result = pipeline.process(&task, &provider);
            print_result(&result, cli.json)?;
            if !result.is_success() {
                anyhow::bail!("Analysis of {} failed", task.ticker);
            }
        }
        Commands::Batch { tickers, amount } => {
            let amount = parse_amount(&amount)?;
            let tickers: Vec<String> = match tickers {
                Some(list) => list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                None => provider.available_tickers().with_context(|| {
                    format!("Failed to list {}", provider.data_dir().display())
                })?,
            };
            info!("Analysing {} tickers", tickers.len());

            let results: Vec<AnalysisResult> = tickers
                .into_par_iter()
                .map(|ticker| {
                    let task = AnalysisTask::new(ticker, amount);
                    pipeline.process(&task, &provider)
                })
                .collect();

            for result in &results {
                print_result(result, cli.json)?;
            }
            info!(
                "Batch finished: {} succeeded, {} failed",
                metrics.task_count("success"),
                metrics.task_count("error")
            );
        }
    }

    Ok(())
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).context(format!("Failed to parse amount '{}'", raw))
}

fn print_result(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        println!("{}", encode_result(result)?);
        return Ok(());
    }
    match result {
        AnalysisResult::Success(report) => print_report(report),
        AnalysisResult::Error(failure) => println!(
            "{}: error: {}\n",
            failure.ticker.as_deref().unwrap_or("?"),
            failure.error
        ),
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("══════════════════════════════════════════════════════");
    println!("  {}  (investment ${:.2})", report.ticker, report.amount);
    println!("══════════════════════════════════════════════════════");
    println!("  Current price:    ${:.2}", report.current_price);
    println!(
        "  Predicted price:  ${:.2} ({:+.2}%) in {} days",
        report.predicted_price,
        report.price_change_percent,
        report.forecast.horizon()
    );
    match report.rmse {
        Some(rmse) => println!("  Model:            {} (RMSE {:.4})", report.best_model, rmse),
        None => println!("  Model:            {}", report.best_model),
    }
    println!();
    println!("{}", report.recommendation);
    println!();
}
