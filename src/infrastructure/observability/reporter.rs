//! Push-based metrics reporter for Trendcast
//!
//! Periodically emits a metrics snapshot as structured JSON through `tracing`.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::application::ml::{ModelKind, PERSISTENCE_MODEL};
use crate::infrastructure::observability::metrics::{FALLBACK_STAGES, Metrics};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const MODEL_KINDS: [ModelKind; 4] = [
    ModelKind::RandomForest,
    ModelKind::Ridge,
    ModelKind::LinearBaseline,
    ModelKind::Arima,
];

/// Metrics snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub tasks: TaskSnapshot,
    pub models_selected: BTreeMap<String, u64>,
    pub fallbacks: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct TaskSnapshot {
    pub succeeded: u64,
    pub failed: u64,
    pub in_flight: u64,
    pub mean_duration_seconds: Option<f64>,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
/// No HTTP server, no incoming connections - only outbound data.
pub struct MetricsReporter {
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(metrics: Metrics, interval_seconds: u64) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    info!(target: "trendcast::metrics", "METRICS_JSON:{}", json);
                    info!(
                        "Tasks: {} ok / {} failed | In flight: {} | Uptime: {}s",
                        snapshot.tasks.succeeded,
                        snapshot.tasks.failed,
                        snapshot.tasks.in_flight,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.uptime_seconds.set(uptime as f64);

        let histogram = &self.metrics.task_duration_seconds;
        let observed = histogram.get_sample_count();
        let mean_duration_seconds =
            (observed > 0).then(|| histogram.get_sample_sum() / observed as f64);

        let models_selected = MODEL_KINDS
            .iter()
            .map(ModelKind::name)
            .chain(std::iter::once(PERSISTENCE_MODEL))
            .map(|name| (name.to_string(), self.metrics.model_count(name)))
            .filter(|(_, count)| *count > 0)
            .collect();
        let fallbacks = FALLBACK_STAGES
            .iter()
            .map(|stage| (stage.to_string(), self.metrics.fallback_count(stage)))
            .collect();

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            tasks: TaskSnapshot {
                succeeded: self.metrics.task_count("success"),
                failed: self.metrics.task_count("error"),
                in_flight: self.metrics.tasks_in_flight.get().max(0.0) as u64,
                mean_duration_seconds,
            },
            models_selected,
            fallbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_collection() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_tasks("success");
        metrics.inc_model_selected("ridge");
        metrics.observe_task_duration(2.0);
        let reporter = MetricsReporter::new(metrics, 60);

        let snapshot = reporter.collect_snapshot();

        assert_eq!(snapshot.tasks.succeeded, 1);
        assert_eq!(snapshot.tasks.failed, 0);
        assert_eq!(snapshot.tasks.mean_duration_seconds, Some(2.0));
        assert_eq!(snapshot.models_selected.get("ridge"), Some(&1));
        assert_eq!(snapshot.fallbacks.len(), 3);
    }

    #[test]
    fn test_snapshot_serialization() {
        let reporter = MetricsReporter::new(Metrics::new().expect("metrics"), 60);
        let json =
            serde_json::to_string(&reporter.collect_snapshot()).expect("Failed to serialize");
        assert!(json.contains("\"fallbacks\""));
        assert!(json.contains("\"in_flight\":0"));
    }
}
