//! Prometheus metrics definitions for Trendcast
//!
//! All metrics use the `trendcast_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Pipeline stages that can fall back instead of failing a task
pub const FALLBACK_STAGES: [&str; 3] = ["trainer", "forecaster", "strategist"];

/// Prometheus metrics for the analysis service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Finished tasks by result status
    pub tasks_total: CounterVec,
    /// Selected model per successful task
    pub model_selected_total: CounterVec,
    /// Fallbacks taken, by stage
    pub fallbacks_total: CounterVec,
    /// End-to-end task duration in seconds
    pub task_duration_seconds: Histogram,
    /// Tasks currently being processed
    pub tasks_in_flight: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let tasks_total = CounterVec::new(
            Opts::new("trendcast_tasks_total", "Finished analysis tasks by status"),
            &["status"],
        )?;
        registry.register(Box::new(tasks_total.clone()))?;

        let model_selected_total = CounterVec::new(
            Opts::new(
                "trendcast_model_selected_total",
                "Models selected by the trainer",
            ),
            &["model"],
        )?;
        registry.register(Box::new(model_selected_total.clone()))?;

        let fallbacks_total = CounterVec::new(
            Opts::new("trendcast_fallbacks_total", "Fallbacks taken by stage"),
            &["stage"],
        )?;
        registry.register(Box::new(fallbacks_total.clone()))?;

        let task_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "trendcast_task_duration_seconds",
                "End-to-end analysis duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(task_duration_seconds.clone()))?;

        let tasks_in_flight = Gauge::with_opts(Opts::new(
            "trendcast_tasks_in_flight",
            "Tasks currently being processed",
        ))?;
        registry.register(Box::new(tasks_in_flight.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "trendcast_uptime_seconds",
            "Service uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            tasks_total,
            model_selected_total,
            fallbacks_total,
            task_duration_seconds,
            tasks_in_flight,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_tasks(&self, status: &str) {
        self.tasks_total.with_label_values(&[status]).inc();
    }

    pub fn inc_model_selected(&self, model: &str) {
        self.model_selected_total.with_label_values(&[model]).inc();
    }

    pub fn inc_fallback(&self, stage: &str) {
        self.fallbacks_total.with_label_values(&[stage]).inc();
    }

    pub fn observe_task_duration(&self, seconds: f64) {
        self.task_duration_seconds.observe(seconds);
    }

    pub fn task_count(&self, status: &str) -> u64 {
        self.tasks_total.with_label_values(&[status]).get() as u64
    }

    pub fn fallback_count(&self, stage: &str) -> u64 {
        self.fallbacks_total.with_label_values(&[stage]).get() as u64
    }

    pub fn model_count(&self, model: &str) -> u64 {
        self.model_selected_total.with_label_values(&[model]).get() as u64
    }
}
