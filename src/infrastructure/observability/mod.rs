//! Push-based observability for Trendcast
//!
//! This module provides observability through **outbound data only** - no HTTP server,
//! no incoming requests. Metrics are pushed via:
//!
//! 1. **Prometheus registry**: counters and histograms updated by the pipeline
//! 2. **Structured JSON Logs**: periodic snapshot logged through `tracing` (stderr)
//!
//! **Security**: This system only SENDS data, it never accepts requests.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
