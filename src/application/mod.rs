// Feature building, model training and forecasting
pub mod ml;

// Turning points, signals and profit simulation
pub mod strategist;

// Per-task orchestration
pub mod pipeline;

// Concurrent task processing
pub mod worker_pool;
