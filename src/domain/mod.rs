// Price history domain
pub mod market;

// Features, evaluation and forecast paths
pub mod ml;

// Port interfaces
pub mod ports;

// Analysis task and result record
pub mod task;

// Turning points, signals and profit simulation
pub mod trading;

// Domain-specific error types
pub mod errors;
