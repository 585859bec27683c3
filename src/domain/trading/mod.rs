// Trading plan entities and value objects
pub mod signals;
pub mod simulation;

pub use signals::{SignalAction, TradingSignal, TurningPoint, TurningPointKind};
pub use simulation::{ProfitSimulation, Transaction, TransactionKind};
