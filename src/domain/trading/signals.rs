use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurningPointKind {
    LocalMin,
    LocalMax,
}

/// Local extremum of a forecast path. `day` is the 0-based index into the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    pub day: usize,
    pub price: f64,
    pub kind: TurningPointKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub action: SignalAction,
    pub day: usize,
    pub price: f64,
}

impl TradingSignal {
    pub fn buy(day: usize, price: f64) -> Self {
        Self {
            action: SignalAction::Buy,
            day,
            price,
        }
    }

    pub fn sell(day: usize, price: f64) -> Self {
        Self {
            action: SignalAction::Sell,
            day,
            price,
        }
    }
}
