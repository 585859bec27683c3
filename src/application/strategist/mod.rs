pub mod report;
pub mod signal_generator;
pub mod simulator;
pub mod turning_points;

use crate::domain::errors::StrategyError;
use crate::domain::ml::forecast_path::ForecastPath;
use crate::domain::trading::signals::{TradingSignal, TurningPoint};
use crate::domain::trading::simulation::ProfitSimulation;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

pub use signal_generator::generate_signals;
pub use simulator::{buy_and_hold, simulate};
pub use turning_points::find_turning_points;

/// Why the buy-and-hold plan was used instead of signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoTurningPoints,
    NoSignals,
    StrategyFailure(String),
}

impl From<StrategyError> for FallbackReason {
    fn from(e: StrategyError) -> Self {
        FallbackReason::StrategyFailure(e.to_string())
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoTurningPoints => write!(f, "no turning points"),
            FallbackReason::NoSignals => write!(f, "no trading signals"),
            FallbackReason::StrategyFailure(e) => write!(f, "strategy failure: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradingPlan {
    Signals {
        turning_points: Vec<TurningPoint>,
        signals: Vec<TradingSignal>,
    },
    BuyAndHold {
        reason: FallbackReason,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub text: String,
    pub simulation: ProfitSimulation,
    pub plan: TradingPlan,
}

impl Recommendation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.plan, TradingPlan::BuyAndHold { .. })
    }
}

/// Turns a forecast path into turning points, signals and a simulated outcome.
#[derive(Debug, Clone, Copy)]
pub struct Strategist {
    window: usize,
}

impl Default for Strategist {
    fn default() -> Self {
        Self { window: 3 }
    }
}

impl Strategist {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn recommend(&self, forecast: &ForecastPath, investment: Decimal) -> Recommendation {
        let prices = forecast.prices();
        match self.signal_plan(prices, investment) {
            Ok(recommendation) => recommendation,
            Err(reason) => {
                match &reason {
                    FallbackReason::StrategyFailure(_) => {
                        warn!("Falling back to buy-and-hold: {}", reason)
                    }
                    _ => info!("Falling back to buy-and-hold: {}", reason),
                }
                self.fallback(prices, investment, reason)
            }
        }
    }

    fn signal_plan(
        &self,
        prices: &[f64],
        investment: Decimal,
    ) -> Result<Recommendation, FallbackReason> {
        if self.window == 0 {
            return Err(StrategyError::InvalidWindow.into());
        }
        simulator::validate(prices, investment)?;

        let turning_points = find_turning_points(prices, self.window);
        if turning_points.is_empty() {
            return Err(FallbackReason::NoTurningPoints);
        }
        let signals = generate_signals(&turning_points);
        if signals.is_empty() {
            return Err(FallbackReason::NoSignals);
        }

        let simulation = simulate(prices, &signals, investment)?;
        info!(
            "Strategy: {} turning points, {} signals, profit {}",
            turning_points.len(),
            signals.len(),
            report::cents(simulation.profit)
        );
        Ok(Recommendation {
            text: report::signal_report(&turning_points, &signals, &simulation),
            simulation,
            plan: TradingPlan::Signals {
                turning_points,
                signals,
            },
        })
    }

    fn fallback(
        &self,
        prices: &[f64],
        investment: Decimal,
        reason: FallbackReason,
    ) -> Recommendation {
        let simulation = buy_and_hold(prices, investment).unwrap_or_else(|e| {
            warn!("Buy-and-hold cannot be priced, keeping cash: {}", e);
            ProfitSimulation::idle(investment)
        });
        Recommendation {
            text: report::fallback_report(prices.len(), &simulation),
            simulation,
            plan: TradingPlan::BuyAndHold { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_v_shape_recommendation() {
        let path = ForecastPath::new(vec![100.0, 90.0, 80.0, 90.0, 100.0, 90.0, 80.0]);
        let rec = Strategist::new(1).recommend(&path, dec!(1000));

        match &rec.plan {
            TradingPlan::Signals { signals, .. } => {
                assert_eq!(
                    signals,
                    &vec![TradingSignal::buy(2, 80.0), TradingSignal::sell(4, 100.0)]
                );
            }
            other => panic!("expected signals, got {:?}", other),
        }
        assert_eq!(rec.simulation.profit, dec!(250));
        assert_eq!(rec.simulation.profit_percent, dec!(25));
    }

    #[test]
    fn test_increasing_path_uses_buy_and_hold() {
        let path = ForecastPath::new((0..30).map(|i| 100.0 + i as f64).collect());
        let rec = Strategist::default().recommend(&path, dec!(1000));

        assert_eq!(
            rec.plan,
            TradingPlan::BuyAndHold {
                reason: FallbackReason::NoTurningPoints
            }
        );
        let txs = &rec.simulation.transactions;
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].day, 0);
        assert_eq!(txs[1].day, 29);
        assert!(rec.text.contains("buy-and-hold"));
    }

    #[test]
    fn test_flat_path_breaks_even() {
        let path = ForecastPath::flat(100.0, 30);
        let rec = Strategist::default().recommend(&path, dec!(1000));

        assert_eq!(rec.simulation.profit, Decimal::ZERO);
        assert_eq!(rec.simulation.final_value, dec!(1000));
    }

    #[test]
    fn test_invalid_inputs_fall_back() {
        let bad = ForecastPath::new(vec![10.0, f64::NAN, 12.0]);
        let rec = Strategist::default().recommend(&bad, dec!(100));
        assert!(matches!(
            rec.plan,
            TradingPlan::BuyAndHold {
                reason: FallbackReason::StrategyFailure(_)
            }
        ));

        let rec = Strategist::new(0).recommend(&ForecastPath::flat(5.0, 10), dec!(100));
        assert!(rec.is_fallback());
        assert_eq!(rec.simulation.transactions.len(), 2);

        let rec = Strategist::default().recommend(&ForecastPath::new(Vec::new()), dec!(100));
        assert_eq!(rec.simulation, ProfitSimulation::idle(dec!(100)));
    }

    #[test]
    fn test_overflowing_trade_keeps_cash() {
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let path = ForecastPath::new(vec![0.5, 0.4, 0.3, 0.4, 0.5, 0.4, 0.3]);
        let rec = Strategist::new(1).recommend(&path, huge);

        assert!(matches!(
            rec.plan,
            TradingPlan::BuyAndHold {
                reason: FallbackReason::StrategyFailure(_)
            }
        ));
        assert_eq!(rec.simulation, ProfitSimulation::idle(huge));
    }
}
