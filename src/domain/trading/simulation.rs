use crate::domain::trading::signals::SignalAction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Trade triggered by a trading signal
    Signal,
    /// Position closed on the last forecast day
    FinalLiquidation,
    /// Leg of the buy-and-hold fallback plan
    BuyAndHold,
}

/// One executed trade, with the balances right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub day: usize,
    pub action: SignalAction,
    pub kind: TransactionKind,
    pub price: Decimal,
    pub shares_traded: Decimal,
    pub cash_after: Decimal,
    pub shares_after: Decimal,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match (self.kind, self.action) {
            (TransactionKind::FinalLiquidation, _) => "Final sale",
            (_, SignalAction::Buy) => "Buy",
            (_, SignalAction::Sell) => "Sell",
        };
        match self.action {
            SignalAction::Buy => write!(
                f,
                "Day {}: {} at ${:.2}, bought {:.2} shares",
                self.day, label, self.price, self.shares_traded
            ),
            SignalAction::Sell => write!(
                f,
                "Day {}: {} at ${:.2}, proceeds ${:.2}",
                self.day, label, self.price, self.cash_after
            ),
        }
    }
}

/// Outcome of simulating a long-only, fully-invested-or-fully-cash plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitSimulation {
    pub initial_investment: Decimal,
    pub final_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
    pub transactions: Vec<Transaction>,
}

impl ProfitSimulation {
    pub fn new(
        initial_investment: Decimal,
        final_value: Decimal,
        transactions: Vec<Transaction>,
    ) -> Self {
        let profit = final_value - initial_investment;
        let profit_percent = if initial_investment.is_zero() {
            Decimal::ZERO
        } else {
            profit / initial_investment * Decimal::ONE_HUNDRED
        };
        Self {
            initial_investment,
            final_value,
            profit,
            profit_percent,
            transactions,
        }
    }

    /// Plan that never trades: the investment stays in cash.
    pub fn idle(initial_investment: Decimal) -> Self {
        Self::new(initial_investment, initial_investment, Vec::new())
    }

    pub fn transaction_lines(&self) -> Vec<String> {
        self.transactions.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profit_figures() {
        let sim = ProfitSimulation::new(dec!(1000), dec!(1250), Vec::new());
        assert_eq!(sim.profit, dec!(250));
        assert_eq!(sim.profit_percent, dec!(25));
    }

    #[test]
    fn test_transaction_display() {
        let tx = Transaction {
            day: 2,
            action: SignalAction::Buy,
            kind: TransactionKind::Signal,
            price: dec!(80),
            shares_traded: dec!(12.5),
            cash_after: Decimal::ZERO,
            shares_after: dec!(12.5),
        };
        assert_eq!(tx.to_string(), "Day 2: Buy at $80.00, bought 12.50 shares");
    }
}
