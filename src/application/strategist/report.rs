use super::turning_points::{maxima, minima};
use crate::domain::trading::signals::{TradingSignal, TurningPoint};
use crate::domain::trading::simulation::ProfitSimulation;
use rust_decimal::Decimal;

const LISTED_POINTS: usize = 3;
const LISTED_SIGNALS: usize = 5;

pub fn signal_report(
    points: &[TurningPoint],
    signals: &[TradingSignal],
    simulation: &ProfitSimulation,
) -> String {
    let mut lines = vec!["**Trading recommendations:**".to_string()];

    let buys = format_points(minima(points));
    if !buys.is_empty() {
        lines.push(format!("Buy: {}", buys));
    }
    let sells = format_points(maxima(points));
    if !sells.is_empty() {
        lines.push(format!("Sell: {}", sells));
    }

    lines.push(String::new());
    lines.push("**Recommended strategy:**".to_string());
    for (i, signal) in signals.iter().take(LISTED_SIGNALS).enumerate() {
        lines.push(format!(
            "{}. Day {}: {} at ${:.2}",
            i + 1,
            signal.day,
            signal.action,
            signal.price
        ));
    }

    lines.push(String::new());
    lines.push(profit_section(simulation));
    lines.join("\n")
}

pub fn fallback_report(horizon: usize, simulation: &ProfitSimulation) -> String {
    let last_day = horizon.saturating_sub(1);
    [
        "**Recommendations:**".to_string(),
        "No clear entry or exit points found. A buy-and-hold strategy is recommended.".to_string(),
        String::new(),
        "**Alternative strategy:**".to_string(),
        "- Day 0: Buy at the current forecast price".to_string(),
        format!("- Day {}: Sell at the final forecast price", last_day),
        String::new(),
        profit_section(simulation),
    ]
    .join("\n")
}

pub fn profit_section(simulation: &ProfitSimulation) -> String {
    let sign = if simulation.profit_percent.is_sign_negative() {
        ""
    } else {
        "+"
    };
    let mut lines = vec![
        "**Profit calculation:**".to_string(),
        format!(
            "Initial investment: ${:.2}",
            cents(simulation.initial_investment)
        ),
        format!("Final value: ${:.2}", cents(simulation.final_value)),
        format!(
            "Profit: ${:.2} ({}{:.2}%)",
            cents(simulation.profit),
            sign,
            cents(simulation.profit_percent)
        ),
    ];

    if !simulation.transactions.is_empty() {
        lines.push(String::new());
        lines.push("**Transactions:**".to_string());
        lines.extend(simulation.transaction_lines());
    }
    lines.join("\n")
}

fn format_points<'a>(points: impl Iterator<Item = &'a TurningPoint>) -> String {
    points
        .take(LISTED_POINTS)
        .map(|p| format!("day {} (${:.2})", p.day, p.price))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Percent change from `from` to `to`; zero when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Rounds a money amount for display and for the result record.
pub fn cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
