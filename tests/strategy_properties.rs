//! Property tests for the forecasting and strategy invariants.
//!
//! 1. Turning points mirror under negation of the path
//! 2. Signals strictly alternate, starting with a buy
//! 3. The simulated account is always all-cash or all-shares
//! 4. Chronological splits never leak test rows into training
//! 5. Feature tables drop exactly the warm-up steps

use proptest::prelude::*;
use rust_decimal::Decimal;
use trendcast::application::ml::FeatureBuilder;
use trendcast::application::strategist::turning_points::{maxima, minima};
use trendcast::application::strategist::{find_turning_points, generate_signals, simulate};
use trendcast::domain::ml::{ChronologicalSplit, FeatureLayout};
use trendcast::domain::trading::{SignalAction, TransactionKind};

fn arb_path() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((50.0..150.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 1..60)
}

fn arb_investment() -> impl Strategy<Value = Decimal> {
    (1u64..100_000).prop_map(Decimal::from)
}

proptest! {
    #[test]
    fn turning_points_mirror_under_negation(prices in arb_path(), window in 1usize..5) {
        let negated: Vec<f64> = prices.iter().map(|p| -p).collect();
        let points = find_turning_points(&prices, window);
        let mirrored = find_turning_points(&negated, window);

        let min_days: Vec<usize> = minima(&points).map(|p| p.day).collect();
        let max_days: Vec<usize> = maxima(&mirrored).map(|p| p.day).collect();
        prop_assert_eq!(min_days, max_days);

        let max_days: Vec<usize> = maxima(&points).map(|p| p.day).collect();
        let min_days: Vec<usize> = minima(&mirrored).map(|p| p.day).collect();
        prop_assert_eq!(max_days, min_days);
    }

    #[test]
    fn turning_points_stay_inside_the_window(prices in arb_path(), window in 1usize..5) {
        for point in find_turning_points(&prices, window) {
            prop_assert!(point.day >= window);
            prop_assert!(point.day + window < prices.len());
            prop_assert_eq!(point.price, prices[point.day]);
        }
    }

    #[test]
    fn signals_alternate_starting_with_buy(prices in arb_path(), window in 1usize..5) {
        let signals = generate_signals(&find_turning_points(&prices, window));

        for (i, signal) in signals.iter().enumerate() {
            let expected = if i % 2 == 0 { SignalAction::Buy } else { SignalAction::Sell };
            prop_assert_eq!(signal.action, expected);
        }
        for pair in signals.windows(2) {
            prop_assert!(pair[0].day <= pair[1].day);
        }
    }

    #[test]
    fn account_is_all_cash_or_all_shares(
        prices in arb_path(),
        window in 1usize..5,
        investment in arb_investment()
    ) {
        let signals = generate_signals(&find_turning_points(&prices, window));
        let sim = simulate(&prices, &signals, investment).unwrap();

        for tx in &sim.transactions {
            prop_assert!(tx.cash_after.is_zero() != tx.shares_after.is_zero());
        }
        if let Some(last) = sim.transactions.last() {
            prop_assert!(last.shares_after.is_zero());
            prop_assert_eq!(last.action, SignalAction::Sell);
        }
        let liquidations = sim
            .transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::FinalLiquidation);
        for tx in liquidations {
            prop_assert_eq!(tx.day, prices.len() - 1);
        }
        prop_assert_eq!(sim.profit, sim.final_value - investment);
    }

    #[test]
    fn split_is_chronological(len in 0usize..500, fraction in 0.01..0.99_f64) {
        if let Some(split) = ChronologicalSplit::new(len, fraction) {
            prop_assert_eq!(split.train.start, 0);
            prop_assert_eq!(split.train.end, split.test.start);
            prop_assert_eq!(split.test.end, len);
            prop_assert!(split.train_len() > 0);
            prop_assert!(split.test_len() > 0);
        }
    }

    #[test]
    fn feature_rows_drop_warmup(
        closes in prop::collection::vec(1.0..500.0_f64, 0..80),
        lag_window in 1usize..15,
        rolling_window in 2usize..10
    ) {
        let layout = FeatureLayout { lag_window, rolling_window };
        let builder = FeatureBuilder::new(layout);
        let warmup = lag_window.max(rolling_window);

        let rows = builder.build(&closes);
        prop_assert_eq!(rows.len(), closes.len().saturating_sub(warmup));
        prop_assert!(rows.iter().all(|row| row.len() == layout.width()));

        let (supervised, targets) = builder.supervised(&closes);
        prop_assert_eq!(supervised.len(), closes.len().saturating_sub(warmup + 1));
        prop_assert_eq!(supervised.len(), targets.len());
    }
}
