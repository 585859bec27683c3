use crate::domain::trading::signals::{TradingSignal, TurningPoint, TurningPointKind};

/// Turns ordered turning points into an alternating buy/sell sequence.
///
/// Starts flat. The first minimum seen while flat buys, the first maximum seen
/// while holding sells; every other point is ignored.
pub fn generate_signals(points: &[TurningPoint]) -> Vec<TradingSignal> {
    let mut ordered: Vec<&TurningPoint> = points.iter().collect();
    ordered.sort_by_key(|p| (p.day, kind_rank(p.kind)));

    let mut holding = false;
    let mut signals = Vec::new();
    for point in ordered {
        match point.kind {
            TurningPointKind::LocalMin if !holding => {
                signals.push(TradingSignal::buy(point.day, point.price));
                holding = true;
            }
            TurningPointKind::LocalMax if holding => {
                signals.push(TradingSignal::sell(point.day, point.price));
                holding = false;
            }
            _ => {}
        }
    }
    signals
}

fn kind_rank(kind: TurningPointKind) -> u8 {
    match kind {
        TurningPointKind::LocalMin => 0,
        TurningPointKind::LocalMax => 1,
    }
}
