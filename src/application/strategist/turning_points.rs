use crate::domain::trading::signals::{TurningPoint, TurningPointKind};

/// Local minima and maxima of `prices` over a symmetric window.
///
/// Day `i` is examined for `window <= i < len - window`. Comparisons are
/// non-strict, so plateaus produce turning points and a flat stretch yields a
/// day that is both; the minimum is listed first.
pub fn find_turning_points(prices: &[f64], window: usize) -> Vec<TurningPoint> {
    if window == 0 {
        return Vec::new();
    }

    let mut points = Vec::new();
    for i in window..prices.len().saturating_sub(window) {
        let price = prices[i];
        let neighbours = prices[i - window..i]
            .iter()
            .chain(&prices[i + 1..=i + window]);

        let (is_min, is_max) = neighbours.fold((true, true), |(min, max), &other| {
            (min && price <= other, max && price >= other)
        });

        if is_min {
            points.push(TurningPoint {
                day: i,
                price,
                kind: TurningPointKind::LocalMin,
            });
        }
        if is_max {
            points.push(TurningPoint {
                day: i,
                price,
                kind: TurningPointKind::LocalMax,
            });
        }
    }
    points
}

pub fn minima(points: &[TurningPoint]) -> impl Iterator<Item = &TurningPoint> {
    points
        .iter()
        .filter(|p| p.kind == TurningPointKind::LocalMin)
}

pub fn maxima(points: &[TurningPoint]) -> impl Iterator<Item = &TurningPoint> {
    points
        .iter()
        .filter(|p| p.kind == TurningPointKind::LocalMax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(points: &[TurningPoint], kind: TurningPointKind) -> Vec<usize> {
        points
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.day)
            .collect()
    }

    #[test]
    fn test_v_shape() {
        let prices = [100.0, 90.0, 80.0, 90.0, 100.0, 90.0, 80.0];
        let points = find_turning_points(&prices, 1);

        assert_eq!(days(&points, TurningPointKind::LocalMin), vec![2]);
        assert_eq!(days(&points, TurningPointKind::LocalMax), vec![4]);
    }

    #[test]
    fn test_monotonic_has_none() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!(find_turning_points(&prices, 3).is_empty());
    }

    #[test]
    fn test_flat_day_is_both() {
        let points = find_turning_points(&[5.0, 5.0, 5.0], 1);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].kind, TurningPointKind::LocalMin);
        assert_eq!(points[1].kind, TurningPointKind::LocalMax);
        assert!(points.iter().all(|p| p.day == 1));
    }

    #[test]
    fn test_window_larger_than_path() {
        assert!(find_turning_points(&[1.0, 2.0, 1.0], 2).is_empty());
        assert!(find_turning_points(&[1.0, 2.0, 1.0], 0).is_empty());
        assert!(find_turning_points(&[], 3).is_empty());
    }
}
