//! Property-based tests for the scanner using proptest.
//!
//! Inputs are random pivot prices joined by linear segments of random length,
//! so pivots always land on real samples of the series.

use proptest::prelude::*;

use yahsd::detectors::shape::matches;
use yahsd::prelude::*;

// ==================== Test Data Generators ====================

/// Pivot indices, time and price of a random piecewise-linear series
fn arb_series(min_pivots: usize, max_pivots: usize) -> impl Strategy<Value = (Vec<usize>, Vec<f64>, Vec<f64>)> {
    (
        prop::collection::vec(50.0..150.0_f64, min_pivots..=max_pivots),
        prop::collection::vec(1usize..=5, max_pivots),
        prop::collection::vec(50.0..150.0_f64, 0..=20),
    )
        .prop_map(|(knots, gaps, tail)| {
            let mut pivots = vec![0usize];
            let mut price = vec![knots[0]];
            for (pair, &gap) in knots.windows(2).zip(&gaps) {
                for step in 1..=gap {
                    price.push(pair[0] + (pair[1] - pair[0]) * step as f64 / gap as f64);
                }
                pivots.push(price.len() - 1);
            }
            price.extend(tail);
            let time = (0..price.len()).map(|t| t as f64).collect();
            (pivots, time, price)
        })
}

fn arb_points() -> impl Strategy<Value = [PricePoint; 6]> {
    (prop::collection::vec(50.0..150.0_f64, 6), prop::collection::vec(0.5..5.0_f64, 6)).prop_map(
        |(prices, gaps)| {
            let mut t = 0.0;
            std::array::from_fn(|i| {
                t += gaps[i];
                PricePoint::new(t, prices[i])
            })
        },
    )
}

fn parallel_scanner() -> Scanner {
    ScannerBuilder::new().mode(ScanMode::Parallel).build().unwrap()
}

// ==================== Shape Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// No set of pivots is both an SHS and an iSHS
    #[test]
    fn prop_kinds_mutually_exclusive(points in arb_points()) {
        let eps = ScanConfig::default().neckline_epsilon;
        prop_assert!(!(matches(PatternKind::Shs, &points, eps) && matches(PatternKind::InverseShs, &points, eps)));
    }

    /// Mirroring prices swaps the kind
    #[test]
    fn prop_mirror_swaps_kind(points in arb_points()) {
        let eps = ScanConfig::default().neckline_epsilon;
        let flipped = points.map(|p| PricePoint::new(p.time, 300.0 - p.price));
        let expected = match_shape(&points, eps).map(|kind| match kind {
            PatternKind::Shs => PatternKind::InverseShs,
            PatternKind::InverseShs => PatternKind::Shs,
        });
        prop_assert_eq!(match_shape(&flipped, eps), expected);
    }
}

// ==================== Scan Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A breakout comes after the right shoulder, and the sample before it is
    /// on the near side of the neckline
    #[test]
    fn prop_breakout_ordering((pivots, time, price) in arb_series(7, 40)) {
        let records = Scanner::default().scan(&pivots, &time, &price).unwrap();
        for record in records.iter().filter(|r| r.valid) {
            let b = record.breakout_index.unwrap();
            prop_assert!(b > record.right_shoulder_index);

            let (left, right) = (record.points[2], record.points[4]);
            let neckline = interpolate(left.time, right.time, left.price, right.price, time[b - 1]);
            prop_assert!(record.kind.beyond(neckline, price[b - 1]));
            prop_assert!(record.kind.beyond(record.points[5].price, price[b]));
        }
    }

    /// Only confirmed candidates carry breakout data, returns or a following trend
    #[test]
    fn prop_outcome_consistency((pivots, time, price) in arb_series(7, 40)) {
        let records = Scanner::default().scan(&pivots, &time, &price).unwrap();
        for record in &records {
            prop_assert_eq!(record.valid, record.outcome == Outcome::Confirmed);
            prop_assert_eq!(record.valid, record.breakout.is_some());
            if !record.valid {
                prop_assert_eq!(record.returns.filled(), 0);
                prop_assert_eq!(record.following_trend, TrendSnapshot::default());
            }
            prop_assert!(record.start_pivot + 5 < pivots.len());
            prop_assert_eq!(record.right_shoulder_index, pivots[record.start_pivot + 5]);
        }
    }

    /// Records come out in start-pivot order, one per matching start pivot
    #[test]
    fn prop_records_in_detection_order((pivots, time, price) in arb_series(7, 40)) {
        let records = Scanner::default().scan(&pivots, &time, &price).unwrap();
        prop_assert!(records.windows(2).all(|w| w[0].start_pivot < w[1].start_pivot));
    }

    /// Identical input serializes to identical output
    #[test]
    fn prop_deterministic((pivots, time, price) in arb_series(7, 30)) {
        let scanner = Scanner::default();
        let first = serde_json::to_string(&scanner.scan(&pivots, &time, &price).unwrap()).unwrap();
        let second = serde_json::to_string(&scanner.scan(&pivots, &time, &price).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Parallel mode agrees with sequential mode on everything but the following trend
    #[test]
    fn prop_parallel_agrees_with_sequential((pivots, time, price) in arb_series(7, 40)) {
        let sequential = Scanner::default().scan(&pivots, &time, &price).unwrap();
        let parallel = parallel_scanner().scan(&pivots, &time, &price).unwrap();

        prop_assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            prop_assert_eq!(s.kind, p.kind);
            prop_assert_eq!(s.start_pivot, p.start_pivot);
            prop_assert_eq!(s.outcome, p.outcome);
            prop_assert_eq!(s.breakout_index, p.breakout_index);
            prop_assert_eq!(s.breakout_pivot, p.breakout_pivot);
            prop_assert_eq!(&s.returns, &p.returns);
            prop_assert_eq!(s.prior_trend, p.prior_trend);
        }
    }
}

// ==================== Trend Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// At most one counter of each parity is active, and a reported reset
    /// coincides with the opposite counter having just started
    #[test]
    fn prop_trend_counters_exclusive((pivots, time, price) in arb_series(7, 60)) {
        let view = SeriesView::new(&time, &price).unwrap();
        let series = PivotSeries::new(&pivots, &view).unwrap();
        let mut tracker = TrendTracker::default();

        for position in 0..series.len() {
            let reset = tracker.update(&series, position);

            prop_assert!(tracker.ascending_low().count == 0 || tracker.descending_low().count == 0);
            prop_assert!(tracker.ascending_high().count == 0 || tracker.descending_high().count == 0);

            if reset {
                let (ascending, descending) = if position % 2 == 0 {
                    (tracker.ascending_low(), tracker.descending_low())
                } else {
                    (tracker.ascending_high(), tracker.descending_high())
                };
                prop_assert!(
                    (ascending.count == 1 && descending.count == 0)
                        || (descending.count == 1 && ascending.count == 0)
                );
            }
        }
    }
}
