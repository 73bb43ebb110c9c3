//! Global trend tracking over the pivot stream
//!
//! Pivots alternate between lows (even positions) and highs (odd positions).
//! Comparing each pivot with the one two positions back feeds four run
//! counters: ascending/descending lows and ascending/descending highs. A move
//! in one direction resets the opposite counter of the same parity, so at most
//! one counter of each pair is non-zero at any time.

use serde::{Deserialize, Serialize};

use crate::{
    candidate::{PatternCandidate, TrendContext},
    series::PivotSeries,
    PatternKind, Period, PivotPoint,
};

/// Start pivot and length of a run at the time it was copied
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    /// Pivot the run started from (`None` for an empty run)
    pub start: Option<PivotPoint>,
    pub run_length: usize,
}

impl TrendSnapshot {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.run_length == 0
    }
}

// ============================================================
// RUN COUNTER
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunCounter {
    pub count: usize,
    pub first: Option<PivotPoint>,
}

impl RunCounter {
    /// Add one step; the first step of a run records `origin` as its start
    #[inline]
    pub fn extend(&mut self, origin: PivotPoint) {
        if self.count == 0 {
            self.first = Some(origin);
        }
        self.count += 1;
    }

    /// Zero the run, returning whether it was active
    #[inline]
    pub fn reset(&mut self) -> bool {
        let was_active = self.count > 0;
        self.count = 0;
        was_active
    }

    #[inline]
    pub fn snapshot(&self) -> TrendSnapshot {
        if self.count == 0 {
            return TrendSnapshot::default();
        }
        TrendSnapshot {
            start: self.first,
            run_length: self.count,
        }
    }
}

/// Pivot parity: lows sit at even positions, highs at odd ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Low,
    High,
}

impl Parity {
    #[inline]
    pub fn of(position: usize) -> Self {
        if position % 2 == 0 {
            Parity::Low
        } else {
            Parity::High
        }
    }
}

// ============================================================
// TRACKER
// ============================================================

#[derive(Debug, Clone)]
pub struct TrendTracker {
    ascending_low: RunCounter,
    ascending_high: RunCounter,
    descending_low: RunCounter,
    descending_high: RunCounter,
    completion_run: Period,
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(Period::new_const(3))
    }
}

impl TrendTracker {
    pub fn new(completion_run: Period) -> Self {
        Self {
            ascending_low: RunCounter::default(),
            ascending_high: RunCounter::default(),
            descending_low: RunCounter::default(),
            descending_high: RunCounter::default(),
            completion_run,
        }
    }

    #[inline]
    pub fn ascending_low(&self) -> &RunCounter {
        &self.ascending_low
    }

    #[inline]
    pub fn ascending_high(&self) -> &RunCounter {
        &self.ascending_high
    }

    #[inline]
    pub fn descending_low(&self) -> &RunCounter {
        &self.descending_low
    }

    #[inline]
    pub fn descending_high(&self) -> &RunCounter {
        &self.descending_high
    }

    /// Feed pivot `position`. Returns true if an opposite run was reset.
    pub fn update(&mut self, pivots: &PivotSeries, position: usize) -> bool {
        if position < 2 || position >= pivots.len() {
            return false;
        }
        let current = pivots.price(position);
        let previous = pivots.price(position - 2);
        let origin = pivots.pivot_point(position - 2);

        let (ascending, descending) = match Parity::of(position) {
            Parity::Low => (&mut self.ascending_low, &mut self.descending_low),
            Parity::High => (&mut self.ascending_high, &mut self.descending_high),
        };

        if current > previous {
            ascending.extend(origin);
            descending.reset()
        } else if current < previous {
            descending.extend(origin);
            ascending.reset()
        } else {
            false
        }
    }

    /// Run a freshly detected candidate inherits as its prior trend
    pub fn prior_run(&self, kind: PatternKind) -> &RunCounter {
        match kind {
            PatternKind::Shs => &self.ascending_low,
            PatternKind::InverseShs => &self.descending_high,
        }
    }

    /// Longer of the two runs in the post-breakout direction (ties go to the low run)
    pub fn following_run(&self, kind: PatternKind) -> &RunCounter {
        let (low, high) = match kind {
            PatternKind::Shs => (&self.descending_low, &self.descending_high),
            PatternKind::InverseShs => (&self.ascending_low, &self.ascending_high),
        };
        if low.count >= high.count {
            low
        } else {
            high
        }
    }

    /// Stamp the prior trend on a new candidate; it is complete immediately
    pub fn attach_prior(&self, candidate: &mut PatternCandidate) {
        candidate.prior_trend = TrendContext {
            snapshot: self.prior_run(candidate.kind).snapshot(),
            complete: true,
        };
    }

    /// Refresh the following trend of every open, confirmed candidate whose
    /// following trend is still incomplete.
    ///
    /// With `end_of_stream` the following trend is completed regardless of
    /// its run length.
    pub fn attach_following(
        &self,
        candidates: &mut [PatternCandidate],
        open: &[usize],
        end_of_stream: bool,
    ) {
        for &handle in open {
            let Some(candidate) = candidates.get_mut(handle) else {
                continue;
            };
            if candidate.breakout.is_none() || candidate.following_trend.complete {
                continue;
            }

            let run = self.following_run(candidate.kind);
            if run.count > 0 {
                candidate.following_trend.snapshot = run.snapshot();
            }
            if end_of_stream || run.count >= self.completion_run.get() {
                candidate.following_trend.complete = true;
                tracing::trace!(
                    "{} at pivot {}: following trend complete ({} steps)",
                    candidate.kind,
                    candidate.start_pivot,
                    candidate.following_trend.snapshot.run_length
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesView;

    fn pivots(prices: &[f64]) -> PivotSeries {
        let time: Vec<f64> = (0..prices.len()).map(|t| t as f64).collect();
        let view = SeriesView::new(&time, prices).unwrap();
        let index: Vec<usize> = (0..prices.len()).collect();
        PivotSeries::new(&index, &view).unwrap()
    }

    fn feed(tracker: &mut TrendTracker, pivots: &PivotSeries) -> Vec<bool> {
        (0..pivots.len()).map(|i| tracker.update(pivots, i)).collect()
    }

    #[test]
    fn test_rising_lows_and_highs() {
        let series = pivots(&[100.0, 110.0, 102.0, 112.0, 104.0, 114.0, 106.0]);
        let mut tracker = TrendTracker::default();
        let resets = feed(&mut tracker, &series);

        assert!(resets.iter().all(|&r| !r));
        assert_eq!(tracker.ascending_low().count, 3);
        assert_eq!(tracker.ascending_high().count, 2);
        assert_eq!(tracker.descending_low().count, 0);

        let snapshot = tracker.ascending_low().snapshot();
        assert_eq!(snapshot.run_length, 3);
        assert_eq!(snapshot.start.unwrap().pivot, 0);
        assert_eq!(tracker.ascending_high().snapshot().start.unwrap().pivot, 1);
    }

    #[test]
    fn test_reset_reported() {
        // Lows: 100, 102, 101 -> the ascending low run is broken at position 4
        let series = pivots(&[100.0, 110.0, 102.0, 112.0, 101.0, 113.0, 100.0]);
        let mut tracker = TrendTracker::default();
        let resets = feed(&mut tracker, &series);

        assert_eq!(resets, vec![false, false, false, false, true, false, false]);
        assert_eq!(tracker.ascending_low().count, 0);
        assert_eq!(tracker.descending_low().count, 2);
        assert_eq!(tracker.descending_low().snapshot().start.unwrap().pivot, 2);
        assert_eq!(tracker.ascending_high().count, 2);
    }

    #[test]
    fn test_equal_prices_change_nothing() {
        let series = pivots(&[100.0, 110.0, 100.0, 110.0, 100.0, 110.0, 100.0]);
        let mut tracker = TrendTracker::default();
        feed(&mut tracker, &series);

        for run in [
            tracker.ascending_low(),
            tracker.ascending_high(),
            tracker.descending_low(),
            tracker.descending_high(),
        ] {
            assert_eq!(run.count, 0);
            assert!(run.snapshot().is_empty());
            assert!(run.snapshot().start.is_none());
        }
    }

    #[test]
    fn test_restarted_run_gets_new_start() {
        let mut counter = RunCounter::default();
        let origin = |pivot| PivotPoint { pivot, index: pivot, time: pivot as f64, price: 1.0 };

        counter.extend(origin(0));
        counter.extend(origin(2));
        assert!(counter.reset());
        assert!(!counter.reset());

        counter.extend(origin(6));
        assert_eq!(counter.snapshot().start.unwrap().pivot, 6);
        assert_eq!(counter.snapshot().run_length, 1);
    }

    #[test]
    fn test_following_run_prefers_low_on_tie() {
        // Lower highs broken at position 5, lows keep falling
        let series = pivots(&[110.0, 120.0, 108.0, 118.0, 100.0, 119.0, 99.0]);
        let mut tracker = TrendTracker::default();
        feed(&mut tracker, &series);

        assert_eq!(tracker.following_run(PatternKind::Shs).count, 3);
        assert_eq!(tracker.following_run(PatternKind::InverseShs).count, 1);
        assert_eq!(
            tracker.following_run(PatternKind::Shs).first,
            tracker.descending_low().first
        );

        // Two steps each; the last low repeats
        let series = pivots(&[110.0, 120.0, 108.0, 118.0, 106.0, 116.0, 106.0]);
        let mut tracker = TrendTracker::default();
        feed(&mut tracker, &series);
        assert_eq!(tracker.descending_low().count, 2);
        assert_eq!(tracker.descending_high().count, 2);
        assert_eq!(
            tracker.following_run(PatternKind::Shs).first,
            tracker.descending_low().first
        );
    }

    #[test]
    fn test_parity() {
        assert_eq!(Parity::of(0), Parity::Low);
        assert_eq!(Parity::of(7), Parity::High);
    }
}
