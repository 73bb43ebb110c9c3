//! Per-candidate trend walks for the parallel scan
//!
//! The parallel mode resolves candidates independently, so there is no
//! global [`TrendTracker`](super::TrendTracker) to copy from. Instead each
//! candidate walks the pivot series around itself:
//!
//! - prior: backward from the start pivot. This reproduces the tracker's
//!   counter at that position exactly (equal prices are skipped, an opposite
//!   step ends the run).
//! - following: forward from the pivot segment holding the breakout, over
//!   both parities, keeping the longer run. Always complete.

use super::trend::{Parity, RunCounter};
use crate::{
    candidate::{PatternCandidate, TrendContext},
    series::PivotSeries,
    PatternKind, Period,
};

#[inline]
fn steps(rising: bool, newer: f64, older: f64) -> Option<bool> {
    if newer == older {
        None
    } else {
        Some((newer > older) == rising)
    }
}

/// Run of `parity` pivots moving in the `rising` direction that ends at the
/// last pivot of that parity at or before `position`
pub fn backward_run(pivots: &PivotSeries, position: usize, parity: Parity, rising: bool) -> RunCounter {
    let mut run = RunCounter::default();
    if pivots.is_empty() {
        return run;
    }
    let mut k = position.min(pivots.len() - 1);
    if Parity::of(k) != parity {
        let Some(previous) = k.checked_sub(1) else {
            return run;
        };
        k = previous;
    }

    while k >= 2 {
        match steps(rising, pivots.price(k), pivots.price(k - 2)) {
            Some(true) => {
                run.count += 1;
                run.first = Some(pivots.pivot_point(k - 2));
            }
            Some(false) => break,
            None => {}
        }
        k -= 2;
    }
    run
}

/// Run of `parity` pivots moving in the `rising` direction starting at the
/// first pivot of that parity at or after `position`, capped at `limit` steps
pub fn forward_run(pivots: &PivotSeries, position: usize, parity: Parity, rising: bool, limit: usize) -> RunCounter {
    let mut run = RunCounter::default();
    let start = if Parity::of(position) == parity { position } else { position + 1 };

    let mut k = start;
    while k + 2 < pivots.len() && run.count < limit {
        match steps(rising, pivots.price(k + 2), pivots.price(k)) {
            Some(true) => run.extend(pivots.pivot_point(start)),
            Some(false) => break,
            None => {}
        }
        k += 2;
    }
    run
}

/// Prior trend from a backward walk at the candidate's start pivot
pub fn attach_prior(pivots: &PivotSeries, candidate: &mut PatternCandidate) {
    let run = match candidate.kind {
        PatternKind::Shs => backward_run(pivots, candidate.start_pivot, Parity::Low, true),
        PatternKind::InverseShs => backward_run(pivots, candidate.start_pivot, Parity::High, false),
    };
    candidate.prior_trend = TrendContext {
        snapshot: run.snapshot(),
        complete: true,
    };
}

/// Following trend from a forward walk at the breakout segment.
/// Leaves the candidate untouched if it has no breakout.
pub fn attach_following(pivots: &PivotSeries, candidate: &mut PatternCandidate, completion_run: Period) {
    let Some(breakout) = candidate.breakout else {
        return;
    };
    let from = pivots.segment_of(breakout.index);
    let rising = candidate.kind == PatternKind::InverseShs;
    let limit = completion_run.get();

    let low = forward_run(pivots, from, Parity::Low, rising, limit);
    let high = forward_run(pivots, from, Parity::High, rising, limit);
    let run = if low.count >= high.count { low } else { high };

    candidate.following_trend = TrendContext {
        snapshot: run.snapshot(),
        complete: true,
    };
}
