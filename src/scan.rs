//! Scan orchestration
//!
//! Sequential mode walks the pivots once, feeding the global trend tracker,
//! detecting candidates and driving every open candidate up to the current
//! pivot. Candidates live in an arena in creation order; `open` holds the
//! handles still being worked on.
//!
//! Parallel mode resolves each start pivot independently on the rayon pool.

use rayon::prelude::*;

use crate::{
    candidate::{detect_at, PatternCandidate},
    detectors::{local_trend, TrendTracker},
    series::{PivotSeries, SeriesView, PATTERN_PIVOTS},
    ScanConfig,
};

pub(crate) fn scan_sequential(
    config: &ScanConfig,
    series: &SeriesView<'_>,
    pivots: &PivotSeries,
) -> Vec<PatternCandidate> {
    let settings = config.return_settings();
    let mut tracker = TrendTracker::new(config.trend_completion_run);
    let mut arena: Vec<PatternCandidate> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for i in 0..pivots.len() {
        if tracker.update(pivots, i) {
            tracker.attach_following(&mut arena, &open, false);
        }

        if i + PATTERN_PIVOTS - 1 < pivots.len() {
            if let Some(mut candidate) = detect_at(pivots, i, config) {
                tracker.attach_prior(&mut candidate);
                candidate.begin_monitoring();
                tracing::debug!(
                    "{} detected at pivot {} (index {}), prior trend {} steps",
                    candidate.kind,
                    i,
                    candidate.start_index,
                    candidate.prior_trend.snapshot.run_length
                );
                open.push(arena.len());
                arena.push(candidate);
            }
        }

        let upto = pivots.index(i);
        for &handle in &open {
            let candidate = &mut arena[handle];
            if candidate.right_shoulder_pivot() <= i {
                candidate.advance(series, upto, settings);
            }
        }
        open.retain(|&handle| !arena[handle].is_done());
    }

    // Drain whatever is still open to the end of the series
    let last = series.last_index();
    for &handle in &open {
        arena[handle].advance(series, last, settings);
    }
    tracker.attach_following(&mut arena, &open, true);
    arena
}

pub(crate) fn scan_parallel(
    config: &ScanConfig,
    series: &SeriesView<'_>,
    pivots: &PivotSeries,
) -> Vec<PatternCandidate> {
    let settings = config.return_settings();
    let starts = pivots.len().saturating_sub(PATTERN_PIVOTS - 1);

    (0..starts)
        .into_par_iter()
        .filter_map(|i| detect_at(pivots, i, config))
        .map(|mut candidate| {
            local_trend::attach_prior(pivots, &mut candidate);
            candidate.begin_monitoring();
            candidate.advance(series, series.last_index(), settings);
            local_trend::attach_following(pivots, &mut candidate, config.trend_completion_run);
            candidate
        })
        .collect()
}
