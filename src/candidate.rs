//! Pattern candidates and their output records
//!
//! A [`PatternCandidate`] is created by the shape matcher, then owned by the
//! scan while it is monitored for a breakout. Once the scan ends every
//! candidate is turned into a flat [`PatternRecord`].

use serde::{Deserialize, Serialize};

use crate::{
    detectors::{
        match_shape, Breakout, BreakoutMonitor, BreakoutStep, Neckline, ReturnSettings, ReturnTracker,
        TrendSnapshot, WindowReturns,
    },
    series::{PivotSeries, SeriesView, PATTERN_PIVOTS},
    Direction, Outcome, PatternKind, PricePoint, ScanConfig,
};

/// Lifecycle of a candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Shape matched, not yet monitored
    #[default]
    Forming,
    Monitoring,
    /// Price crossed the right shoulder first (terminal)
    Invalidated,
    /// Neckline breakout confirmed (terminal)
    BreakoutConfirmed,
}

impl Lifecycle {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Invalidated | Lifecycle::BreakoutConfirmed)
    }
}

/// Trend snapshot plus whether it may still change
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendContext {
    pub snapshot: TrendSnapshot,
    pub complete: bool,
}

// ============================================================
// CANDIDATE
// ============================================================

#[derive(Debug, Clone)]
pub struct PatternCandidate {
    pub kind: PatternKind,
    /// Pivot position of the first of the 6 pivots
    pub start_pivot: usize,
    pub points: [PricePoint; PATTERN_PIVOTS],
    /// Original-series index of the first pivot
    pub start_index: usize,
    /// Original-series index of the right shoulder
    pub right_shoulder_index: usize,
    pub neckline: Neckline,
    pub lifecycle: Lifecycle,
    pub breakout: Option<Breakout>,
    pub prior_trend: TrendContext,
    pub following_trend: TrendContext,
    monitor: BreakoutMonitor,
    returns: Option<ReturnTracker>,
}

impl PatternCandidate {
    /// Candidate of `kind` over the pivots starting at `position`.
    ///
    /// The shape is not checked here; see [`detect_at`]. Returns `None` if
    /// fewer than 6 pivots remain.
    pub fn new(kind: PatternKind, pivots: &PivotSeries, position: usize, eps: f64) -> Option<Self> {
        let points = pivots.window(position)?;
        let neckline = Neckline::with_eps(points[2], points[4], eps);
        let right_shoulder_index = pivots.index(position + PATTERN_PIVOTS - 1);

        Some(Self {
            kind,
            start_pivot: position,
            points,
            start_index: pivots.index(position),
            right_shoulder_index,
            neckline,
            lifecycle: Lifecycle::Forming,
            breakout: None,
            prior_trend: TrendContext::default(),
            following_trend: TrendContext::default(),
            monitor: BreakoutMonitor::new(kind, neckline, right_shoulder_index, points[5].price),
            returns: None,
        })
    }

    #[inline]
    pub fn right_shoulder_pivot(&self) -> usize {
        self.start_pivot + PATTERN_PIVOTS - 1
    }

    /// Returns collected so far (all `None` before a breakout)
    pub fn returns(&self) -> WindowReturns {
        self.returns.as_ref().map(|r| *r.returns()).unwrap_or_default()
    }

    pub fn begin_monitoring(&mut self) {
        if self.lifecycle == Lifecycle::Forming {
            self.lifecycle = Lifecycle::Monitoring;
            tracing::trace!("{} at pivot {}: monitoring", self.kind, self.start_pivot);
        }
    }

    /// Drive breakout monitoring, then return collection, up to sample `upto`
    pub fn advance(&mut self, series: &SeriesView<'_>, upto: usize, settings: ReturnSettings) {
        if self.lifecycle == Lifecycle::Monitoring {
            match self.monitor.advance(series.time(), series.price(), upto) {
                BreakoutStep::Pending => {}
                BreakoutStep::Invalidated { index } => {
                    self.lifecycle = Lifecycle::Invalidated;
                    tracing::trace!("{} at pivot {}: invalidated at {index}", self.kind, self.start_pivot);
                }
                BreakoutStep::Confirmed(breakout) => {
                    self.lifecycle = Lifecycle::BreakoutConfirmed;
                    self.breakout = Some(breakout);
                    self.returns = Some(ReturnTracker::new(self.kind, breakout, self.points[0].time, settings));
                    tracing::trace!(
                        "{} at pivot {}: breakout at {}",
                        self.kind,
                        self.start_pivot,
                        breakout.index
                    );
                }
            }
        }

        if let Some(returns) = &mut self.returns {
            returns.advance(series.time(), series.price(), upto);
        }
    }

    /// True once nothing about the candidate can change any more
    pub fn is_done(&self) -> bool {
        match self.lifecycle {
            Lifecycle::Invalidated => true,
            Lifecycle::BreakoutConfirmed => {
                self.returns.as_ref().is_some_and(ReturnTracker::is_complete) && self.following_trend.complete
            }
            Lifecycle::Forming | Lifecycle::Monitoring => false,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.lifecycle {
            Lifecycle::BreakoutConfirmed => Outcome::Confirmed,
            Lifecycle::Invalidated => Outcome::Invalidated,
            Lifecycle::Forming | Lifecycle::Monitoring => Outcome::Unresolved,
        }
    }

    pub fn to_record(&self, pivots: &PivotSeries) -> PatternRecord {
        let outcome = self.outcome();
        PatternRecord {
            kind: self.kind,
            direction: self.kind.direction(),
            valid: outcome == Outcome::Confirmed,
            outcome,
            start_pivot: self.start_pivot,
            start_index: self.start_index,
            right_shoulder_pivot: self.right_shoulder_pivot(),
            right_shoulder_index: self.right_shoulder_index,
            breakout_pivot: self.breakout.map(|b| pivots.segment_of(b.index)),
            breakout_index: self.breakout.map(|b| b.index),
            points: self.points,
            breakout: self.breakout.map(|b| PricePoint::new(b.time, b.price)),
            neckline_slope: self.neckline.slope(),
            prior_trend: self.prior_trend.snapshot,
            following_trend: self.following_trend.snapshot,
            returns: self.returns(),
        }
    }
}

/// Run the shape matcher at pivot `position` and build a candidate for the
/// matching kind, if the configuration includes it.
pub fn detect_at(pivots: &PivotSeries, position: usize, config: &ScanConfig) -> Option<PatternCandidate> {
    let points = pivots.window(position)?;
    let kind = match_shape(&points, config.neckline_epsilon)?;
    if !config.includes(kind) {
        return None;
    }
    PatternCandidate::new(kind, pivots, position, config.neckline_epsilon)
}

// ============================================================
// RECORD
// ============================================================

/// Flat, serializable result for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub kind: PatternKind,
    /// Expected move after the breakout
    pub direction: Direction,
    /// True iff the breakout was confirmed
    pub valid: bool,
    pub outcome: Outcome,
    pub start_pivot: usize,
    pub start_index: usize,
    pub right_shoulder_pivot: usize,
    pub right_shoulder_index: usize,
    /// Pivot segment containing the breakout sample
    pub breakout_pivot: Option<usize>,
    pub breakout_index: Option<usize>,
    pub points: [PricePoint; PATTERN_PIVOTS],
    pub breakout: Option<PricePoint>,
    pub neckline_slope: f64,
    pub prior_trend: TrendSnapshot,
    pub following_trend: TrendSnapshot,
    pub returns: WindowReturns,
}
