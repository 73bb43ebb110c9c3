//! Breakout / invalidation state machine
//!
//! Replays the full-resolution series from the sample after the right
//! shoulder. Each sample is first checked for invalidation (price beyond the
//! right shoulder), then for a breakout: price on the near side of the
//! neckline *and* the next sample still on the near side of the shoulder. A
//! bare neckline touch is not enough.
//!
//! The monitor keeps its own cursor, so it can be driven in chunks
//! (`advance(.., upto)` repeatedly) with the same result as one pass.

use serde::{Deserialize, Serialize};

use super::helpers::Neckline;
use crate::PatternKind;

/// Confirmed breakout sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    /// Index into the original series (the confirming sample)
    pub index: usize,
    pub time: f64,
    pub price: f64,
}

/// Result of driving a monitor forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakoutStep {
    /// Nothing decided up to the bound
    Pending,
    Invalidated {
        index: usize,
    },
    Confirmed(Breakout),
}

#[derive(Debug, Clone)]
pub struct BreakoutMonitor {
    kind: PatternKind,
    neckline: Neckline,
    shoulder_price: f64,
    first: usize,
    cursor: usize,
    decided: bool,
}

impl BreakoutMonitor {
    /// Monitor starting at the sample after `right_shoulder_index`
    pub fn new(kind: PatternKind, neckline: Neckline, right_shoulder_index: usize, shoulder_price: f64) -> Self {
        Self {
            kind,
            neckline,
            shoulder_price,
            first: right_shoulder_index + 1,
            cursor: right_shoulder_index + 1,
            decided: false,
        }
    }

    /// Next sample to be examined
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_decided(&self) -> bool {
        self.decided
    }

    /// Examine samples `cursor..=upto` (clamped to the series).
    ///
    /// Once a step other than [`BreakoutStep::Pending`] is returned the
    /// monitor is decided and further calls return `Pending` without reading
    /// the series.
    pub fn advance(&mut self, time: &[f64], price: &[f64], upto: usize) -> BreakoutStep {
        if self.decided || price.is_empty() {
            return BreakoutStep::Pending;
        }
        let last = upto.min(price.len() - 1);

        while self.cursor <= last {
            let j = self.cursor;

            // The first sample after the shoulder never invalidates
            if j != self.first && self.kind.beyond(price[j], self.shoulder_price) {
                self.decided = true;
                return BreakoutStep::Invalidated { index: j };
            }

            // Confirmation needs the following sample
            let Some(&next) = price.get(j + 1) else {
                self.cursor = price.len();
                return BreakoutStep::Pending;
            };

            if self.kind.beyond(self.neckline.at(time[j]), price[j])
                && self.kind.beyond(self.shoulder_price, next)
            {
                self.decided = true;
                self.cursor = j + 1;
                return BreakoutStep::Confirmed(Breakout {
                    index: j + 1,
                    time: time[j + 1],
                    price: next,
                });
            }

            self.cursor += 1;
        }

        BreakoutStep::Pending
    }
}
