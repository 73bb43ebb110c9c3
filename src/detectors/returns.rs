//! Post-breakout window returns
//!
//! Two families of horizons are measured from the breakout sample:
//!
//! - fixed: [`FIXED_WINDOWS`] time units
//! - relative: [`RELATIVE_MULTIPLES`] of the pattern length (breakout time
//!   minus the time of the first pivot)
//!
//! Each slot takes the price of the first sample whose elapsed time strictly
//! exceeds its horizon, expressed relative to the breakout price.

use serde::{Deserialize, Serialize};

use super::breakout::Breakout;
use crate::PatternKind;

/// Fixed horizons, in time units after the breakout
pub const FIXED_WINDOWS: [f64; 6] = [1.0, 3.0, 5.0, 10.0, 30.0, 60.0];

/// Multiples of the pattern length used as relative horizons
pub const RELATIVE_MULTIPLES: [f64; 5] = [1.0 / 3.0, 0.5, 1.0, 2.0, 4.0];

// ============================================================
// SETTINGS
// ============================================================

/// How the first fixed window is expressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnFormula {
    /// `price / breakout_price`
    Ratio,
    /// `ln(price / breakout_price)`
    #[default]
    LogRatio,
}

/// Orientation of the price ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnConvention {
    /// `price / breakout_price` for both kinds
    #[default]
    AsIs,
    /// Inverted for SHS so a move in the expected direction reads above 1
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnSettings {
    pub first_window_formula: ReturnFormula,
    pub convention: ReturnConvention,
    /// Lower clamp for the pattern length
    pub min_pattern_length: f64,
}

impl Default for ReturnSettings {
    fn default() -> Self {
        Self {
            first_window_formula: ReturnFormula::default(),
            convention: ReturnConvention::default(),
            min_pattern_length: 1.0,
        }
    }
}

// ============================================================
// RESULTS
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowReturns {
    pub fixed: [Option<f64>; 6],
    pub relative: [Option<f64>; 5],
}

impl WindowReturns {
    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.fixed.iter().chain(&self.relative).filter(|r| r.is_some()).count()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.filled() == FIXED_WINDOWS.len() + RELATIVE_MULTIPLES.len()
    }
}

// ============================================================
// TRACKER
// ============================================================

#[derive(Debug, Clone)]
pub struct ReturnTracker {
    kind: PatternKind,
    breakout: Breakout,
    relative_offsets: [f64; 5],
    cursor: usize,
    settings: ReturnSettings,
    returns: WindowReturns,
}

impl ReturnTracker {
    pub fn new(kind: PatternKind, breakout: Breakout, pattern_start_time: f64, settings: ReturnSettings) -> Self {
        let length = (breakout.time - pattern_start_time).max(settings.min_pattern_length);
        Self {
            kind,
            breakout,
            relative_offsets: RELATIVE_MULTIPLES.map(|m| m * length),
            cursor: breakout.index + 1,
            settings,
            returns: WindowReturns::default(),
        }
    }

    /// Pattern length after clamping
    #[inline]
    pub fn pattern_length(&self) -> f64 {
        self.relative_offsets[2]
    }

    #[inline]
    pub fn returns(&self) -> &WindowReturns {
        &self.returns
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.returns.is_complete()
    }

    fn ratio(&self, price: f64) -> f64 {
        if self.settings.convention == ReturnConvention::Directional && self.kind.direction().is_bearish() {
            self.breakout.price / price
        } else {
            price / self.breakout.price
        }
    }

    /// Consume samples up to `upto` (inclusive, clamped to the series).
    /// Returns true once every slot is filled.
    pub fn advance(&mut self, time: &[f64], price: &[f64], upto: usize) -> bool {
        let end = upto.saturating_add(1).min(price.len()).min(time.len());

        while self.cursor < end && !self.is_complete() {
            let elapsed = time[self.cursor] - self.breakout.time;
            let ratio = self.ratio(price[self.cursor]);

            for (slot, (value, &offset)) in self.returns.fixed.iter_mut().zip(&FIXED_WINDOWS).enumerate() {
                if value.is_none() && elapsed > offset {
                    *value = Some(match (slot, self.settings.first_window_formula) {
                        (0, ReturnFormula::LogRatio) => ratio.ln(),
                        _ => ratio,
                    });
                }
            }
            for (value, &offset) in self.returns.relative.iter_mut().zip(&self.relative_offsets) {
                if value.is_none() && elapsed > offset {
                    *value = Some(ratio);
                }
            }

            self.cursor += 1;
        }

        self.is_complete()
    }
}
