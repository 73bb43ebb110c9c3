//! Input series and the derived pivot view
//!
//! [`SeriesView`] borrows the full-resolution time/price arrays after checking
//! them; [`PivotSeries`] materializes the pivot subsequence once so the scan
//! never indexes through the pivot array twice.

use crate::{PatternError, PivotPoint, PricePoint, Result};

/// Minimum number of pivots a scan accepts
pub const MIN_PIVOTS: usize = 7;

/// Number of consecutive pivots forming one candidate
pub const PATTERN_PIVOTS: usize = 6;

// ============================================================
// ORIGINAL SERIES
// ============================================================

/// Validated full-resolution series
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    time: &'a [f64],
    price: &'a [f64],
}

impl<'a> SeriesView<'a> {
    /// Check lengths, finiteness and strictly increasing time
    pub fn new(time: &'a [f64], price: &'a [f64]) -> Result<Self> {
        if time.len() != price.len() {
            return Err(PatternError::LengthMismatch {
                time: time.len(),
                price: price.len(),
            });
        }
        for (index, (&t, &p)) in time.iter().zip(price).enumerate() {
            if !t.is_finite() {
                return Err(PatternError::InvalidSeries {
                    index,
                    reason: "non-finite time",
                });
            }
            if !p.is_finite() {
                return Err(PatternError::InvalidSeries {
                    index,
                    reason: "non-finite price",
                });
            }
        }
        if let Some(index) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PatternError::InvalidSeries {
                index: index + 1,
                reason: "time is not strictly increasing",
            });
        }
        Ok(Self { time, price })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    #[inline]
    pub fn time(&self) -> &'a [f64] {
        self.time
    }

    #[inline]
    pub fn price(&self) -> &'a [f64] {
        self.price
    }

    /// Index of the last sample
    #[inline]
    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }
}

// ============================================================
// PIVOT SERIES
// ============================================================

/// Pivot subsequence of a [`SeriesView`]
#[derive(Debug, Clone, PartialEq)]
pub struct PivotSeries {
    index: Vec<usize>,
    time: Vec<f64>,
    price: Vec<f64>,
}

impl PivotSeries {
    /// Derive the pivot view.
    ///
    /// Pivots must number at least [`MIN_PIVOTS`], start at 0, be strictly
    /// increasing and stay inside the series.
    pub fn new(pivots: &[usize], series: &SeriesView<'_>) -> Result<Self> {
        if pivots.len() < MIN_PIVOTS {
            return Err(PatternError::InsufficientData {
                need: MIN_PIVOTS,
                got: pivots.len(),
            });
        }
        if pivots[0] != 0 {
            return Err(PatternError::InvalidPivot {
                position: 0,
                reason: "first pivot must be index 0",
            });
        }
        for (position, &index) in pivots.iter().enumerate() {
            if index >= series.len() {
                return Err(PatternError::InvalidPivot {
                    position,
                    reason: "index outside the series",
                });
            }
            if position > 0 && index <= pivots[position - 1] {
                return Err(PatternError::InvalidPivot {
                    position,
                    reason: "indices are not strictly increasing",
                });
            }
        }

        Ok(Self {
            index: pivots.to_vec(),
            time: pivots.iter().map(|&i| series.time()[i]).collect(),
            price: pivots.iter().map(|&i| series.price()[i]).collect(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Original-series index of pivot `k`
    #[inline]
    pub fn index(&self, k: usize) -> usize {
        self.index[k]
    }

    #[inline]
    pub fn time(&self, k: usize) -> f64 {
        self.time[k]
    }

    #[inline]
    pub fn price(&self, k: usize) -> f64 {
        self.price[k]
    }

    #[inline]
    pub fn point(&self, k: usize) -> PricePoint {
        PricePoint::new(self.time[k], self.price[k])
    }

    #[inline]
    pub fn pivot_point(&self, k: usize) -> PivotPoint {
        PivotPoint {
            pivot: k,
            index: self.index[k],
            time: self.time[k],
            price: self.price[k],
        }
    }

    /// The 6 consecutive pivots starting at `k`, if they exist
    pub fn window(&self, k: usize) -> Option<[PricePoint; PATTERN_PIVOTS]> {
        if k + PATTERN_PIVOTS > self.len() {
            return None;
        }
        Some(std::array::from_fn(|offset| self.point(k + offset)))
    }

    /// Last pivot position whose original index is at or before `index`
    pub fn segment_of(&self, index: usize) -> usize {
        self.index.partition_point(|&i| i <= index).saturating_sub(1)
    }
}
