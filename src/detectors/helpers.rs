//! Common geometry helpers for neckline evaluation
//!
//! Degenerate-safe line primitives shared by the shape matcher, the breakout
//! engine and record construction.

use crate::PricePoint;

// ============================================================
// THRESHOLDS
// ============================================================

/// Time spans below this width are treated as degenerate
pub const DEGENERATE_SPAN: f64 = 1e-10;

// ============================================================
// LINE PRIMITIVES
// ============================================================

/// Evaluate the line through `(x1, y1)` and `(x2, y2)` at `x`.
///
/// Works for interpolation and extrapolation alike. When the two anchors share
/// (almost) the same `x`, the mean of `y1` and `y2` is returned instead of
/// dividing by zero.
#[inline]
pub fn interpolate(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    interpolate_eps(x1, x2, y1, y2, x, DEGENERATE_SPAN)
}

/// Like [`interpolate`] but with a custom degeneracy threshold (replaces [`DEGENERATE_SPAN`]).
#[inline]
pub fn interpolate_eps(x1: f64, x2: f64, y1: f64, y2: f64, x: f64, eps: f64) -> f64 {
    if (x2 - x1).abs() < eps {
        return (y1 + y2) / 2.0;
    }
    y1 + (y2 - y1) / (x2 - x1) * (x - x1)
}

/// Slope of the line through `(x1, y1)` and `(x2, y2)`; `0.0` when degenerate.
#[inline]
pub fn slope(x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    slope_eps(x1, x2, y1, y2, DEGENERATE_SPAN)
}

/// Like [`slope`] but with a custom degeneracy threshold.
#[inline]
pub fn slope_eps(x1: f64, x2: f64, y1: f64, y2: f64, eps: f64) -> f64 {
    if (x2 - x1).abs() < eps {
        return 0.0;
    }
    (y2 - y1) / (x2 - x1)
}

// ============================================================
// NECKLINE
// ============================================================

/// Line through the two inner reaction points (pivots 2 and 4) of a candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neckline {
    pub left: PricePoint,
    pub right: PricePoint,
    pub eps: f64,
}

impl Neckline {
    pub fn new(left: PricePoint, right: PricePoint) -> Self {
        Self { left, right, eps: DEGENERATE_SPAN }
    }

    pub fn with_eps(left: PricePoint, right: PricePoint, eps: f64) -> Self {
        Self { left, right, eps }
    }

    /// Neckline price at time `t`, extrapolated outside the anchors
    #[inline]
    pub fn at(&self, t: f64) -> f64 {
        interpolate_eps(self.left.time, self.right.time, self.left.price, self.right.price, t, self.eps)
    }

    #[inline]
    pub fn slope(&self) -> f64 {
        slope_eps(self.left.time, self.right.time, self.left.price, self.right.price, self.eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_inside_and_outside() {
        assert!((interpolate(1.0, 2.0, 10.0, 20.0, 1.5) - 15.0).abs() < 1e-12);
        assert!((interpolate(10.0, 20.0, 110.0, 115.0, 26.0) - 118.0).abs() < 1e-12);
        assert!((interpolate(10.0, 20.0, 110.0, 115.0, 0.0) - 105.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_interpolation_returns_mean() {
        let y = interpolate(5.0, 5.0, 10.0, 20.0, 5.0);
        assert_eq!(y, 15.0);
        assert!(y.is_finite());

        // Far away from the anchors the fallback is still the mean
        assert_eq!(interpolate(5.0, 5.0 + 1e-12, 10.0, 20.0, 1e6), 15.0);
    }

    #[test]
    fn test_slope() {
        assert_eq!(slope(10.0, 20.0, 110.0, 115.0), 0.5);
        assert_eq!(slope(3.0, 3.0, 1.0, 100.0), 0.0);
        assert_eq!(slope_eps(0.0, 0.5, 0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_neckline() {
        let neckline = Neckline::new(PricePoint::new(10.0, 110.0), PricePoint::new(20.0, 115.0));
        assert_eq!(neckline.slope(), 0.5);
        assert_eq!(neckline.at(26.0), 118.0);
        assert_eq!(neckline.at(5.0), 107.5);
    }
}
