//! SHS / iSHS shape matching over 6 consecutive pivots
//!
//! Pivot roles, SHS naming (iSHS mirrors every one):
//!
//! ```text
//!                3 head
//!      1 left   /\      5 right
//!       /\     /  \     /\
//!      /  \   /    \   /  \
//!     /    \ /      \ /
//!    0      2 ------ 4        <- neckline through 2 and 4
//! ```

use super::helpers::Neckline;
use crate::{series::PATTERN_PIVOTS, PatternKind, PricePoint};

/// True if the 6 pivots form `kind`.
///
/// SHS: `p0<p1, p0<p2, p1<p3, p5<p3`, both shoulders above the neckline and
/// the first point below it. iSHS is the exact mirror.
pub fn matches(kind: PatternKind, points: &[PricePoint; PATTERN_PIVOTS], eps: f64) -> bool {
    let [p0, p1, p2, p3, _, p5] = points.map(|p| p.price);
    let neckline = Neckline::with_eps(points[2], points[4], eps);
    let beyond = |a: f64, b: f64| kind.beyond(a, b);

    // Ordering of the extremes
    beyond(p1, p0)
        && beyond(p2, p0)
        && beyond(p3, p1)
        && beyond(p3, p5)
        // Shoulders on the far side of the neckline, start on the near side
        && beyond(p5, neckline.at(points[5].time))
        && beyond(p1, neckline.at(points[1].time))
        && beyond(neckline.at(points[0].time), p0)
}

/// Classify 6 pivots; at most one kind can match.
pub fn match_shape(points: &[PricePoint; PATTERN_PIVOTS], eps: f64) -> Option<PatternKind> {
    PatternKind::ALL
        .into_iter()
        .find(|&kind| matches(kind, points, eps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::helpers::DEGENERATE_SPAN;

    fn points(prices: [f64; 6]) -> [PricePoint; 6] {
        std::array::from_fn(|i| PricePoint::new(i as f64 * 5.0, prices[i]))
    }

    #[test]
    fn test_shs_detection() {
        let pts = points([100.0, 130.0, 110.0, 150.0, 115.0, 125.0]);
        assert!(matches(PatternKind::Shs, &pts, DEGENERATE_SPAN));
        assert!(!matches(PatternKind::InverseShs, &pts, DEGENERATE_SPAN));
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), Some(PatternKind::Shs));
    }

    #[test]
    fn test_ishs_detection() {
        let pts = points([200.0, 170.0, 190.0, 150.0, 185.0, 175.0]);
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), Some(PatternKind::InverseShs));
    }

    #[test]
    fn test_head_not_highest() {
        // Right shoulder above the head
        let pts = points([100.0, 130.0, 110.0, 150.0, 115.0, 155.0]);
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), None);
    }

    #[test]
    fn test_right_shoulder_below_neckline() {
        // Neckline at t=25 is 117.5; shoulder 117 sits under it
        let pts = points([100.0, 130.0, 110.0, 150.0, 115.0, 117.0]);
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), None);
    }

    #[test]
    fn test_start_above_neckline() {
        // Steep neckline: extrapolated to t=0 it drops below the first point
        let pts = points([100.0, 130.0, 110.0, 150.0, 125.0, 135.0]);
        // neckline(0) = 95 < 100
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), None);
    }

    #[test]
    fn test_degenerate_neckline() {
        // Pivots 2 and 4 share a timestamp; neckline collapses to their mean (112.5)
        let mut pts = points([100.0, 130.0, 110.0, 150.0, 115.0, 125.0]);
        pts[4].time = pts[2].time;
        assert_eq!(match_shape(&pts, DEGENERATE_SPAN), Some(PatternKind::Shs));
    }
}
