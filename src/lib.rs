//! # YAHSD - Yet Another Head-and-Shoulders Detector
//!
//! Scans a price series for Shoulder-Head-Shoulder (SHS) and inverse (iSHS)
//! formations over an externally supplied pivot sequence, confirms them with a
//! neckline breakout rule, attaches trend context and measures what happened
//! after the breakout.
//!
//! ## Quick Start
//!
//! ```rust
//! use yahsd::prelude::*;
//!
//! // Full-resolution series and the pivot (zig-zag) indices into it
//! let time: Vec<f64> = (0..40).map(|t| t as f64).collect();
//! let price: Vec<f64> = time.iter().map(|t| 100.0 + (t * 0.7).sin() * 10.0).collect();
//! let pivots = vec![0, 2, 7, 11, 16, 20, 25, 29, 34];
//!
//! let scanner = ScannerBuilder::new().build().unwrap();
//! let records = scanner.scan(&pivots, &time, &price).unwrap();
//! for record in &records {
//!     println!("{} valid={} breakout={:?}", record.kind.as_str(), record.valid, record.breakout);
//! }
//! ```

pub mod candidate;
pub mod detectors;
pub mod params;
mod scan;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Candidates and records
        candidate::{Lifecycle, PatternCandidate, PatternRecord, TrendContext},
        // Detection stages
        detectors::{
            interpolate, match_shape, slope, Breakout, BreakoutMonitor, BreakoutStep, Neckline,
            ReturnConvention, ReturnFormula, ReturnSettings, ReturnTracker, RunCounter,
            TrendSnapshot, TrendTracker, WindowReturns, FIXED_WINDOWS, RELATIVE_MULTIPLES,
        },
        // Parameters
        params::{get_period, get_value, ParamMeta, ParamType, ParameterizedScan},
        // Parallel
        scan_instruments,
        // Series
        series::{PivotSeries, SeriesView, MIN_PIVOTS},
        Direction,
        Instrument,
        Outcome,
        // Errors
        PatternError,
        PatternKind,
        Period,
        PivotPoint,
        PricePoint,
        Result,
        ScanConfig,
        ScanError,
        ScanMode,
        ScanResult,
        // Engine
        Scanner,
        ScannerBuilder,
    };
}

use serde::{Deserialize, Serialize};

use candidate::{PatternCandidate, PatternRecord};
use detectors::{ReturnConvention, ReturnFormula, ReturnSettings};
use series::{PivotSeries, SeriesView};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur while configuring or running a scan
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} pivots, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Length mismatch: {time} timestamps vs {price} prices")]
    LengthMismatch { time: usize, price: usize },

    #[error("Invalid pivot at position {position}: {reason}")]
    InvalidPivot {
        position: usize,
        reason: &'static str,
    },

    #[error("Invalid series sample at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Period / run length (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// POINTS
// ============================================================

/// A (time, price) coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: f64,
    pub price: f64,
}

impl PricePoint {
    #[inline]
    pub const fn new(time: f64, price: f64) -> Self {
        Self { time, price }
    }
}

/// A pivot with both its position in the pivot sequence and its index in the original series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub pivot: usize,
    pub index: usize,
    pub time: f64,
    pub price: f64,
}

// ============================================================
// PATTERN KIND
// ============================================================

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// The two mirrored formations.
///
/// Both kinds share all control flow; they differ only in the direction of
/// every comparison, which [`PatternKind::beyond`] encodes through
/// [`PatternKind::sign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    /// Shoulder-Head-Shoulder, peaks above a neckline (bearish reversal)
    #[serde(rename = "SHS")]
    Shs,
    /// Inverse Shoulder-Head-Shoulder, troughs below a neckline (bullish reversal)
    #[serde(rename = "iSHS")]
    InverseShs,
}

impl PatternKind {
    pub const ALL: [PatternKind; 2] = [PatternKind::Shs, PatternKind::InverseShs];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Shs => "SHS",
            PatternKind::InverseShs => "iSHS",
        }
    }

    #[inline]
    pub fn direction(self) -> Direction {
        match self {
            PatternKind::Shs => Direction::Bearish,
            PatternKind::InverseShs => Direction::Bullish,
        }
    }

    /// `+1` for SHS, `-1` for iSHS
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            PatternKind::Shs => 1.0,
            PatternKind::InverseShs => -1.0,
        }
    }

    /// True if `a` lies strictly beyond `b` on the side of the pattern's
    /// extremes: above for SHS, below for iSHS.
    #[inline]
    pub fn beyond(self, a: f64, b: f64) -> bool {
        self.sign() * a > self.sign() * b
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final classification of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Neckline breakout confirmed
    Confirmed,
    /// Price moved past the right shoulder before any breakout
    Invalidated,
    /// Series ended while still monitoring
    Unresolved,
}

// ============================================================
// SCAN CONFIGURATION
// ============================================================

/// How the scan is executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// One forward pass with the global trend tracker
    #[default]
    Sequential,
    /// Candidates resolved independently on the rayon pool; trend context
    /// comes from a local walk around each candidate instead of the global
    /// tracker, so trend fields may differ from [`ScanMode::Sequential`].
    Parallel,
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Restrict detection to these kinds (`None` = all)
    pub kinds: Option<Vec<PatternKind>>,
    /// Neckline anchors closer than this in time are degenerate
    pub neckline_epsilon: f64,
    /// Following trend is complete once its run reaches this many steps
    pub trend_completion_run: Period,
    /// Lower clamp for the pattern length used by relative return windows
    pub min_pattern_length: f64,
    pub first_window_formula: ReturnFormula,
    pub return_convention: ReturnConvention,
    pub mode: ScanMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            kinds: None,
            neckline_epsilon: detectors::helpers::DEGENERATE_SPAN,
            trend_completion_run: Period::new_const(3),
            min_pattern_length: 1.0,
            first_window_formula: ReturnFormula::default(),
            return_convention: ReturnConvention::default(),
            mode: ScanMode::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.neckline_epsilon.is_finite() || self.neckline_epsilon <= 0.0 {
            return Err(PatternError::InvalidValue(
                "neckline_epsilon must be finite and > 0",
            ));
        }
        if !self.min_pattern_length.is_finite() || self.min_pattern_length <= 0.0 {
            return Err(PatternError::InvalidValue(
                "min_pattern_length must be finite and > 0",
            ));
        }
        if let Some(kinds) = &self.kinds {
            if kinds.is_empty() {
                return Err(PatternError::InvalidConfig(
                    "kind filter selects no pattern".to_string(),
                ));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn includes(&self, kind: PatternKind) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }

    pub fn return_settings(&self) -> ReturnSettings {
        ReturnSettings {
            first_window_formula: self.first_window_formula,
            convention: self.return_convention,
            min_pattern_length: self.min_pattern_length,
        }
    }
}

// ============================================================
// SCANNER
// ============================================================

/// Main scan engine
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
}

impl Default for Scanner {
    fn default() -> Self {
        Self { config: ScanConfig::default() }
    }
}

impl Scanner {
    /// Create a scanner from an explicit configuration
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan the series and return one record per candidate, in detection order.
    ///
    /// `pivots` are indices into `time`/`price`; see [`PivotSeries::new`] for
    /// the input contract. Contract violations are returned as errors and no
    /// partial work is done.
    pub fn scan(&self, pivots: &[usize], time: &[f64], price: &[f64]) -> Result<Vec<PatternRecord>> {
        let (series, pivot_series) = self.prepare(pivots, time, price)?;
        let candidates = self.run(&series, &pivot_series);
        Ok(candidates
            .iter()
            .map(|candidate| candidate.to_record(&pivot_series))
            .collect())
    }

    /// Like [`Scanner::scan`] but returns the candidates themselves
    pub fn candidates(
        &self,
        pivots: &[usize],
        time: &[f64],
        price: &[f64],
    ) -> Result<Vec<PatternCandidate>> {
        let (series, pivot_series) = self.prepare(pivots, time, price)?;
        Ok(self.run(&series, &pivot_series))
    }

    fn prepare<'a>(
        &self,
        pivots: &[usize],
        time: &'a [f64],
        price: &'a [f64],
    ) -> Result<(SeriesView<'a>, PivotSeries)> {
        let prepared = SeriesView::new(time, price)
            .and_then(|series| PivotSeries::new(pivots, &series).map(|p| (series, p)));
        if let Err(err) = &prepared {
            tracing::warn!("scan input rejected: {err}");
        }
        prepared
    }

    fn run(&self, series: &SeriesView<'_>, pivots: &PivotSeries) -> Vec<PatternCandidate> {
        let candidates = match self.config.mode {
            ScanMode::Sequential => scan::scan_sequential(&self.config, series, pivots),
            ScanMode::Parallel => scan::scan_parallel(&self.config, series, pivots),
        };
        tracing::debug!(
            "scan finished: {} candidates ({} confirmed) over {} pivots / {} samples",
            candidates.len(),
            candidates.iter().filter(|c| c.breakout.is_some()).count(),
            pivots.len(),
            series.len()
        );
        candidates
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating Scanner instances
#[derive(Debug, Clone, Default)]
pub struct ScannerBuilder {
    config: ScanConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Filter to specific pattern kinds only
    pub fn only_kinds(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn neckline_epsilon(mut self, eps: f64) -> Self {
        self.config.neckline_epsilon = eps;
        self
    }

    pub fn trend_completion_run(mut self, run: Period) -> Self {
        self.config.trend_completion_run = run;
        self
    }

    pub fn min_pattern_length(mut self, length: f64) -> Self {
        self.config.min_pattern_length = length;
        self
    }

    pub fn first_window_formula(mut self, formula: ReturnFormula) -> Self {
        self.config.first_window_formula = formula;
        self
    }

    pub fn return_convention(mut self, convention: ReturnConvention) -> Self {
        self.config.return_convention = convention;
        self
    }

    pub fn mode(mut self, mode: ScanMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Build the scanner
    pub fn build(self) -> Result<Scanner> {
        Scanner::new(self.config)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// One instrument's inputs
#[derive(Debug, Clone, Copy)]
pub struct Instrument<'a> {
    pub pivots: &'a [usize],
    pub time: &'a [f64],
    pub price: &'a [f64],
}

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub records: Vec<PatternRecord>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments
pub fn scan_instruments<'a, I>(scanner: &Scanner, instruments: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, Instrument<'a>)>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, input)| {
            scanner
                .scan(input.pivots, input.time, input.price)
                .map(|records| ScanResult {
                    symbol: symbol.to_string(),
                    records,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
