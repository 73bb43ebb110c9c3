//! Parameter metadata for the scanner
//!
//! Describes the numeric knobs of [`ScanConfig`], enabling:
//! - Grid search over scan settings
//! - Parameter documentation
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use yahsd::params::ParameterizedScan;
//! use yahsd::prelude::*;
//!
//! for param in ScanConfig::param_meta() {
//!   println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let params = HashMap::from([("trend_completion_run", 5.0)]);
//! let config = ScanConfig::with_params(&params).unwrap();
//! assert_eq!(config.trend_completion_run.get(), 5);
//! ```

use std::collections::HashMap;

use crate::{PatternError, Period, Result, ScanConfig};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Small positive threshold (e.g. a degeneracy epsilon)
  Tolerance,
  /// Positive integer count
  Period,
  /// Positive length in time units
  Length,
}

/// Metadata for a single scan parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name, matching the `ScanConfig` field
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn tolerance(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Tolerance, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn length(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Length, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + step * 1e-9 {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if !(min..=max).contains(&value) {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Tolerance | ParamType::Length => {
        if value <= 0.0 {
          return Err(PatternError::InvalidValue("value must be > 0"));
        }
        Ok(())
      },
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(PatternError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED SCAN TRAIT
// ============================================================

/// Configurations that can be built from a flat parameter map
pub trait ParameterizedScan: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

const SCAN_PARAMS: [ParamMeta; 3] = [
  ParamMeta::tolerance(
    "neckline_epsilon",
    1e-10,
    (1e-12, 1e-6, 1e-7),
    "Neckline anchors closer than this in time collapse to their mean",
  ),
  ParamMeta::period(
    "trend_completion_run",
    3.0,
    (1.0, 10.0, 1.0),
    "Run length at which the following trend is complete",
  ),
  ParamMeta::length(
    "min_pattern_length",
    1.0,
    (0.5, 10.0, 0.5),
    "Lower clamp for the pattern length of relative return windows",
  ),
];

impl ParameterizedScan for ScanConfig {
  fn param_meta() -> &'static [ParamMeta] {
    &SCAN_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    for (key, &value) in params {
      let meta = SCAN_PARAMS
        .iter()
        .find(|meta| meta.name == *key)
        .ok_or_else(|| PatternError::InvalidConfig(format!("unknown parameter `{key}`")))?;
      meta.validate(value)?;
    }

    let config = ScanConfig {
      neckline_epsilon: get_value(params, "neckline_epsilon", 1e-10),
      trend_completion_run: get_period(params, "trend_completion_run", 3)?,
      min_pattern_length: get_value(params, "min_pattern_length", 1.0),
      ..ScanConfig::default()
    };
    config.validate()?;
    Ok(config)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a raw value from params with default fallback
pub fn get_value(params: &HashMap<&str, f64>, key: &str, default: f64) -> f64 {
  params.get(key).copied().unwrap_or(default)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================
