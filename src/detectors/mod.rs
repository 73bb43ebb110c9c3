//! Detection stages
//!
//! Each stage is usable on its own; the scan orchestrator wires them together.
//!
//! # Stages
//!
//! - **helpers**: degenerate-safe interpolation/slope and the [`Neckline`]
//! - **shape**: SHS / iSHS geometry over 6 consecutive pivots
//! - **breakout**: per-candidate invalidation/breakout state machine
//! - **trend**: global ascending/descending run tracking over pivots
//! - **returns**: incremental fixed and pattern-relative window returns
//! - **local_trend**: per-candidate trend walks used by the parallel mode

pub mod helpers;

pub mod breakout;
pub mod local_trend;
pub mod returns;
pub mod shape;
pub mod trend;

// Re-export all stages for convenience
pub use breakout::*;
pub use helpers::*;
pub use returns::*;
pub use shape::*;
pub use trend::*;
