//! Safety Metrics
//!
//! Longitudinal time-to-collision and separation between the aggressor and
//! the target, plus a per-episode running summary.
//!
//! # Critical Invariants
//!
//! 1. **Pure**: metrics read two snapshots and nothing else
//! 2. **Total**: a zero closing speed yields `f64::INFINITY`, never a division

pub mod safety;
pub mod summary;

pub use safety::{longitudinal_ttc, separation, VEHICLE_LENGTH};
pub use summary::{summarize_step_log, SafetySummary};
