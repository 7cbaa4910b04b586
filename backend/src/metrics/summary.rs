//! Running safety summary over the ticks of one episode

use crate::sink::StepRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulates per-tick safety metrics
///
/// Infinite TTC values are not "observed" as minima; an episode in which the
/// gap never closes reports `min_ttc == None`.
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::metrics::SafetySummary;
///
/// let mut summary = SafetySummary::new();
/// summary.observe(1, f64::INFINITY, 40.0, false);
/// summary.observe(2, 3.5, 22.0, false);
/// summary.observe(3, 1.2, 9.0, true);
///
/// assert_eq!(summary.steps, 3);
/// assert_eq!(summary.min_ttc, Some(1.2));
/// assert_eq!(summary.min_separation, Some(9.0));
/// assert_eq!(summary.first_collision_step, Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetySummary {
    /// Ticks observed
    pub steps: usize,

    /// Smallest finite longitudinal TTC seen (s)
    pub min_ttc: Option<f64>,

    /// Smallest separation seen (m)
    pub min_separation: Option<f64>,

    /// Step of the first tick with the crash flag raised
    pub first_collision_step: Option<usize>,
}

impl SafetySummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick into the summary
    pub fn observe(&mut self, step: usize, ttc: f64, separation: f64, crashed: bool) {
        self.steps += 1;
        if ttc.is_finite() {
            self.min_ttc = Some(self.min_ttc.map_or(ttc, |m| m.min(ttc)));
        }
        self.min_separation = Some(self.min_separation.map_or(separation, |m| m.min(separation)));
        if crashed && self.first_collision_step.is_none() {
            self.first_collision_step = Some(step);
        }
    }

    pub fn collided(&self) -> bool {
        self.first_collision_step.is_some()
    }
}

/// Summarise step log rows per episode
///
/// Rows are folded in file order. With `episode` set, only that episode is
/// returned (an empty map if it never appears).
pub fn summarize_step_log(
    records: &[StepRecord],
    episode: Option<usize>,
) -> BTreeMap<usize, SafetySummary> {
    let mut summaries: BTreeMap<usize, SafetySummary> = BTreeMap::new();
    for record in records {
        if episode.is_some_and(|e| e != record.episode) {
            continue;
        }
        summaries.entry(record.episode).or_default().observe(
            record.step,
            record.ttc_lon,
            record.distance,
            record.crash,
        );
    }
    summaries
}
