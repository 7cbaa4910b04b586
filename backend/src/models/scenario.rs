//! Scenario records: one recorded initial condition per episode

use serde::{Deserialize, Serialize};

/// Initial condition for one cut-in episode
///
/// Speeds are stored as magnitudes regardless of the sign convention of the
/// recording (the source dataset encodes driving direction in the sign).
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::ScenarioRecord;
///
/// let record = ScenarioRecord::new(50.0, -30.0, 25.0, 1);
/// assert_eq!(record.aggressor_speed(), 30.0);
/// assert_eq!(record.aggressor_lane(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    initial_gap: f64,
    aggressor_speed: f64,
    target_speed: f64,
    lane_offset: i32,
}

impl ScenarioRecord {
    /// Lane the target vehicle always starts in
    pub const TARGET_LANE: i32 = 1;

    pub fn new(initial_gap: f64, aggressor_speed: f64, target_speed: f64, lane_offset: i32) -> Self {
        Self {
            initial_gap,
            aggressor_speed: aggressor_speed.abs(),
            target_speed: target_speed.abs(),
            lane_offset,
        }
    }

    /// Signed longitudinal gap, target minus aggressor (m)
    pub fn initial_gap(&self) -> f64 {
        self.initial_gap
    }

    pub fn aggressor_speed(&self) -> f64 {
        self.aggressor_speed
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Aggressor lane minus target lane
    pub fn lane_offset(&self) -> i32 {
        self.lane_offset
    }

    /// Lane the aggressor starts in
    pub fn aggressor_lane(&self) -> i32 {
        Self::TARGET_LANE.saturating_add(self.lane_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggressor_lane_from_offset() {
        assert_eq!(ScenarioRecord::new(50.0, 30.0, 25.0, 1).aggressor_lane(), 2);
        assert_eq!(ScenarioRecord::new(50.0, 30.0, 25.0, -1).aggressor_lane(), 0);
    }

    #[test]
    fn test_aggressor_lane_saturates() {
        let record = ScenarioRecord::new(50.0, 30.0, 25.0, i32::MAX);
        assert_eq!(record.aggressor_lane(), i32::MAX);
    }
}
