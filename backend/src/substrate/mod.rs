//! Simulation Substrate Interface
//!
//! The substrate owns road geometry, vehicle dynamics and lane-change
//! execution. The core only talks to it through the `Substrate` trait:
//!
//! ```text
//! reset(placement)        create both vehicles for a new episode
//! place_target(x)         move the target to its scripted longitudinal start
//! step(command)           advance one policy period under a command
//! aggressor() / target()  read the latest telemetry
//! close()                 release episode resources
//! ```
//!
//! Every call is synchronous; `step` is the only potentially expensive one.

use crate::models::{Command, ScenarioRecord, VehicleKinematics};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod replay;

pub use replay::ReplaySubstrate;

/// Errors reported by the host simulator
#[derive(Debug, Error, PartialEq)]
pub enum SubstrateError {
    #[error("Substrate reset failed: {0}")]
    Reset(String),

    #[error("Substrate step failed: {0}")]
    Step(String),

    #[error("Substrate has no active episode")]
    NotRunning,

    #[error("Malformed {vehicle} telemetry: {reason}")]
    Telemetry { vehicle: &'static str, reason: String },
}

/// Per-vehicle telemetry read after a reset or step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    pub kinematics: VehicleKinematics,
    /// Vehicle has collided
    pub crashed: bool,
    /// Last applied longitudinal acceleration (m/s²)
    pub acceleration: f64,
    /// Last applied steering angle (rad)
    pub steering: f64,
}

impl VehicleTelemetry {
    pub fn new(kinematics: VehicleKinematics) -> Self {
        Self {
            kinematics,
            crashed: false,
            acceleration: 0.0,
            steering: 0.0,
        }
    }
}

/// Vehicle setup requested at the start of an episode
///
/// The target always starts in `ScenarioRecord::TARGET_LANE`; the aggressor
/// starts `lane_offset` lanes away from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialPlacement {
    pub aggressor_speed: f64,
    pub target_speed: f64,
    pub aggressor_lane: i32,
    pub target_lane: i32,
}

impl From<&ScenarioRecord> for InitialPlacement {
    fn from(record: &ScenarioRecord) -> Self {
        Self {
            aggressor_speed: record.aggressor_speed(),
            target_speed: record.target_speed(),
            aggressor_lane: record.aggressor_lane(),
            target_lane: ScenarioRecord::TARGET_LANE,
        }
    }
}

/// Result of one substrate step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepOutcome {
    pub reward: f64,
    /// Episode reached a terminal state
    pub terminated: bool,
    /// Episode was cut short by the substrate's own time limit
    pub truncated: bool,
}

/// Host simulation the orchestrator drives
pub trait Substrate {
    /// Start a new episode with both vehicles created per `placement`
    fn reset(&mut self, placement: &InitialPlacement) -> Result<(), SubstrateError>;

    /// Override the target's longitudinal position
    fn place_target(&mut self, position_x: f64) -> Result<(), SubstrateError>;

    /// Apply `command` to the aggressor and advance one policy period
    fn step(&mut self, command: Command) -> Result<StepOutcome, SubstrateError>;

    /// Latest aggressor telemetry
    fn aggressor(&self) -> Result<VehicleTelemetry, SubstrateError>;

    /// Latest target telemetry
    fn target(&self) -> Result<VehicleTelemetry, SubstrateError>;

    /// Release episode resources; called at the end of every episode
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_from_record() {
        let record = ScenarioRecord::new(40.0, -31.0, 24.0, -1);
        let placement = InitialPlacement::from(&record);
        assert_eq!(placement.aggressor_speed, 31.0);
        assert_eq!(placement.target_speed, 24.0);
        assert_eq!(placement.aggressor_lane, 0);
        assert_eq!(placement.target_lane, 1);
    }
}
