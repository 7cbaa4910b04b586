//! Finite-state cut-in controller
//!
//! Drives the aggressor through accelerate → overtake → cut in → maintain
//! using only the relative kinematics of the two vehicles on each tick.
//!
//! # Tick Contract
//!
//! ```text
//! get_action(bv, av):
//! 1. dx = av.x - bv.x          (negative: aggressor is ahead by |dx|)
//! 2. Update phase (at most one transition)
//! 3. Compute the command from the (possibly new) phase
//! ```
//!
//! Both steps happen inside one call so a caller can never observe a phase
//! that disagrees with the command it just received.

use super::phase::Phase;
use super::AggressorController;
use crate::models::{Command, VehicleKinematics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Speed margin below `max_speed` at which acceleration counts as complete
pub const ACCEL_COMPLETE_MARGIN: f64 = 1.0;

/// Speed margin below `max_speed` held while overtaking
pub const OVERTAKE_SPEED_MARGIN: f64 = 0.5;

/// Lane indices closer than this are the same lane
pub const LANE_ALIGNMENT_TOLERANCE: f64 = 0.01;

/// Lead beyond which the maintaining aggressor slows down (m)
pub const MAINTAIN_MAX_LEAD: f64 = 20.0;

/// Lead below which the maintaining aggressor speeds up (m)
pub const MAINTAIN_MIN_LEAD: f64 = 10.0;

/// Tuning for the cut-in controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutInConfig {
    /// Top speed the aggressor accelerates towards (m/s)
    #[serde(default = "CutInConfig::default_max_speed")]
    pub max_speed: f64,

    /// How far ahead of the target the aggressor must be before cutting in (m)
    #[serde(default = "CutInConfig::default_overtake_distance")]
    pub overtake_distance: f64,
}

impl Default for CutInConfig {
    fn default() -> Self {
        Self {
            max_speed: Self::default_max_speed(),
            overtake_distance: Self::default_overtake_distance(),
        }
    }
}

impl CutInConfig {
    pub fn default_max_speed() -> f64 {
        36.0
    }

    pub fn default_overtake_distance() -> f64 {
        5.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.max_speed.is_finite() || self.max_speed <= ACCEL_COMPLETE_MARGIN {
            return Err(format!(
                "max_speed must be finite and greater than {}, got {}",
                ACCEL_COMPLETE_MARGIN, self.max_speed
            ));
        }
        if !self.overtake_distance.is_finite() || self.overtake_distance < 0.0 {
            return Err(format!(
                "overtake_distance must be finite and non-negative, got {}",
                self.overtake_distance
            ));
        }
        Ok(())
    }
}

/// Cut-in state machine for one aggressor/target pair
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::controller::{CutInController, Phase};
/// use cut_in_simulator_core_rs::{Command, VehicleKinematics};
///
/// let mut controller = CutInController::default();
///
/// // Aggressor 10 m ahead of the target, one lane over, still slow
/// let bv = VehicleKinematics::new(110.0, 8.0, 30.0, 0.0, 2.0);
/// let av = VehicleKinematics::new(100.0, 4.0, 25.0, 0.0, 1.0);
///
/// // Skips Overtaking and issues the lane change on the same tick
/// assert_eq!(controller.get_action(&bv, &av), Command::LaneLeft);
/// assert_eq!(controller.phase(), Phase::CuttingIn);
///
/// // Issued once; waits for the substrate to complete it
/// assert_eq!(controller.get_action(&bv, &av), Command::Idle);
/// ```
#[derive(Debug, Clone)]
pub struct CutInController {
    config: CutInConfig,
    phase: Phase,
    acceleration_complete: bool,
    /// Lane change issued since entering CuttingIn, awaiting alignment
    lane_change_pending: bool,
}

impl Default for CutInController {
    fn default() -> Self {
        Self::new(CutInConfig::default())
    }
}

impl CutInController {
    pub fn new(config: CutInConfig) -> Self {
        Self {
            config,
            phase: Phase::Accelerating,
            acceleration_complete: false,
            lane_change_pending: false,
        }
    }

    pub fn config(&self) -> &CutInConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn acceleration_complete(&self) -> bool {
        self.acceleration_complete
    }

    pub fn lane_change_pending(&self) -> bool {
        self.lane_change_pending
    }

    /// Allow the lane change to be re-issued (e.g. after the substrate
    /// rejected it)
    pub fn clear_lane_change_pending(&mut self) {
        self.lane_change_pending = false;
    }

    /// Return to `Accelerating` with both flags cleared
    pub fn reset(&mut self) {
        self.phase = Phase::Accelerating;
        self.acceleration_complete = false;
        self.lane_change_pending = false;
        debug!("Cut-in controller reset");
    }

    /// Update the phase from the current snapshots, then pick the command
    pub fn get_action(&mut self, bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
        self.update_phase(bv, av);

        match self.phase {
            Phase::Accelerating => self.accelerate_action(bv, av),
            Phase::Overtaking => self.overtake_action(bv, av),
            Phase::CuttingIn => self.cut_in_action(bv, av),
            Phase::Maintaining => self.maintain_action(bv, av),
        }
    }

    fn update_phase(&mut self, bv: &VehicleKinematics, av: &VehicleKinematics) {
        let dx = av.position_x - bv.position_x;

        match self.phase {
            Phase::Accelerating => {
                // Speed guard takes precedence; the distance guard is only
                // consulted when it did not fire.
                if bv.speed >= self.config.max_speed - ACCEL_COMPLETE_MARGIN {
                    self.acceleration_complete = true;
                    self.enter(Phase::Overtaking, bv, dx);
                } else if dx < -self.config.overtake_distance {
                    self.acceleration_complete = true;
                    self.enter(Phase::CuttingIn, bv, dx);
                }
            }
            Phase::Overtaking => {
                if dx < -self.config.overtake_distance {
                    self.enter(Phase::CuttingIn, bv, dx);
                }
            }
            Phase::CuttingIn => {
                if lanes_aligned(bv, av) {
                    self.enter(Phase::Maintaining, bv, dx);
                }
            }
            Phase::Maintaining => {}
        }
    }

    fn enter(&mut self, next: Phase, bv: &VehicleKinematics, dx: f64) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        info!(
            from = %self.phase,
            to = %next,
            speed = bv.speed,
            lead = -dx,
            lane = bv.lane_index,
            "Cut-in phase transition"
        );
        self.phase = next;
    }

    fn accelerate_action(&self, bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
        let dx = av.position_x - bv.position_x;

        // Far enough ahead already: stop closing and let the phase catch up
        if dx < -self.config.overtake_distance {
            return Command::Idle;
        }
        if bv.speed < self.config.max_speed {
            Command::Faster
        } else {
            Command::Idle
        }
    }

    fn overtake_action(&self, bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
        let dx = av.position_x - bv.position_x;

        if dx < -self.config.overtake_distance {
            return Command::Idle;
        }
        if bv.speed < self.config.max_speed - OVERTAKE_SPEED_MARGIN {
            Command::Faster
        } else {
            Command::Idle
        }
    }

    fn cut_in_action(&mut self, bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
        if lanes_aligned(bv, av) {
            self.lane_change_pending = false;
            return Command::Idle;
        }

        if self.lane_change_pending {
            return Command::Idle;
        }

        self.lane_change_pending = true;
        let direction = lane_change_direction(bv, av);
        info!(
            command = %direction,
            from_lane = bv.lane_index,
            to_lane = av.lane_index,
            "Cut-in lane change issued"
        );
        direction
    }

    fn maintain_action(&self, bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
        let dx = av.position_x - bv.position_x;

        if dx < -MAINTAIN_MAX_LEAD {
            Command::Slower
        } else if dx > -MAINTAIN_MIN_LEAD {
            Command::Faster
        } else {
            Command::Idle
        }
    }
}

impl AggressorController for CutInController {
    fn get_action(&mut self, aggressor: &VehicleKinematics, target: &VehicleKinematics) -> Command {
        CutInController::get_action(self, aggressor, target)
    }

    fn reset(&mut self) {
        CutInController::reset(self)
    }

    fn phase(&self) -> Option<Phase> {
        Some(self.phase)
    }
}

fn lanes_aligned(bv: &VehicleKinematics, av: &VehicleKinematics) -> bool {
    (bv.lane_index - av.lane_index).abs() < LANE_ALIGNMENT_TOLERANCE
}

/// Lower lane indices are to the left
fn lane_change_direction(bv: &VehicleKinematics, av: &VehicleKinematics) -> Command {
    if bv.lane_index > av.lane_index {
        Command::LaneLeft
    } else if bv.lane_index < av.lane_index {
        Command::LaneRight
    } else {
        Command::Idle
    }
}
