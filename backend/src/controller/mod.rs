//! Aggressor Controller Module
//!
//! This module defines the controller interface that decides, once per tick,
//! which high-level command the aggressor vehicle receives.
//!
//! # Controller Interface
//!
//! All controllers implement the `AggressorController` trait:
//! ```rust
//! use cut_in_simulator_core_rs::controller::AggressorController;
//! use cut_in_simulator_core_rs::{Command, VehicleKinematics};
//!
//! struct AlwaysFaster;
//!
//! impl AggressorController for AlwaysFaster {
//!     fn get_action(&mut self, _bv: &VehicleKinematics, _av: &VehicleKinematics) -> Command {
//!         Command::Faster
//!     }
//!
//!     fn reset(&mut self) {}
//! }
//! ```
//!
//! Available controllers:
//! 1. **CutIn**: four-phase adversarial cut-in state machine
//! 2. **Passive**: emits `Idle` every tick (baseline / external action runs)
//!
//! Controllers are built from `ControllerConfig` by the orchestrator:
//!
//! ```rust
//! use cut_in_simulator_core_rs::controller::ControllerConfig;
//!
//! let config = ControllerConfig::CutIn {
//!     max_speed: 34.0,
//!     overtake_distance: 8.0,
//! };
//! let controller = config.build().unwrap();
//! assert!(controller.phase().is_some());
//! ```

use crate::models::{Command, VehicleKinematics};
use serde::{Deserialize, Serialize};

pub mod cut_in;
pub mod phase;

pub use cut_in::{CutInConfig, CutInController};
pub use phase::Phase;

/// Per-tick decision maker for the aggressor vehicle
pub trait AggressorController {
    /// Consume the current snapshot pair and return this tick's command
    ///
    /// Any internal state update and the command choice happen in this one
    /// call.
    fn get_action(&mut self, aggressor: &VehicleKinematics, target: &VehicleKinematics) -> Command;

    /// Reinitialize for a new episode
    fn reset(&mut self);

    /// Current maneuver phase, for controllers that have one
    fn phase(&self) -> Option<Phase> {
        None
    }
}

/// No-op controller: the aggressor keeps whatever the substrate does by default
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveController;

impl AggressorController for PassiveController {
    fn get_action(&mut self, _aggressor: &VehicleKinematics, _target: &VehicleKinematics) -> Command {
        Command::Idle
    }

    fn reset(&mut self) {}
}

/// Controller selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerConfig {
    /// Scripted adversarial cut-in
    CutIn {
        #[serde(default = "CutInConfig::default_max_speed")]
        max_speed: f64,
        #[serde(default = "CutInConfig::default_overtake_distance")]
        overtake_distance: f64,
    },

    /// Always `Idle`
    Passive,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let defaults = CutInConfig::default();
        ControllerConfig::CutIn {
            max_speed: defaults.max_speed,
            overtake_distance: defaults.overtake_distance,
        }
    }
}

impl ControllerConfig {
    /// Validate and instantiate the configured controller
    pub fn build(&self) -> Result<Box<dyn AggressorController>, String> {
        match self {
            ControllerConfig::CutIn {
                max_speed,
                overtake_distance,
            } => {
                let config = CutInConfig {
                    max_speed: *max_speed,
                    overtake_distance: *overtake_distance,
                };
                config.validate()?;
                Ok(Box::new(CutInController::new(config)))
            }
            ControllerConfig::Passive => Ok(Box::new(PassiveController)),
        }
    }
}
