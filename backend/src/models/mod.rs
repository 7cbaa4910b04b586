//! Domain models for the cut-in simulator

pub mod command;
pub mod event;
pub mod kinematics;
pub mod scenario;

// Re-exports
pub use command::Command;
pub use event::{EpisodeEndReason, Event, EventLog};
pub use kinematics::{KinematicsError, VehicleKinematics};
pub use scenario::ScenarioRecord;
