//! Cut-in Simulator Core - Rust Engine
//!
//! Adversarial cut-in scenario generation for testing a target vehicle's
//! driving policy. A scripted aggressor accelerates, overtakes and cuts in
//! ahead of the target, once per scenario drawn from a catalog.
//!
//! # Architecture
//!
//! - **catalog**: Scenario catalog loading and round-robin selection
//! - **controller**: Aggressor controllers (cut-in state machine, passive)
//! - **core**: Episode and step counters
//! - **metrics**: Longitudinal TTC, separation, safety summaries
//! - **models**: Domain types (Command, VehicleKinematics, ScenarioRecord, Event)
//! - **orchestrator**: Episode loop, campaign summaries, checkpoints
//! - **sink**: Step log rows and writers
//! - **substrate**: Host simulator interface
//!
//! # Critical Invariants
//!
//! 1. The controller emits exactly one command per tick
//! 2. Phases only move forward within an episode
//! 3. Scenarios are drawn round-robin; the catalog cursor never leaves `[0, len)`

// Module declarations
pub mod catalog;
pub mod controller;
pub mod core;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod sink;
pub mod substrate;

// Re-exports for convenience
pub use catalog::{CatalogError, ScenarioCatalog};
pub use controller::{AggressorController, ControllerConfig, CutInConfig, CutInController, Phase};
pub use core::time::EpisodeClock;
pub use metrics::{longitudinal_ttc, separation, SafetySummary};
pub use models::{Command, Event, EventLog, ScenarioRecord, VehicleKinematics};
pub use orchestrator::{
    CampaignConfig, CampaignSummary, EpisodeSummary, Orchestrator, OrchestratorConfig,
    SimulationError, TickResult,
};
pub use sink::{LogSink, StepRecord};
pub use substrate::{Substrate, VehicleTelemetry};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn cut_in_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::controller::PyCutInController>()?;
    m.add_class::<ffi::catalog::PyScenarioCatalog>()?;
    m.add_class::<ffi::orchestrator::PyOrchestrator>()?;
    m.add_function(wrap_pyfunction!(ffi::controller::longitudinal_ttc, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::controller::separation, m)?)?;
    Ok(())
}
