//! Orchestrator Engine
//!
//! Per-episode glue integrating all campaign components:
//! - Scenario selection (round-robin catalog)
//! - Substrate placement and stepping
//! - Controller decisions (one command per tick)
//! - Safety metrics and step logging
//! - Event logging (complete campaign history)
//!
//! # Architecture
//!
//! ```text
//! Episode start:
//! 1. Draw the next scenario record from the catalog
//! 2. Reset the substrate with the scenario's speeds and lanes
//! 3. Place the target at aggressor.x + initial_gap
//! 4. Reset the controller
//!
//! Each tick:
//! 1. Read the aggressor/target snapshot pair
//! 2. Controller update-then-act → command
//! 3. Substrate step(command)
//! 4. Metrics from the updated pair → log sink
//! 5. End the episode on terminal / truncation / step budget
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cut_in_simulator_core_rs::orchestrator::{Orchestrator, OrchestratorConfig};
//! use cut_in_simulator_core_rs::sink::CsvStepLog;
//! use cut_in_simulator_core_rs::ScenarioCatalog;
//!
//! let catalog = ScenarioCatalog::load("output/merged_all_scenarios.csv")?;
//! let sink = CsvStepLog::create("step_log.csv")?;
//! let mut orchestrator = Orchestrator::new(OrchestratorConfig::default(), catalog, my_substrate, sink)?;
//!
//! let summary = orchestrator.run_campaign(748)?;
//! println!("{} collisions in {} episodes", summary.collisions, summary.episodes);
//! ```

use crate::catalog::{CatalogError, ScenarioCatalog};
use crate::controller::{AggressorController, ControllerConfig, Phase};
use crate::core::time::EpisodeClock;
use crate::metrics::SafetySummary;
use crate::models::{
    Command, EpisodeEndReason, Event, EventLog, KinematicsError, ScenarioRecord,
};
use crate::sink::{LogSink, SinkError, StepRecord};
use crate::substrate::{InitialPlacement, StepOutcome, Substrate, SubstrateError, VehicleTelemetry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Step budget per episode
    #[serde(default = "OrchestratorConfig::default_max_steps")]
    pub max_steps_per_episode: usize,

    /// Which controller drives the aggressor
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl OrchestratorConfig {
    pub fn default_max_steps() -> usize {
        400
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps_per_episode: Self::default_max_steps(),
            controller: ControllerConfig::default(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Campaign error types
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No active episode")]
    NoActiveEpisode,

    #[error("Episode {0} still in progress")]
    EpisodeInProgress(usize),

    /// Substrate handed over a snapshot that cannot describe a vehicle
    #[error("Contract violation in {vehicle} snapshot: {source}")]
    ContractViolation {
        vehicle: &'static str,
        #[source]
        source: KinematicsError,
    },

    #[error("Scenario catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Substrate error: {0}")]
    Substrate(#[from] SubstrateError),

    #[error("Log sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Checkpoint mismatch: {0}")]
    CheckpointMismatch(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Results
// ============================================================================

/// What started an episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeStart {
    pub episode: usize,
    pub catalog_index: usize,
    pub scenario: ScenarioRecord,
    /// The draw that produced this scenario exhausted the catalog
    pub catalog_cycle_restarted: bool,
}

/// Result of a single tick
#[derive(Debug, Clone)]
pub struct TickResult {
    pub episode: usize,

    /// Step number within the episode (1 for the first tick)
    pub step: usize,

    /// Command forwarded to the substrate
    pub command: Command,

    /// Controller phase after this tick's update
    pub phase: Option<Phase>,

    pub outcome: StepOutcome,

    /// Row written to the log sink
    pub record: StepRecord,

    /// Set when this tick ended the episode
    pub ended: Option<EpisodeSummary>,
}

/// Outcome of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub catalog_index: usize,
    pub scenario: ScenarioRecord,
    pub steps: usize,
    pub end_reason: EpisodeEndReason,
    pub final_phase: Option<Phase>,
    pub safety: SafetySummary,
}

/// Aggregate over many episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub episodes: usize,
    pub total_steps: usize,
    pub collisions: usize,
    pub terminated: usize,
    pub truncated: usize,
    pub max_steps: usize,
    pub aborted: usize,
    /// Episodes whose controller reached `Maintaining`
    pub completed_cut_ins: usize,
    pub min_ttc: Option<f64>,
    pub min_separation: Option<f64>,
}

impl CampaignSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one episode into the aggregate
    pub fn add(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += episode.steps;
        if episode.safety.collided() {
            self.collisions += 1;
        }
        match episode.end_reason {
            EpisodeEndReason::Terminated => self.terminated += 1,
            EpisodeEndReason::Truncated => self.truncated += 1,
            EpisodeEndReason::MaxSteps => self.max_steps += 1,
            EpisodeEndReason::Aborted => self.aborted += 1,
        }
        if episode.final_phase == Some(Phase::Maintaining) {
            self.completed_cut_ins += 1;
        }
        if let Some(ttc) = episode.safety.min_ttc {
            self.min_ttc = Some(self.min_ttc.map_or(ttc, |m| m.min(ttc)));
        }
        if let Some(sep) = episode.safety.min_separation {
            self.min_separation = Some(self.min_separation.map_or(sep, |m| m.min(sep)));
        }
    }

    /// Fraction of episodes that recorded a collision
    pub fn collision_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.collisions as f64 / self.episodes as f64
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Bookkeeping for the episode in progress
#[derive(Debug, Clone)]
struct ActiveEpisode {
    index: usize,
    catalog_index: usize,
    scenario: ScenarioRecord,
    safety: SafetySummary,
}

/// Main orchestrator driving episodes against a substrate
///
/// The orchestrator owns the catalog, the controller, the substrate handle
/// and the log sink. Everything runs on the caller's thread; there is no
/// shared state.
///
/// # Determinism
///
/// Scenario order comes from the catalog cursor alone. Given a deterministic
/// substrate, the same catalog and config produce identical step logs and
/// event logs.
pub struct Orchestrator<S: Substrate, L: LogSink> {
    config: OrchestratorConfig,

    /// Round-robin scenario source
    catalog: ScenarioCatalog,

    /// Aggressor decision maker
    controller: Box<dyn AggressorController>,

    substrate: S,
    sink: L,

    /// Episode / step counters
    clock: EpisodeClock,

    /// Event log (all campaign events)
    event_log: EventLog,

    active: Option<ActiveEpisode>,
}

impl<S: Substrate, L: LogSink> Orchestrator<S, L> {
    /// Create a new orchestrator, building the configured controller
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` if the step budget is zero or the
    /// controller parameters are invalid.
    pub fn new(
        config: OrchestratorConfig,
        catalog: ScenarioCatalog,
        substrate: S,
        sink: L,
    ) -> Result<Self, SimulationError> {
        let controller = config
            .controller
            .build()
            .map_err(SimulationError::InvalidConfig)?;
        Self::with_controller(config, catalog, controller, substrate, sink)
    }

    /// Create an orchestrator around a caller-supplied controller
    ///
    /// `config.controller` is kept for hashing/checkpoints but not used to
    /// build anything.
    pub fn with_controller(
        config: OrchestratorConfig,
        catalog: ScenarioCatalog,
        controller: Box<dyn AggressorController>,
        substrate: S,
        sink: L,
    ) -> Result<Self, SimulationError> {
        if config.max_steps_per_episode == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_steps_per_episode must be positive".to_string(),
            ));
        }

        let clock = EpisodeClock::new(config.max_steps_per_episode);
        Ok(Self {
            config,
            catalog,
            controller,
            substrate,
            sink,
            clock,
            event_log: EventLog::new(),
            active: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut ScenarioCatalog {
        &mut self.catalog
    }

    pub(crate) fn clock_mut(&mut self) -> &mut EpisodeClock {
        &mut self.clock
    }

    /// Current controller phase
    pub fn phase(&self) -> Option<Phase> {
        self.controller.phase()
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut L {
        &mut self.sink
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Index of the running episode
    pub fn current_episode(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.index)
    }

    /// Steps taken in the running episode
    pub fn current_step(&self) -> usize {
        self.clock.step()
    }

    pub fn episodes_started(&self) -> usize {
        self.clock.episodes_started()
    }

    /// Give back the substrate and sink
    pub fn into_parts(self) -> (ScenarioCatalog, S, L) {
        (self.catalog, self.substrate, self.sink)
    }

    // ========================================================================
    // Episode Lifecycle
    // ========================================================================

    /// Begin the next episode
    ///
    /// Any episode still running is aborted first (its substrate episode is
    /// closed).
    pub fn start_episode(&mut self) -> Result<EpisodeStart, SimulationError> {
        if self.active.is_some() {
            self.abort_episode()?;
        }

        let draw = self.catalog.draw();
        let episode = self.clock.start_episode();

        if draw.cycle_restarted {
            self.event_log.log(Event::CatalogCycleRestarted {
                episode,
                cycles_completed: self.catalog.cycles_completed(),
            });
        }

        if let Err(e) = self.place_vehicles(&draw.record) {
            self.substrate.close();
            self.clock.end_episode();
            return Err(e);
        }

        self.controller.reset();
        self.active = Some(ActiveEpisode {
            index: episode,
            catalog_index: draw.index,
            scenario: draw.record,
            safety: SafetySummary::new(),
        });

        self.event_log.log(Event::EpisodeStarted {
            episode,
            catalog_index: draw.index,
            scenario: draw.record,
        });
        info!(
            episode,
            catalog_index = draw.index,
            initial_gap = draw.record.initial_gap(),
            aggressor_speed = draw.record.aggressor_speed(),
            target_speed = draw.record.target_speed(),
            lane_offset = draw.record.lane_offset(),
            "Episode started"
        );

        Ok(EpisodeStart {
            episode,
            catalog_index: draw.index,
            scenario: draw.record,
            catalog_cycle_restarted: draw.cycle_restarted,
        })
    }

    fn place_vehicles(&mut self, record: &ScenarioRecord) -> Result<(), SimulationError> {
        self.substrate.reset(&InitialPlacement::from(record))?;
        let aggressor = self.read_aggressor()?;
        self.substrate
            .place_target(aggressor.kinematics.position_x + record.initial_gap())?;
        Ok(())
    }

    /// Execute one tick with the controller's command
    ///
    /// # Returns
    ///
    /// * `Ok(TickResult)` - Tick executed; `ended` is set if the episode finished
    /// * `Err(SimulationError)` - Substrate, snapshot or sink failure; the
    ///   episode stays open so the caller can abort it
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        if self.active.is_none() {
            return Err(SimulationError::NoActiveEpisode);
        }

        let aggressor = self.read_aggressor()?;
        let target = self.read_target()?;

        let before = self.controller.phase();
        let command = self
            .controller
            .get_action(&aggressor.kinematics, &target.kinematics);
        let after = self.controller.phase();

        self.apply(command, before, after, true)
    }

    /// Execute one tick with an externally chosen command
    ///
    /// The controller is not consulted and its state does not change.
    pub fn tick_with_command(&mut self, command: Command) -> Result<TickResult, SimulationError> {
        if self.active.is_none() {
            return Err(SimulationError::NoActiveEpisode);
        }
        let phase = self.controller.phase();
        self.apply(command, phase, phase, false)
    }

    fn apply(
        &mut self,
        command: Command,
        before: Option<Phase>,
        after: Option<Phase>,
        from_controller: bool,
    ) -> Result<TickResult, SimulationError> {
        let episode = self
            .active
            .as_ref()
            .map(|a| a.index)
            .ok_or(SimulationError::NoActiveEpisode)?;
        let step = self.clock.step() + 1;

        // The controller has already moved; record that even if the host step fails
        if let (Some(from), Some(to)) = (before, after) {
            if from != to {
                self.event_log.log(Event::PhaseTransition {
                    episode,
                    step,
                    from,
                    to,
                });
            }
        }
        if from_controller && command.is_lane_change() {
            self.event_log.log(Event::LaneChangeIssued {
                episode,
                step,
                command,
            });
        }

        let outcome = self.substrate.step(command)?;
        self.clock.advance_step();

        let aggressor = self.read_aggressor()?;
        let target = self.read_target()?;
        let record = StepRecord::from_telemetry(episode, step, &aggressor, &target);

        if let Some(active) = self.active.as_mut() {
            let first_collision = record.crash && !active.safety.collided();
            active
                .safety
                .observe(step, record.ttc_lon, record.distance, record.crash);
            if first_collision {
                self.event_log.log(Event::Collision { episode, step });
                warn!(episode, step, "Aggressor collision");
            }
        }

        self.sink.record(&record)?;

        let end_reason = if outcome.terminated {
            Some(EpisodeEndReason::Terminated)
        } else if outcome.truncated {
            Some(EpisodeEndReason::Truncated)
        } else if self.clock.is_exhausted() {
            Some(EpisodeEndReason::MaxSteps)
        } else {
            None
        };

        let ended = match end_reason {
            Some(reason) => self.finish_episode(reason)?,
            None => None,
        };

        Ok(TickResult {
            episode,
            step,
            command,
            phase: after,
            outcome,
            record,
            ended,
        })
    }

    /// Stop the running episode early
    ///
    /// Closes the substrate episode. Returns `None` if nothing was running.
    pub fn abort_episode(&mut self) -> Result<Option<EpisodeSummary>, SimulationError> {
        self.finish_episode(EpisodeEndReason::Aborted)
    }

    fn finish_episode(
        &mut self,
        reason: EpisodeEndReason,
    ) -> Result<Option<EpisodeSummary>, SimulationError> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };

        let steps = self.clock.step();
        self.substrate.close();
        self.clock.end_episode();

        let summary = EpisodeSummary {
            episode: active.index,
            catalog_index: active.catalog_index,
            scenario: active.scenario,
            steps,
            end_reason: reason,
            final_phase: self.controller.phase(),
            safety: active.safety,
        };

        self.event_log.log(Event::EpisodeEnded {
            episode: active.index,
            steps,
            reason,
        });
        info!(
            episode = active.index,
            steps,
            reason = ?reason,
            final_phase = ?summary.final_phase,
            collided = summary.safety.collided(),
            "Episode ended"
        );

        self.sink.flush()?;
        Ok(Some(summary))
    }

    /// Run one complete episode with the controller
    ///
    /// On any error the episode is aborted (substrate closed) before the
    /// error is returned.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary, SimulationError> {
        self.start_episode()?;
        loop {
            match self.tick() {
                Ok(TickResult {
                    ended: Some(summary),
                    ..
                }) => return Ok(summary),
                Ok(_) => {}
                Err(e) => {
                    if let Err(abort_err) = self.abort_episode() {
                        warn!(error = %abort_err, "Failed to abort episode after error");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Run `episodes` consecutive episodes
    pub fn run_campaign(&mut self, episodes: usize) -> Result<CampaignSummary, SimulationError> {
        let mut summary = CampaignSummary::new();
        for _ in 0..episodes {
            let episode = self.run_episode()?;
            summary.add(&episode);
        }
        info!(
            episodes = summary.episodes,
            collisions = summary.collisions,
            completed_cut_ins = summary.completed_cut_ins,
            catalog_cycles = self.catalog.cycles_completed(),
            "Campaign finished"
        );
        Ok(summary)
    }

    // ========================================================================
    // Snapshot Validation
    // ========================================================================

    fn read_aggressor(&self) -> Result<VehicleTelemetry, SimulationError> {
        let telemetry = self.substrate.aggressor()?;
        telemetry
            .kinematics
            .validate()
            .map_err(|source| SimulationError::ContractViolation {
                vehicle: "aggressor",
                source,
            })?;
        Ok(telemetry)
    }

    fn read_target(&self) -> Result<VehicleTelemetry, SimulationError> {
        let telemetry = self.substrate.target()?;
        telemetry
            .kinematics
            .validate()
            .map_err(|source| SimulationError::ContractViolation {
                vehicle: "target",
                source,
            })?;
        Ok(telemetry)
    }
}
