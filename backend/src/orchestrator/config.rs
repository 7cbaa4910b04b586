//! Campaign configuration loaded from JSON

use crate::catalog::ScenarioCatalog;
use crate::controller::ControllerConfig;
use crate::orchestrator::engine::{OrchestratorConfig, SimulationError};
use crate::sink::{new_run_id, CsvStepLog};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Everything needed to set up a campaign
///
/// ```json
/// {
///   "scenario_path": "output/merged_all_scenarios.csv",
///   "episodes": 748,
///   "controller": { "type": "cut_in", "max_speed": 36.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Scenario catalog CSV
    pub scenario_path: PathBuf,

    /// Episodes to run; `None` runs one full catalog cycle
    #[serde(default)]
    pub episodes: Option<usize>,

    #[serde(default = "CampaignConfig::default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "OrchestratorConfig::default_max_steps")]
    pub max_steps_per_episode: usize,

    #[serde(default)]
    pub controller: ControllerConfig,
}

impl CampaignConfig {
    pub fn default_log_dir() -> PathBuf {
        PathBuf::from("output/cutin_fsm_testing_logs")
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::InvalidConfig(format!("Campaign config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SimulationError::InvalidConfig(format!(
                "Cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.max_steps_per_episode == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_steps_per_episode must be positive".to_string(),
            ));
        }
        self.controller
            .build()
            .map(|_| ())
            .map_err(SimulationError::InvalidConfig)
    }

    /// The part of the config the orchestrator itself consumes
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_steps_per_episode: self.max_steps_per_episode,
            controller: self.controller.clone(),
        }
    }

    pub fn load_catalog(&self) -> Result<ScenarioCatalog, SimulationError> {
        Ok(ScenarioCatalog::load(&self.scenario_path)?)
    }

    /// Episode count, falling back to one pass over the catalog
    pub fn episode_count(&self, catalog: &ScenarioCatalog) -> usize {
        self.episodes.unwrap_or(catalog.len())
    }

    /// Open a fresh step log under `log_dir` with a random run id
    ///
    /// Returns the sink, its path and the run id.
    pub fn open_step_log(&self) -> Result<(CsvStepLog<File>, PathBuf, String), SimulationError> {
        let run_id = new_run_id();
        let (sink, path) = CsvStepLog::in_run_directory(&self.log_dir, &run_id)?;
        Ok((sink, path, run_id))
    }
}
