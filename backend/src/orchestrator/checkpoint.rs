//! Checkpoint - Save/Resume Campaign Position
//!
//! A long campaign (one episode per catalog row, often several cycles) can be
//! stopped between episodes and resumed later against the same catalog and
//! config.
//!
//! # Critical Invariants
//!
//! - **Between episodes only**: no checkpoint while an episode is running
//! - **Catalog Matching**: resume requires the same catalog fingerprint
//! - **Config Matching**: resume requires the same config hash
//! - **Forward only**: a catalog cannot be rewound to an earlier position

use crate::orchestrator::engine::{Orchestrator, SimulationError};
use crate::sink::LogSink;
use crate::substrate::Substrate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Campaign position snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCheckpoint {
    /// Index the next episode will get
    pub next_episode: usize,

    /// Total scenario draws made so far
    pub catalog_draws: usize,

    /// SHA256 of the catalog contents
    pub catalog_fingerprint: String,

    /// SHA256 of the orchestrator config
    pub config_hash: String,
}

impl CampaignCheckpoint {
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SimulationError::SerializationError(format!("Checkpoint serialization failed: {}", e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| {
            SimulationError::SerializationError(format!("Checkpoint parse failed: {}", e))
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).map_err(|e| {
            SimulationError::SerializationError(format!(
                "Failed to write checkpoint {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SimulationError::SerializationError(format!(
                "Failed to read checkpoint {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

/// Compute SHA256 hash of config for validation
///
/// Keys are sorted before hashing so field order never changes the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl<S: Substrate, L: LogSink> Orchestrator<S, L> {
    /// Snapshot the campaign position
    ///
    /// # Errors
    ///
    /// `SimulationError::EpisodeInProgress` if an episode is running.
    pub fn checkpoint(&self) -> Result<CampaignCheckpoint, SimulationError> {
        if let Some(episode) = self.current_episode() {
            return Err(SimulationError::EpisodeInProgress(episode));
        }
        Ok(CampaignCheckpoint {
            next_episode: self.episodes_started(),
            catalog_draws: self.catalog().draws(),
            catalog_fingerprint: self.catalog().fingerprint().to_string(),
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Move this orchestrator to a checkpointed position
    ///
    /// The catalog cursor and cycle counter are computed from the draw
    /// count, so they come out the same as in an uninterrupted run.
    pub fn restore(&mut self, checkpoint: &CampaignCheckpoint) -> Result<(), SimulationError> {
        if let Some(episode) = self.current_episode() {
            return Err(SimulationError::EpisodeInProgress(episode));
        }

        let fingerprint = self.catalog().fingerprint().to_string();
        if fingerprint != checkpoint.catalog_fingerprint {
            return Err(SimulationError::CheckpointMismatch(format!(
                "catalog fingerprint {} does not match checkpoint {}",
                fingerprint, checkpoint.catalog_fingerprint
            )));
        }

        let config_hash = compute_config_hash(self.config())?;
        if config_hash != checkpoint.config_hash {
            return Err(SimulationError::CheckpointMismatch(format!(
                "config hash {} does not match checkpoint {}",
                config_hash, checkpoint.config_hash
            )));
        }

        let draws = self.catalog().draws();
        if draws > checkpoint.catalog_draws {
            return Err(SimulationError::CheckpointMismatch(format!(
                "catalog already at draw {}, checkpoint is at draw {}",
                draws, checkpoint.catalog_draws
            )));
        }

        self.catalog_mut().seek(checkpoint.catalog_draws);
        self.clock_mut().resume_at(checkpoint.next_episode);

        info!(
            next_episode = checkpoint.next_episode,
            catalog_draws = checkpoint.catalog_draws,
            "Campaign restored from checkpoint"
        );
        Ok(())
    }
}
