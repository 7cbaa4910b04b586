//! Orchestrator - campaign and episode loop
//!
//! Draws scenarios, drives the substrate with controller commands, logs one
//! row per tick and summarises each episode.
//!
//! See `engine.rs` for the loop itself.

pub mod checkpoint;
pub mod config;
pub mod engine;

pub use engine::{
    CampaignSummary, EpisodeStart, EpisodeSummary, Orchestrator, OrchestratorConfig,
    SimulationError, TickResult,
};

pub use checkpoint::{compute_config_hash, CampaignCheckpoint};
pub use config::CampaignConfig;
