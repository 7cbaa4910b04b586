//! Event logging for campaign replay and auditing.
//!
//! The orchestrator records every significant change during a campaign:
//! - **Episode**: episode started (with its scenario) or ended (with a reason)
//! - **Catalog**: the scenario cursor wrapped and a new cycle began
//! - **Controller**: phase transitions and lane-change issuance
//! - **Safety**: the aggressor reported a collision
//!
//! Events are kept in memory in the order they occur. Two campaigns run over
//! the same catalog against a deterministic substrate produce identical logs.
//!
//! # Example
//!
//! ```rust
//! use cut_in_simulator_core_rs::models::{Event, EventLog};
//! use cut_in_simulator_core_rs::controller::Phase;
//!
//! let mut log = EventLog::new();
//! log.log(Event::PhaseTransition {
//!     episode: 0,
//!     step: 12,
//!     from: Phase::Accelerating,
//!     to: Phase::Overtaking,
//! });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.events()[0].event_type(), "PhaseTransition");
//! ```

use crate::controller::Phase;
use crate::models::{Command, ScenarioRecord};
use serde::{Deserialize, Serialize};

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEndReason {
    /// Substrate reported a terminal state (collision, off-road, ...)
    Terminated,
    /// Substrate reported time-limit truncation
    Truncated,
    /// Orchestrator's own step budget ran out
    MaxSteps,
    /// Caller stopped the episode before any end signal
    Aborted,
}

/// Campaign event capturing a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A scenario was drawn and the substrate placed
    EpisodeStarted {
        episode: usize,
        catalog_index: usize,
        scenario: ScenarioRecord,
    },

    /// The episode's scenario is record 0 of a new pass over the catalog
    CatalogCycleRestarted { episode: usize, cycles_completed: usize },

    /// Controller moved to a later phase
    PhaseTransition {
        episode: usize,
        step: usize,
        from: Phase,
        to: Phase,
    },

    /// Controller issued its one lateral command for this cut-in
    LaneChangeIssued {
        episode: usize,
        step: usize,
        command: Command,
    },

    /// Aggressor crash flag went up
    Collision { episode: usize, step: usize },

    EpisodeEnded {
        episode: usize,
        steps: usize,
        reason: EpisodeEndReason,
    },
}

impl Event {
    /// Episode the event belongs to
    pub fn episode(&self) -> usize {
        match self {
            Event::EpisodeStarted { episode, .. } => *episode,
            Event::CatalogCycleRestarted { episode, .. } => *episode,
            Event::PhaseTransition { episode, .. } => *episode,
            Event::LaneChangeIssued { episode, .. } => *episode,
            Event::Collision { episode, .. } => *episode,
            Event::EpisodeEnded { episode, .. } => *episode,
        }
    }

    /// Step within the episode, for events raised by a tick
    pub fn step(&self) -> Option<usize> {
        match self {
            Event::PhaseTransition { step, .. }
            | Event::LaneChangeIssued { step, .. }
            | Event::Collision { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Variant name (for filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::EpisodeStarted { .. } => "EpisodeStarted",
            Event::CatalogCycleRestarted { .. } => "CatalogCycleRestarted",
            Event::PhaseTransition { .. } => "PhaseTransition",
            Event::LaneChangeIssued { .. } => "LaneChangeIssued",
            Event::Collision { .. } => "Collision",
            Event::EpisodeEnded { .. } => "EpisodeEnded",
        }
    }
}

/// Append-only in-memory event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events raised during one episode
    pub fn events_for_episode(&self, episode: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.episode() == episode).collect()
    }

    /// Events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Phases visited in an episode, in order, starting from Accelerating
    pub fn phase_trace(&self, episode: usize) -> Vec<Phase> {
        let mut trace = vec![Phase::Accelerating];
        for event in &self.events {
            if let Event::PhaseTransition { episode: e, to, .. } = event {
                if *e == episode {
                    trace.push(*to);
                }
            }
        }
        trace
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
