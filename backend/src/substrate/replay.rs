//! Replay substrate: plays back recorded telemetry frames
//!
//! Commands do not influence the playback. This makes it possible to run
//! the controller and metrics against recorded trajectories (or hand-built
//! traces in tests) without a live simulator.

use super::{InitialPlacement, StepOutcome, Substrate, SubstrateError, VehicleTelemetry};
use crate::models::Command;

/// One recorded tick: aggressor then target
pub type Frame = (VehicleTelemetry, VehicleTelemetry);

/// Substrate that replays a fixed frame sequence
///
/// Frame 0 is the state right after `reset`; each `step` moves to the next
/// frame. The step that reaches the final frame reports `truncated`, and a
/// crashed aggressor reports `terminated`.
#[derive(Debug, Clone)]
pub struct ReplaySubstrate {
    frames: Vec<Frame>,
    position: Option<usize>,
    /// Added to every recorded target x after `place_target`
    target_shift: f64,
    commands: Vec<Command>,
    placements: Vec<InitialPlacement>,
    closes: usize,
}

impl ReplaySubstrate {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            position: None,
            target_shift: 0.0,
            commands: Vec::new(),
            placements: Vec::new(),
            closes: 0,
        }
    }

    /// Commands received, across all episodes
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Placements requested, one per reset
    pub fn placements(&self) -> &[InitialPlacement] {
        &self.placements
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    fn frame(&self) -> Option<&Frame> {
        self.position.and_then(|i| self.frames.get(i))
    }
}

impl Substrate for ReplaySubstrate {
    fn reset(&mut self, placement: &InitialPlacement) -> Result<(), SubstrateError> {
        if self.frames.is_empty() {
            return Err(SubstrateError::Reset("no frames to replay".to_string()));
        }
        self.placements.push(*placement);
        self.position = Some(0);
        self.target_shift = 0.0;
        Ok(())
    }

    fn place_target(&mut self, position_x: f64) -> Result<(), SubstrateError> {
        let recorded_x = self
            .frames
            .first()
            .map(|(_, target)| target.kinematics.position_x)
            .ok_or(SubstrateError::NotRunning)?;
        if self.position.is_none() {
            return Err(SubstrateError::NotRunning);
        }
        self.target_shift = position_x - recorded_x;
        Ok(())
    }

    fn step(&mut self, command: Command) -> Result<StepOutcome, SubstrateError> {
        let current = self.position.ok_or(SubstrateError::NotRunning)?;
        let next = current + 1;
        if next >= self.frames.len() {
            return Err(SubstrateError::Step(format!(
                "replay exhausted after {} frames",
                self.frames.len()
            )));
        }

        self.commands.push(command);
        self.position = Some(next);

        let (aggressor, _) = self.frames[next];
        Ok(StepOutcome {
            reward: 0.0,
            terminated: aggressor.crashed,
            truncated: next == self.frames.len() - 1,
        })
    }

    fn aggressor(&self) -> Result<VehicleTelemetry, SubstrateError> {
        self.frame()
            .map(|(aggressor, _)| *aggressor)
            .ok_or(SubstrateError::NotRunning)
    }

    fn target(&self) -> Result<VehicleTelemetry, SubstrateError> {
        let (_, mut target) = *self.frame().ok_or(SubstrateError::NotRunning)?;
        target.kinematics.position_x += self.target_shift;
        Ok(target)
    }

    fn close(&mut self) {
        self.position = None;
        self.closes += 1;
    }
}
