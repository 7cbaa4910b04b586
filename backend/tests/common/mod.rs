//! Shared test doubles for integration tests

#![allow(dead_code)]

use cut_in_simulator_core_rs::catalog::ScenarioCatalog;
use cut_in_simulator_core_rs::metrics::VEHICLE_LENGTH;
use cut_in_simulator_core_rs::models::{Command, ScenarioRecord, VehicleKinematics};
use cut_in_simulator_core_rs::substrate::{
    InitialPlacement, StepOutcome, Substrate, SubstrateError, VehicleTelemetry,
};

pub const LANE_WIDTH: f64 = 4.0;
pub const SPEED_STEP: f64 = 2.0;

/// One-second point-mass highway
///
/// Each step applies the command first (speed ±2 m/s, or an instant lane
/// change), then moves both vehicles by `speed * 1 s`. The aggressor crashes
/// when it shares the target's lane within one vehicle length.
#[derive(Debug, Default)]
pub struct PointMassSubstrate {
    aggressor: Option<VehicleTelemetry>,
    target: Option<VehicleTelemetry>,
    pub commands: Vec<Command>,
    pub placements: Vec<InitialPlacement>,
    pub target_positions: Vec<f64>,
    pub closes: usize,
    /// Fail the Nth `step` call (1-based, counted across episodes)
    pub fail_on_step: Option<usize>,
    steps: usize,
}

impl PointMassSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_step(n: usize) -> Self {
        Self {
            fail_on_step: Some(n),
            ..Self::default()
        }
    }
}

fn vehicle(x: f64, speed: f64, lane: i32) -> VehicleTelemetry {
    let lane = f64::from(lane);
    VehicleTelemetry::new(VehicleKinematics::new(x, lane * LANE_WIDTH, speed, 0.0, lane))
}

impl Substrate for PointMassSubstrate {
    fn reset(&mut self, placement: &InitialPlacement) -> Result<(), SubstrateError> {
        self.placements.push(*placement);
        self.aggressor = Some(vehicle(0.0, placement.aggressor_speed, placement.aggressor_lane));
        self.target = Some(vehicle(0.0, placement.target_speed, placement.target_lane));
        Ok(())
    }

    fn place_target(&mut self, position_x: f64) -> Result<(), SubstrateError> {
        let target = self.target.as_mut().ok_or(SubstrateError::NotRunning)?;
        target.kinematics.position_x = position_x;
        self.target_positions.push(position_x);
        Ok(())
    }

    fn step(&mut self, command: Command) -> Result<StepOutcome, SubstrateError> {
        self.steps += 1;
        if self.fail_on_step == Some(self.steps) {
            return Err(SubstrateError::Step("host exploded".to_string()));
        }
        self.commands.push(command);

        let (Some(bv), Some(av)) = (self.aggressor.as_mut(), self.target.as_mut()) else {
            return Err(SubstrateError::NotRunning);
        };

        let k = &mut bv.kinematics;
        match command {
            Command::Faster => k.speed += SPEED_STEP,
            Command::Slower => k.speed = (k.speed - SPEED_STEP).max(0.0),
            Command::LaneLeft => k.lane_index -= 1.0,
            Command::LaneRight => k.lane_index += 1.0,
            Command::Idle => {}
        }
        k.position_y = k.lane_index * LANE_WIDTH;
        k.position_x += k.speed;
        av.kinematics.position_x += av.kinematics.speed;

        let same_lane = bv.kinematics.lane_index == av.kinematics.lane_index;
        let gap = (av.kinematics.position_x - bv.kinematics.position_x).abs();
        bv.crashed = same_lane && gap < VEHICLE_LENGTH;

        Ok(StepOutcome {
            reward: 0.0,
            terminated: bv.crashed,
            truncated: false,
        })
    }

    fn aggressor(&self) -> Result<VehicleTelemetry, SubstrateError> {
        self.aggressor.ok_or(SubstrateError::NotRunning)
    }

    fn target(&self) -> Result<VehicleTelemetry, SubstrateError> {
        self.target.ok_or(SubstrateError::NotRunning)
    }

    fn close(&mut self) {
        self.closes += 1;
        self.aggressor = None;
        self.target = None;
    }
}

/// The 30 / 25 / +50 m cut-in from the right-hand lane
pub fn cut_in_record() -> ScenarioRecord {
    ScenarioRecord::new(50.0, 30.0, 25.0, 1)
}

/// Same-lane start 8 m behind a slow target; collides on the first step
pub fn rear_end_record() -> ScenarioRecord {
    ScenarioRecord::new(8.0, 20.0, 10.0, 0)
}

pub fn catalog_of(records: Vec<ScenarioRecord>) -> ScenarioCatalog {
    ScenarioCatalog::from_records(records).expect("non-empty catalog")
}

pub fn catalog_csv(rows: &[(f64, f64, f64, i32)]) -> String {
    let mut csv = String::from("x_diff_abs,xVelocity_cut_in,xVelocity_target,adjusted_laneId_diff\n");
    for (gap, bv, av, offset) in rows {
        csv.push_str(&format!("{},{},{},{}\n", gap, bv, av, offset));
    }
    csv
}
