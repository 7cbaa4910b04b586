//! Vehicle kinematic snapshots
//!
//! A snapshot is read from the substrate once per tick and has no identity
//! beyond that tick. The controller and the safety metrics consume pairs of
//! snapshots (aggressor, target) and never hold on to them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A snapshot field that cannot describe a real vehicle
#[derive(Debug, Error, PartialEq)]
pub enum KinematicsError {
    #[error("Non-finite {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Instantaneous kinematics of one vehicle
///
/// Positions are in road coordinates (x longitudinal, y lateral), heading is
/// in radians relative to the road axis, and `lane_index` is the numeric id of
/// the lane currently occupied.
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::VehicleKinematics;
///
/// let bv = VehicleKinematics::new(100.0, 4.0, 30.0, 0.0, 1.0);
/// assert!(bv.validate().is_ok());
/// assert_eq!(bv.longitudinal_speed(), 30.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleKinematics {
    pub position_x: f64,
    pub position_y: f64,
    pub speed: f64,
    pub heading: f64,
    pub lane_index: f64,
}

impl VehicleKinematics {
    pub fn new(position_x: f64, position_y: f64, speed: f64, heading: f64, lane_index: f64) -> Self {
        Self {
            position_x,
            position_y,
            speed,
            heading,
            lane_index,
        }
    }

    /// Build a snapshot, rejecting NaN or infinite fields
    pub fn try_new(
        position_x: f64,
        position_y: f64,
        speed: f64,
        heading: f64,
        lane_index: f64,
    ) -> Result<Self, KinematicsError> {
        let snapshot = Self::new(position_x, position_y, speed, heading, lane_index);
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check that every field is finite
    pub fn validate(&self) -> Result<(), KinematicsError> {
        let fields = [
            ("position_x", self.position_x),
            ("position_y", self.position_y),
            ("speed", self.speed),
            ("heading", self.heading),
            ("lane_index", self.lane_index),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(KinematicsError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Speed projected onto the road's longitudinal axis (unsigned)
    pub fn longitudinal_speed(&self) -> f64 {
        (self.speed * self.heading.cos()).abs()
    }
}
