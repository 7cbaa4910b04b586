//! Per-tick log records and the sinks that receive them
//!
//! One `StepRecord` is produced per simulated tick, after the substrate step,
//! from the updated vehicle pair. Sinks decide where the rows go; failures
//! propagate to the orchestrator caller.

use crate::metrics::{longitudinal_ttc, separation};
use crate::substrate::VehicleTelemetry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod csv_log;
pub mod memory;
pub mod step_sink;

pub use csv_log::{new_run_id, read_step_log, CsvStepLog};
pub use memory::MemorySink;
pub use step_sink::StepSink;

/// Errors raised while writing or reading step logs
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Step log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Step log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Column names of the step log, in order
pub const STEP_LOG_HEADER: [&str; 14] = [
    "episode",
    "step",
    "bv_x",
    "bv_y",
    "bv_speed",
    "bv_heading",
    "bv_acceleration",
    "bv_steering",
    "av_x",
    "av_y",
    "av_speed",
    "ttc_lon",
    "crash",
    "distance",
];

/// Marker written for an infinite time-to-collision
pub const INFINITE_TTC_MARKER: &str = "inf";

/// One row of the step log
///
/// Angles are stored in degrees, as logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    pub step: usize,
    pub bv_x: f64,
    pub bv_y: f64,
    pub bv_speed: f64,
    pub bv_heading: f64,
    pub bv_acceleration: f64,
    pub bv_steering: f64,
    pub av_x: f64,
    pub av_y: f64,
    pub av_speed: f64,
    pub ttc_lon: f64,
    pub crash: bool,
    pub distance: f64,
}

impl StepRecord {
    /// Build a row from the post-step telemetry, computing the safety metrics
    pub fn from_telemetry(
        episode: usize,
        step: usize,
        aggressor: &VehicleTelemetry,
        target: &VehicleTelemetry,
    ) -> Self {
        let bv = &aggressor.kinematics;
        let av = &target.kinematics;
        Self {
            episode,
            step,
            bv_x: bv.position_x,
            bv_y: bv.position_y,
            bv_speed: bv.speed,
            bv_heading: bv.heading.to_degrees(),
            bv_acceleration: aggressor.acceleration,
            bv_steering: aggressor.steering.to_degrees(),
            av_x: av.position_x,
            av_y: av.position_y,
            av_speed: av.speed,
            ttc_lon: longitudinal_ttc(bv, av),
            crash: aggressor.crashed,
            distance: separation(bv, av),
        }
    }

    /// Text fields in `STEP_LOG_HEADER` order, numbers at 6 decimal places
    pub fn to_fields(&self) -> [String; 14] {
        [
            self.episode.to_string(),
            self.step.to_string(),
            fixed(self.bv_x),
            fixed(self.bv_y),
            fixed(self.bv_speed),
            fixed(self.bv_heading),
            fixed(self.bv_acceleration),
            fixed(self.bv_steering),
            fixed(self.av_x),
            fixed(self.av_y),
            fixed(self.av_speed),
            format_ttc(self.ttc_lon),
            self.crash.to_string(),
            fixed(self.distance),
        ]
    }
}

fn fixed(value: f64) -> String {
    format!("{:.6}", value)
}

/// Format a TTC value the way the step log stores it
///
/// ```
/// use cut_in_simulator_core_rs::sink::format_ttc;
///
/// assert_eq!(format_ttc(2.5), "2.500000");
/// assert_eq!(format_ttc(f64::INFINITY), "inf");
/// ```
pub fn format_ttc(ttc: f64) -> String {
    if ttc == f64::INFINITY {
        INFINITE_TTC_MARKER.to_string()
    } else {
        fixed(ttc)
    }
}

/// Destination for per-tick records
pub trait LogSink {
    fn record(&mut self, record: &StepRecord) -> Result<(), SinkError>;

    /// Push buffered rows to the underlying storage
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        (**self).record(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
