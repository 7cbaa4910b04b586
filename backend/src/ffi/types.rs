//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and Python dicts.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::{ScenarioRecord, VehicleKinematics};
use crate::orchestrator::{EpisodeSummary, TickResult};
use crate::sink::StepRecord;
use crate::substrate::{InitialPlacement, VehicleTelemetry};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with clear error messages.
///
/// # Errors
/// Returns PyValueError if the field is missing; conversion errors are
/// passed through.
///
/// # Example
/// ```ignore
/// let speed: f64 = extract_required(&py_dict, "speed")?;
/// ```
pub(crate) fn extract_required<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract a field, falling back to `default` when missing.
pub(crate) fn extract_with_default<'py, T>(
    dict: &Bound<'py, PyDict>,
    key: &str,
    default: T,
) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

// ========================================================================
// Python → Rust
// ========================================================================

/// Parse a vehicle snapshot dict
///
/// Keys: `position_x`, `position_y`, `speed`, `heading`, `lane_index`.
/// Non-finite values are rejected.
pub fn kinematics_from_py(dict: &Bound<'_, PyDict>) -> PyResult<VehicleKinematics> {
    VehicleKinematics::try_new(
        extract_required(dict, "position_x")?,
        extract_required(dict, "position_y")?,
        extract_required(dict, "speed")?,
        extract_required(dict, "heading")?,
        extract_required(dict, "lane_index")?,
    )
    .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Parse a telemetry dict: a snapshot plus optional `crashed`,
/// `acceleration` and `steering` (radians)
pub fn telemetry_from_py(dict: &Bound<'_, PyDict>) -> PyResult<VehicleTelemetry> {
    Ok(VehicleTelemetry {
        kinematics: kinematics_from_py(dict)?,
        crashed: extract_with_default(dict, "crashed", false)?,
        acceleration: extract_with_default(dict, "acceleration", 0.0)?,
        steering: extract_with_default(dict, "steering", 0.0)?,
    })
}

// ========================================================================
// Rust → Python
// ========================================================================

pub fn scenario_to_py(py: Python<'_>, record: &ScenarioRecord) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("initial_gap", record.initial_gap())?;
    dict.set_item("aggressor_speed", record.aggressor_speed())?;
    dict.set_item("target_speed", record.target_speed())?;
    dict.set_item("lane_offset", record.lane_offset())?;
    Ok(dict.unbind())
}

pub fn placement_to_py(py: Python<'_>, placement: &InitialPlacement) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("aggressor_speed", placement.aggressor_speed)?;
    dict.set_item("target_speed", placement.target_speed)?;
    dict.set_item("aggressor_lane", placement.aggressor_lane)?;
    dict.set_item("target_lane", placement.target_lane)?;
    Ok(dict.unbind())
}

pub fn step_record_to_py(py: Python<'_>, record: &StepRecord) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("episode", record.episode)?;
    dict.set_item("step", record.step)?;
    dict.set_item("bv_x", record.bv_x)?;
    dict.set_item("bv_y", record.bv_y)?;
    dict.set_item("bv_speed", record.bv_speed)?;
    dict.set_item("bv_heading", record.bv_heading)?;
    dict.set_item("bv_acceleration", record.bv_acceleration)?;
    dict.set_item("bv_steering", record.bv_steering)?;
    dict.set_item("av_x", record.av_x)?;
    dict.set_item("av_y", record.av_y)?;
    dict.set_item("av_speed", record.av_speed)?;
    dict.set_item("ttc_lon", record.ttc_lon)?;
    dict.set_item("crash", record.crash)?;
    dict.set_item("distance", record.distance)?;
    Ok(dict.unbind())
}

pub fn episode_summary_to_py(py: Python<'_>, summary: &EpisodeSummary) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("episode", summary.episode)?;
    dict.set_item("catalog_index", summary.catalog_index)?;
    dict.set_item("scenario", scenario_to_py(py, &summary.scenario)?)?;
    dict.set_item("steps", summary.steps)?;
    dict.set_item("end_reason", format!("{:?}", summary.end_reason))?;
    dict.set_item("final_phase", summary.final_phase.map(|p| p.name()))?;
    dict.set_item("collided", summary.safety.collided())?;
    dict.set_item("first_collision_step", summary.safety.first_collision_step)?;
    dict.set_item("min_ttc", summary.safety.min_ttc)?;
    dict.set_item("min_separation", summary.safety.min_separation)?;
    Ok(dict.unbind())
}

pub fn tick_result_to_py(py: Python<'_>, result: &TickResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("episode", result.episode)?;
    dict.set_item("step", result.step)?;
    dict.set_item("command", result.command.code())?;
    dict.set_item("command_name", result.command.name())?;
    dict.set_item("phase", result.phase.map(|p| p.name()))?;
    dict.set_item("reward", result.outcome.reward)?;
    dict.set_item("terminated", result.outcome.terminated)?;
    dict.set_item("truncated", result.outcome.truncated)?;
    dict.set_item("record", step_record_to_py(py, &result.record)?)?;
    match &result.ended {
        Some(summary) => dict.set_item("ended", episode_summary_to_py(py, summary)?)?,
        None => dict.set_item("ended", py.None())?,
    }
    Ok(dict.unbind())
}
