//! PyO3 wrapper for the cut-in controller and safety metrics

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::kinematics_from_py;
use crate::controller::{CutInConfig, CutInController};
use crate::metrics;

/// Python wrapper for `CutInController`
///
/// # Example (from Python)
///
/// ```python
/// from cut_in_simulator_core_rs import CutInController
///
/// controller = CutInController(max_speed=36.0, overtake_distance=5.0)
/// bv = {"position_x": 0.0, "position_y": 8.0, "speed": 30.0, "heading": 0.0, "lane_index": 2.0}
/// av = {"position_x": 50.0, "position_y": 4.0, "speed": 25.0, "heading": 0.0, "lane_index": 1.0}
/// action = controller.get_action(bv, av)   # 3 == FASTER
/// print(controller.phase)                  # "accelerating"
/// ```
#[pyclass(name = "CutInController")]
pub struct PyCutInController {
    inner: CutInController,
}

#[pymethods]
impl PyCutInController {
    #[new]
    #[pyo3(signature = (max_speed = CutInConfig::default_max_speed(), overtake_distance = CutInConfig::default_overtake_distance()))]
    fn new(max_speed: f64, overtake_distance: f64) -> PyResult<Self> {
        let config = CutInConfig {
            max_speed,
            overtake_distance,
        };
        config.validate().map_err(PyValueError::new_err)?;
        Ok(Self {
            inner: CutInController::new(config),
        })
    }

    /// Update the phase and return the action code for this tick
    ///
    /// Codes: 0 LANE_LEFT, 1 IDLE, 2 LANE_RIGHT, 3 FASTER, 4 SLOWER.
    ///
    /// # Errors
    ///
    /// Raises ValueError if a snapshot dict is missing a field or holds a
    /// non-finite value.
    fn get_action(&mut self, bv: &Bound<'_, PyDict>, av: &Bound<'_, PyDict>) -> PyResult<u8> {
        let bv = kinematics_from_py(bv)?;
        let av = kinematics_from_py(av)?;
        Ok(self.inner.get_action(&bv, &av).code())
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    #[getter]
    fn phase(&self) -> &'static str {
        self.inner.phase().name()
    }

    #[getter]
    fn acceleration_complete(&self) -> bool {
        self.inner.acceleration_complete()
    }

    #[getter]
    fn lane_change_pending(&self) -> bool {
        self.inner.lane_change_pending()
    }

    #[getter]
    fn max_speed(&self) -> f64 {
        self.inner.config().max_speed
    }

    #[getter]
    fn overtake_distance(&self) -> f64 {
        self.inner.config().overtake_distance
    }

    fn __repr__(&self) -> String {
        format!(
            "CutInController(phase={}, max_speed={}, overtake_distance={})",
            self.inner.phase().name(),
            self.inner.config().max_speed,
            self.inner.config().overtake_distance
        )
    }
}

/// Longitudinal time-to-collision between two snapshot dicts
#[pyfunction]
pub fn longitudinal_ttc(bv: &Bound<'_, PyDict>, av: &Bound<'_, PyDict>) -> PyResult<f64> {
    Ok(metrics::longitudinal_ttc(
        &kinematics_from_py(bv)?,
        &kinematics_from_py(av)?,
    ))
}

/// Euclidean separation between two snapshot dicts
#[pyfunction]
pub fn separation(bv: &Bound<'_, PyDict>, av: &Bound<'_, PyDict>) -> PyResult<f64> {
    Ok(metrics::separation(
        &kinematics_from_py(bv)?,
        &kinematics_from_py(av)?,
    ))
}
