//! PyO3 wrapper for Orchestrator
//!
//! The host simulator is a Python object; `PySubstrate` forwards the
//! `Substrate` calls to it.

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::catalog::PyScenarioCatalog;
use super::types::{episode_summary_to_py, placement_to_py, telemetry_from_py, tick_result_to_py};
use crate::models::Command;
use crate::orchestrator::{CampaignCheckpoint, Orchestrator, OrchestratorConfig};
use crate::sink::{StepRecord, StepSink};
use crate::substrate::{InitialPlacement, StepOutcome, Substrate, SubstrateError, VehicleTelemetry};
use std::path::{Path, PathBuf};

/// `Substrate` backed by a Python object
///
/// The object must provide:
/// - `reset(placement: dict)`
/// - `place_target(x: float)`
/// - `step(action: int) -> (reward, terminated, truncated)`
/// - `aggressor() -> dict` and `target() -> dict`
/// - `close()`
pub struct PySubstrate {
    env: Py<PyAny>,
}

impl PySubstrate {
    pub fn new(env: Py<PyAny>) -> Self {
        Self { env }
    }

    fn telemetry(&self, method: &str, vehicle: &'static str) -> Result<VehicleTelemetry, SubstrateError> {
        Python::with_gil(|py| {
            let value = self.env.bind(py).call_method0(method)?;
            let dict = value.downcast::<PyDict>()?;
            telemetry_from_py(dict)
        })
        .map_err(|e| SubstrateError::Telemetry {
            vehicle,
            reason: e.to_string(),
        })
    }
}

impl Substrate for PySubstrate {
    fn reset(&mut self, placement: &InitialPlacement) -> Result<(), SubstrateError> {
        Python::with_gil(|py| {
            let placement = placement_to_py(py, placement)?;
            self.env.bind(py).call_method1("reset", (placement,))?;
            Ok::<(), PyErr>(())
        })
        .map_err(|e| SubstrateError::Reset(e.to_string()))
    }

    fn place_target(&mut self, position_x: f64) -> Result<(), SubstrateError> {
        Python::with_gil(|py| {
            self.env.bind(py).call_method1("place_target", (position_x,))?;
            Ok::<(), PyErr>(())
        })
        .map_err(|e| SubstrateError::Reset(e.to_string()))
    }

    fn step(&mut self, command: Command) -> Result<StepOutcome, SubstrateError> {
        Python::with_gil(|py| {
            let (reward, terminated, truncated): (f64, bool, bool) = self
                .env
                .bind(py)
                .call_method1("step", (command.code(),))?
                .extract()?;
            Ok::<StepOutcome, PyErr>(StepOutcome {
                reward,
                terminated,
                truncated,
            })
        })
        .map_err(|e| SubstrateError::Step(e.to_string()))
    }

    fn aggressor(&self) -> Result<VehicleTelemetry, SubstrateError> {
        self.telemetry("aggressor", "aggressor")
    }

    fn target(&self) -> Result<VehicleTelemetry, SubstrateError> {
        self.telemetry("target", "target")
    }

    fn close(&mut self) {
        let result = Python::with_gil(|py| self.env.bind(py).call_method0("close").map(|_| ()));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Host close() failed");
        }
    }
}

fn runtime_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(format!("{}: {}", context, err))
}

/// Python wrapper for Rust Orchestrator
///
/// With `log_dir` the step rows are written to
/// `<log_dir>/testing_log_<run_id>/step_log_<run_id>.csv`. Without it they
/// are kept in memory and handed back through `step_log()`; pass
/// `clear=True` to drain them.
///
/// # Example (from Python)
///
/// ```python
/// from cut_in_simulator_core_rs import Orchestrator, ScenarioCatalog
///
/// catalog = ScenarioCatalog("output/merged_all_scenarios.csv")
/// orch = Orchestrator(
///     catalog,
///     HighwayHost(),
///     {"max_steps_per_episode": 400},
///     log_dir="output/cutin_fsm_testing_logs",
/// )
/// summary = orch.run_episode()
/// print(orch.log_path)
/// print(summary["end_reason"], summary["min_ttc"])
/// ```
#[pyclass(name = "Orchestrator", unsendable)]
pub struct PyOrchestrator {
    inner: Orchestrator<PySubstrate, StepSink>,
}

#[pymethods]
impl PyOrchestrator {
    /// Create an orchestrator around a Python host simulator
    ///
    /// `config` uses the same keys as the JSON orchestrator config; missing
    /// keys take their defaults. The catalog is copied.
    #[new]
    #[pyo3(signature = (catalog, env, config = None, log_dir = None))]
    fn new(
        catalog: &PyScenarioCatalog,
        env: Py<PyAny>,
        config: Option<&Bound<'_, PyDict>>,
        log_dir: Option<PathBuf>,
    ) -> PyResult<Self> {
        let config: OrchestratorConfig = match config {
            Some(dict) => {
                let json: String = dict
                    .py()
                    .import_bound("json")?
                    .call_method1("dumps", (dict,))?
                    .extract()?;
                serde_json::from_str(&json).map_err(|e| PyValueError::new_err(e.to_string()))?
            }
            None => OrchestratorConfig::default(),
        };

        let sink = StepSink::open(log_dir.as_deref())
            .map_err(|e| PyIOError::new_err(format!("Failed to open step log: {}", e)))?;

        let inner = Orchestrator::new(config, catalog.inner.clone(), PySubstrate::new(env), sink)
        .map_err(|e| runtime_error("Failed to create orchestrator", e))?;

        Ok(Self { inner })
    }

    /// Start the next episode; returns the scenario index
    fn start_episode(&mut self) -> PyResult<usize> {
        let start = self
            .inner
            .start_episode()
            .map_err(|e| runtime_error("Episode start failed", e))?;
        Ok(start.catalog_index)
    }

    /// One tick with the controller's command
    fn tick(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self
            .inner
            .tick()
            .map_err(|e| runtime_error("Tick execution failed", e))?;
        tick_result_to_py(py, &result)
    }

    /// One tick with an externally chosen action code
    fn tick_with_action(&mut self, py: Python<'_>, action: u8) -> PyResult<Py<PyDict>> {
        let command = Command::from_code(action)
            .ok_or_else(|| PyValueError::new_err(format!("Unknown action code {}", action)))?;
        let result = self
            .inner
            .tick_with_command(command)
            .map_err(|e| runtime_error("Tick execution failed", e))?;
        tick_result_to_py(py, &result)
    }

    fn run_episode(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let summary = self
            .inner
            .run_episode()
            .map_err(|e| runtime_error("Episode failed", e))?;
        episode_summary_to_py(py, &summary)
    }

    fn abort_episode(&mut self, py: Python<'_>) -> PyResult<Option<Py<PyDict>>> {
        let summary = self
            .inner
            .abort_episode()
            .map_err(|e| runtime_error("Abort failed", e))?;
        summary.map(|s| episode_summary_to_py(py, &s)).transpose()
    }

    #[getter]
    fn phase(&self) -> Option<&'static str> {
        self.inner.phase().map(|p| p.name())
    }

    #[getter]
    fn current_episode(&self) -> Option<usize> {
        self.inner.current_episode()
    }

    #[getter]
    fn current_step(&self) -> usize {
        self.inner.current_step()
    }

    /// Rows held in memory as dicts; empty when logging to disk
    #[pyo3(signature = (clear = false))]
    fn step_log(&mut self, py: Python<'_>, clear: bool) -> PyResult<Vec<Py<PyDict>>> {
        let to_py = |record: &StepRecord| super::types::step_record_to_py(py, record);
        if clear {
            self.inner.sink_mut().drain().iter().map(to_py).collect()
        } else {
            self.inner.sink().records().iter().map(to_py).collect()
        }
    }

    /// Step log file path, or None when rows are kept in memory
    #[getter]
    fn log_path(&self) -> Option<PathBuf> {
        self.inner.sink().path().map(Path::to_path_buf)
    }

    #[getter]
    fn run_id(&self) -> Option<String> {
        self.inner.sink().run_id().map(str::to_string)
    }

    /// Campaign position as a JSON string
    fn checkpoint(&self) -> PyResult<String> {
        self.inner
            .checkpoint()
            .and_then(|c| c.to_json())
            .map_err(|e| runtime_error("Checkpoint failed", e))
    }

    fn restore(&mut self, checkpoint_json: &str) -> PyResult<()> {
        let checkpoint = CampaignCheckpoint::from_json(checkpoint_json)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.inner
            .restore(&checkpoint)
            .map_err(|e| runtime_error("Restore failed", e))
    }
}
