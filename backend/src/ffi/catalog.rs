//! PyO3 wrapper for the scenario catalog

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::scenario_to_py;
use crate::catalog::{CatalogError, ScenarioCatalog};

pub(crate) fn catalog_error_to_py(err: CatalogError) -> PyErr {
    if err.is_schema_error() {
        PyValueError::new_err(err.to_string())
    } else {
        PyIOError::new_err(err.to_string())
    }
}

/// Python wrapper for `ScenarioCatalog`
///
/// ```python
/// catalog = ScenarioCatalog("output/merged_all_scenarios.csv")
/// scenario = catalog.next()
/// print(scenario["initial_gap"], catalog.cursor, len(catalog))
/// ```
#[pyclass(name = "ScenarioCatalog")]
pub struct PyScenarioCatalog {
    pub(crate) inner: ScenarioCatalog,
}

#[pymethods]
impl PyScenarioCatalog {
    /// Load a catalog CSV
    ///
    /// Raises ValueError for schema problems and OSError when the file
    /// cannot be read.
    #[new]
    fn new(path: &str) -> PyResult<Self> {
        let inner = ScenarioCatalog::load(path).map_err(catalog_error_to_py)?;
        Ok(Self { inner })
    }

    /// Next record in round-robin order
    fn next(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let record = self.inner.next();
        scenario_to_py(py, &record)
    }

    fn get(&self, py: Python<'_>, index: usize) -> PyResult<Option<Py<PyDict>>> {
        self.inner
            .get(index)
            .map(|record| scenario_to_py(py, record))
            .transpose()
    }

    #[getter]
    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    #[getter]
    fn cycles_completed(&self) -> usize {
        self.inner.cycles_completed()
    }

    #[getter]
    fn fingerprint(&self) -> String {
        self.inner.fingerprint().to_string()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}
