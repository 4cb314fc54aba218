// core/src/py/mod.rs
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::api::{self, ApiError};
use crate::metrics::Metrics;

fn to_py_err(e: ApiError) -> PyErr {
    if e.is_internal() {
        PyRuntimeError::new_err(e.message)
    } else {
        PyValueError::new_err(e.message)
    }
}

/// Python handle on the engine. Owns the operation counters.
#[pyclass]
pub struct TrackEngine {
    metrics: Metrics,
}

#[pymethods]
impl TrackEngine {
    #[new]
    fn new() -> PyResult<Self> {
        let metrics = Metrics::new().map_err(|e| PyRuntimeError::new_err(format!("metrics init: {e}")))?;
        Ok(Self { metrics })
    }

    fn analyze_track(&self, json_in: &str) -> PyResult<String> {
        api::analyze_track_json(json_in, &self.metrics).map_err(to_py_err)
    }

    fn detect_climbs(&self, json_in: &str) -> PyResult<String> {
        api::detect_climbs_json(json_in, &self.metrics).map_err(to_py_err)
    }

    fn aid_station_table(&self, json_in: &str) -> PyResult<String> {
        api::aid_station_table_json(json_in, &self.metrics).map_err(to_py_err)
    }

    fn merge_tracks(&self, json_in: &str) -> PyResult<String> {
        api::merge_tracks_json(json_in, &self.metrics).map_err(to_py_err)
    }

    fn recover_race(&self, json_in: &str) -> PyResult<String> {
        api::recover_race_json(json_in, &self.metrics).map_err(to_py_err)
    }

    /// Prometheus text exposition.
    fn metrics(&self) -> PyResult<String> {
        self.metrics.render().map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

/// "HH:MM:SS" / "MM:SS" → seconds.
#[pyfunction]
fn parse_duration_seconds(s: &str) -> PyResult<i64> {
    crate::recovery::parse_duration(s)
        .map(|d| d.num_seconds())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn gpxify_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<TrackEngine>()?;
    m.add_function(wrap_pyfunction!(parse_duration_seconds, m)?)?;
    Ok(())
}
