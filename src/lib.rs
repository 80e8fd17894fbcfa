use pyo3::prelude::*;
use walkshed_core::{Error, WalkingSpeed};

use isochrone::{calculate_bulk_isochrones, calculate_isochrone};
use network::{PyStreetNetwork, create_street_network, nearest_node, reachable_nodes};

pub mod isochrone;
pub mod network;

/// A Python module implemented in Rust.
#[pymodule]
fn walkshed(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyStreetNetwork>()?;
    m.add_function(wrap_pyfunction!(create_street_network, m)?)?;
    m.add_function(wrap_pyfunction!(nearest_node, m)?)?;
    m.add_function(wrap_pyfunction!(reachable_nodes, m)?)?;

    m.add_function(wrap_pyfunction!(calculate_isochrone, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_bulk_isochrones, m)?)?;
    Ok(())
}

pub(crate) fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::IoError(e) => PyErr::new::<pyo3::exceptions::PyOSError, _>(e.to_string()),
        Error::InvalidSpeed(_)
        | Error::InvalidBudget(_)
        | Error::InvalidData(_)
        | Error::SnapTooFar { .. }
        | Error::GeoJsonError(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
        }
        Error::EmptyGraph | Error::UnknownSource | Error::EmptyReachableSet => {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
        }
    }
}

/// Walking speed in meters per minute, 3 mph when not given
pub(crate) fn walking_speed(speed: Option<f64>) -> PyResult<WalkingSpeed> {
    speed.map_or_else(
        || Ok(WalkingSpeed::default()),
        |speed| WalkingSpeed::from_meters_per_minute(speed).map_err(to_py_err),
    )
}

#[cfg(feature = "stubgen")]
pyo3_stub_gen::define_stub_info_gatherer!(stub_info);
