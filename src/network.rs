use std::collections::BTreeMap;

use geo::Point;
use pyo3::prelude::*;
use rayon::prelude::*;
use walkshed_core::prelude::*;

#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::{to_py_err, walking_speed};

/// StreetNetwork
///
/// A walkable street graph merged from one or more regional networks, with
/// a spatial index over its nodes. Built once and shared read-only by all
/// isochrone calculations.
///
/// Example:
///
/// .. code-block:: python
///
///     network = create_street_network(["north.geojson", "south.geojson"])
///     isochrone = calculate_isochrone(network, 10.75, 59.91, 10.0)
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "StreetNetwork")]
pub struct PyStreetNetwork {
    pub(crate) inner: StreetGraph,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyStreetNetwork {
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of directed arcs, two-way streets count twice
    pub fn arc_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn component_count(&self) -> usize {
        self.inner.component_summary().0
    }

    pub fn coordinate_system(&self) -> String {
        match self.inner.coordinate_system() {
            CoordinateSystem::Geographic => "geographic".to_string(),
            CoordinateSystem::Planar => "planar".to_string(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "StreetNetwork with {} nodes and {} arcs ({})",
            self.inner.node_count(),
            self.inner.edge_count(),
            self.coordinate_system()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Create a street network from GeoJSON street exports
///
/// Each file holds the network of one region as osmnx-style node and edge
/// features. Regions are merged into a single graph: nodes sharing an
/// identifier or lying within ``tolerance`` of each other become one node.
///
/// Parameters
/// ----------
/// paths : list[str]
///     GeoJSON files, one per region
/// coordinate_system : str, default="geographic"
///     ``"geographic"`` for longitude/latitude with distances in meters,
///     ``"planar"`` for projected coordinates
/// tolerance : float, optional
///     Coordinate distance under which nodes of different regions merge
///
/// Returns
/// -------
/// StreetNetwork
///
/// Raises
/// ------
/// ValueError
///     If the coordinate system is unknown or the data is inconsistent
/// OSError
///     If a file cannot be read
///
/// Notes
/// -----
/// The function releases the GIL while reading and building the network.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (paths, coordinate_system = "geographic", tolerance = None))]
pub fn create_street_network(
    py: Python<'_>,
    paths: Vec<String>,
    coordinate_system: &str,
    tolerance: Option<f64>,
) -> PyResult<PyStreetNetwork> {
    let coordinate_system = parse_coordinate_system(coordinate_system)?;
    let options = GraphBuildOptions {
        coordinate_system,
        coalesce_tolerance: tolerance,
    };

    py.detach(|| {
        let regions = paths
            .par_iter()
            .map(|path| read_region_file(path, coordinate_system))
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_py_err)?;
        let graph = build_street_graph(regions, &options).map_err(to_py_err)?;
        Ok(PyStreetNetwork { inner: graph })
    })
}

/// Identifier of the street node closest to ``(x, y)``
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
pub fn nearest_node(network: &PyStreetNetwork, x: f64, y: f64) -> PyResult<u64> {
    nearest(&network.inner, x, y)
        .map(|id| id.0)
        .map_err(to_py_err)
}

/// Street nodes reachable on foot from ``(x, y)`` within ``walk_time`` minutes
///
/// The location is snapped to its nearest node first.
///
/// Returns
/// -------
/// dict[int, float]
///     Node identifier to shortest walking time in minutes
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (network, x, y, walk_time, speed = None))]
pub fn reachable_nodes(
    py: Python<'_>,
    network: &PyStreetNetwork,
    x: f64,
    y: f64,
    walk_time: f64,
    speed: Option<f64>,
) -> PyResult<BTreeMap<u64, f64>> {
    let budget = WalkBudget::new(walk_time, walking_speed(speed)?).map_err(to_py_err)?;

    py.detach(|| {
        let graph = &network.inner;
        let (source, _) = graph
            .nearest_node(&Point::new(x, y))
            .map_err(to_py_err)?;
        let reached = reachable(graph, source, budget).map_err(to_py_err)?;
        Ok(reached
            .by_id(graph)
            .into_iter()
            .map(|(id, time)| (id.0, time))
            .collect())
    })
}

fn parse_coordinate_system(name: &str) -> PyResult<CoordinateSystem> {
    match name.to_ascii_lowercase().as_str() {
        "geographic" => Ok(CoordinateSystem::Geographic),
        "planar" => Ok(CoordinateSystem::Planar),
        other => Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Unknown coordinate system '{other}', expected 'geographic' or 'planar'"
        ))),
    }
}
