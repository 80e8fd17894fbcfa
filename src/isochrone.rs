use geo::Geometry;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use walkshed_core::prelude::*;
use wkt::{ToWkt, TryFromWkt};

#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::gen_stub_pyfunction;

use crate::network::PyStreetNetwork;
use crate::{to_py_err, walking_speed};

/// Walking isochrone around ``(x, y)`` as WKT
///
/// Parameters
/// ----------
/// network : StreetNetwork
/// x, y : float
///     Query location in the network's coordinates
/// walk_time : float
///     Time budget in minutes
/// speed : float, optional
///     Walking speed in meters per minute, 3 mph when omitted
/// clip_wkt : str, optional
///     Polygon or multipolygon the isochrone is trimmed to, e.g. a landmass
///
/// Returns
/// -------
/// str or None
///     ``MULTIPOLYGON`` WKT, or None when fewer than three distinct
///     positions are reachable or nothing is left after clipping
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (network, x, y, walk_time, speed = None, clip_wkt = None))]
pub fn calculate_isochrone(
    py: Python<'_>,
    network: &PyStreetNetwork,
    x: f64,
    y: f64,
    walk_time: f64,
    speed: Option<f64>,
    clip_wkt: Option<&str>,
) -> PyResult<Option<String>> {
    let request = build_request(vec![walk_time], speed, clip_wkt)?;
    let point = QueryPoint::new("point", x, y);

    py.detach(|| {
        let isochrone = walkshed_core::algo::calculate_isochrone(
            &network.inner,
            &point,
            walk_time,
            &request,
        )
        .map_err(|e| to_py_err(e.source))?;

        Ok(match isochrone.shape {
            IsochroneShape::Area(polygons) => Some(polygons.to_wkt().to_string()),
            IsochroneShape::Degenerate(_) | IsochroneShape::Empty => None,
        })
    })
}

/// Isochrones for many points and budgets, computed in parallel
///
/// Parameters
/// ----------
/// network : StreetNetwork
/// points : list[tuple[str, float, float]]
///     ``(id, x, y)`` of every query location
/// budgets : list[float]
///     Time budgets in minutes, applied to every point
/// speed : float, optional
///     Walking speed in meters per minute
/// clip_wkt : str, optional
///     Polygon or multipolygon all isochrones are trimmed to
///
/// Returns
/// -------
/// list[dict]
///     One record per point and budget with ``point_id``, ``budget_minutes``,
///     ``status`` (``area``, ``degenerate``, ``empty`` or ``failed``),
///     ``geometry`` (WKT or None), ``reached_nodes`` and ``error``.
///     A failed record does not abort the other calculations.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (network, points, budgets, speed = None, clip_wkt = None))]
#[allow(clippy::needless_pass_by_value)]
pub fn calculate_bulk_isochrones<'py>(
    py: Python<'py>,
    network: &PyStreetNetwork,
    points: Vec<(String, f64, f64)>,
    budgets: Vec<f64>,
    speed: Option<f64>,
    clip_wkt: Option<&str>,
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let request = build_request(budgets, speed, clip_wkt)?;
    let points: Vec<QueryPoint> = points
        .into_iter()
        .map(|(id, x, y)| QueryPoint::new(id, x, y))
        .collect();

    let records = py.detach(|| bulk_isochrones(&network.inner, &points, &request));

    records
        .iter()
        .map(|record| record_to_dict(py, record))
        .collect()
}

fn record_to_dict<'py>(py: Python<'py>, record: &IsochroneRecord) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("point_id", &record.point_id)?;
    dict.set_item("budget_minutes", record.budget)?;

    match &record.outcome {
        Ok(isochrone) => {
            let (status, geometry) = match &isochrone.shape {
                IsochroneShape::Area(polygons) => ("area", Some(polygons.to_wkt().to_string())),
                IsochroneShape::Degenerate(DegenerateHull::Point(point)) => {
                    ("degenerate", Some(point.to_wkt().to_string()))
                }
                IsochroneShape::Degenerate(DegenerateHull::Segment(line)) => {
                    ("degenerate", Some(line.to_wkt().to_string()))
                }
                IsochroneShape::Empty => ("empty", None),
            };
            dict.set_item("status", status)?;
            dict.set_item("geometry", geometry)?;
            dict.set_item("source_node", isochrone.source_node.0)?;
            dict.set_item("snap_distance", isochrone.snap_distance)?;
            dict.set_item("reached_nodes", isochrone.reached_nodes)?;
            dict.set_item("error", py.None())?;
        }
        Err(e) => {
            dict.set_item("status", "failed")?;
            dict.set_item("geometry", py.None())?;
            dict.set_item("reached_nodes", 0)?;
            dict.set_item("error", e.source.to_string())?;
        }
    }
    Ok(dict)
}

fn build_request(
    budgets: Vec<f64>,
    speed: Option<f64>,
    clip_wkt: Option<&str>,
) -> PyResult<IsochroneRequest> {
    for &budget in &budgets {
        WalkBudget::new(budget, WalkingSpeed::default()).map_err(to_py_err)?;
    }
    let request = IsochroneRequest::new(budgets, walking_speed(speed)?);
    match clip_wkt {
        Some(text) => Ok(request.with_clip(parse_clip(text)?)),
        None => Ok(request),
    }
}

fn parse_clip(text: &str) -> PyResult<ClipBoundary> {
    let geometry = Geometry::<f64>::try_from_wkt_str(text).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Failed to parse clip WKT: {e}"))
    })?;
    match geometry {
        Geometry::Polygon(polygon) => Ok(ClipBoundary::from_polygon(polygon)),
        Geometry::MultiPolygon(polygons) => Ok(ClipBoundary::new(polygons)),
        _ => Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
            "Clip WKT must be a POLYGON or MULTIPOLYGON",
        )),
    }
}
