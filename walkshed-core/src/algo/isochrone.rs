//! Walking isochrones for query points.
//!
//! Each (point, budget) pair is an independent task: snap the point to the
//! street graph, expand the time-bounded search, take the convex hull of the
//! reached nodes and clip it. Tasks share the graph read-only and run in
//! parallel on the rayon pool.

use geo::{Centroid, Intersects, MultiPolygon, Point};
use log::{debug, trace, warn};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use super::clip::{ClipBoundary, Clipped, clip};
use super::hull::{DegenerateHull, Hull, boundary};
use crate::model::QueryPoint;
use crate::routing::{WalkBudget, reachable};
use crate::{Error, Minutes, NodeId, StreetGraph, TaskError, WalkingSpeed};

/// Final shape of one isochrone
#[derive(Debug, Clone, PartialEq)]
pub enum IsochroneShape {
    Area(MultiPolygon<f64>),
    /// Fewer than three distinct reached positions, nothing to fill
    Degenerate(DegenerateHull),
    /// Entirely outside the clip boundary
    Empty,
}

#[derive(Debug, Clone)]
pub struct Isochrone {
    pub point_id: String,
    pub budget: Minutes,
    /// Street node the point was snapped to
    pub source_node: NodeId,
    pub snap_distance: f64,
    pub reached_nodes: usize,
    pub shape: IsochroneShape,
}

impl Isochrone {
    pub fn is_plottable(&self) -> bool {
        matches!(self.shape, IsochroneShape::Area(_))
    }

    /// Representative point for labelling
    pub fn label_point(&self) -> Option<Point<f64>> {
        match &self.shape {
            IsochroneShape::Area(polygons) => polygons.centroid(),
            IsochroneShape::Degenerate(DegenerateHull::Point(point)) => Some(*point),
            IsochroneShape::Degenerate(DegenerateHull::Segment(line)) => Some(line.centroid()),
            IsochroneShape::Empty => None,
        }
    }
}

/// Settings shared by all tasks of a batch
#[derive(Debug, Clone)]
pub struct IsochroneRequest {
    pub budgets: Vec<Minutes>,
    pub speed: WalkingSpeed,
    pub clip: Option<ClipBoundary>,
    /// Points snapping farther than this (meters for geographic graphs) fail
    pub max_snap_distance: Option<f64>,
}

impl IsochroneRequest {
    pub fn new(budgets: Vec<Minutes>, speed: WalkingSpeed) -> Self {
        Self {
            budgets,
            speed,
            clip: None,
            max_snap_distance: None,
        }
    }

    #[must_use]
    pub fn with_clip(mut self, clip: ClipBoundary) -> Self {
        self.clip = Some(clip);
        self
    }

    #[must_use]
    pub fn with_max_snap_distance(mut self, distance: f64) -> Self {
        self.max_snap_distance = Some(distance);
        self
    }
}

/// Outcome of one (point, budget) task
#[derive(Debug)]
pub struct IsochroneRecord {
    pub point_id: String,
    pub budget: Minutes,
    pub outcome: Result<Isochrone, TaskError>,
}

/// Nearest street node to `point`, bounded by `max_distance` when given
pub fn snap_point(
    graph: &StreetGraph,
    point: &Point<f64>,
    max_distance: Option<f64>,
) -> Result<(NodeIndex, f64), Error> {
    let (node, distance) = graph.nearest_node(point)?;
    trace!("Snapped {point:?} to node {node:?} at distance {distance:.2}");

    match max_distance {
        Some(limit) if distance > limit => Err(Error::SnapTooFar { distance, limit }),
        _ => Ok((node, distance)),
    }
}

/// Isochrone of a single point for a single time budget
///
/// # Errors
///
/// Fails when the graph is empty, the point cannot be snapped within the
/// requested distance or the budget is invalid. Degenerate and empty
/// shapes are not errors.
pub fn calculate_isochrone(
    graph: &StreetGraph,
    point: &QueryPoint,
    budget: Minutes,
    request: &IsochroneRequest,
) -> Result<Isochrone, TaskError> {
    let fail = |source: Error| TaskError::new(point.id.clone(), budget, source);

    let walk_budget = WalkBudget::new(budget, request.speed).map_err(fail)?;
    let (source, snap_distance) =
        snap_point(graph, &point.geometry, request.max_snap_distance).map_err(fail)?;
    let source_node = graph.node(source).ok_or(Error::UnknownSource).map_err(fail)?.id;

    let reached = reachable(graph, source, walk_budget).map_err(fail)?;
    let hull = boundary(&reached, graph).map_err(fail)?;

    let shape = match (hull, request.clip.as_ref()) {
        (Hull::Polygon(polygon), None) => IsochroneShape::Area(MultiPolygon::new(vec![polygon])),
        (Hull::Polygon(polygon), Some(clip_boundary)) => {
            match clip(&MultiPolygon::new(vec![polygon]), clip_boundary) {
                Clipped::Area(polygons) => IsochroneShape::Area(polygons),
                Clipped::Empty => IsochroneShape::Empty,
            }
        }
        (Hull::Degenerate(degenerate), clip_boundary) => {
            clip_degenerate(degenerate, clip_boundary)
        }
    };

    debug!(
        "Isochrone '{}' at {budget} min: {} nodes reached from node {source_node}",
        point.id,
        reached.len()
    );

    Ok(Isochrone {
        point_id: point.id.clone(),
        budget,
        source_node,
        snap_distance,
        reached_nodes: reached.len(),
        shape,
    })
}

fn clip_degenerate(degenerate: DegenerateHull, clip_boundary: Option<&ClipBoundary>) -> IsochroneShape {
    let inside = match (clip_boundary, &degenerate) {
        (None, _) => true,
        (Some(clip_boundary), DegenerateHull::Point(point)) => {
            clip_boundary.polygons().intersects(point)
        }
        (Some(clip_boundary), DegenerateHull::Segment(line)) => {
            clip_boundary.polygons().intersects(line)
        }
    };
    if inside {
        IsochroneShape::Degenerate(degenerate)
    } else {
        IsochroneShape::Empty
    }
}

/// Isochrones for every point and every budget of `request`.
///
/// One task per (point, budget) pair, run in parallel. Records come back
/// point by point, budgets in request order. A failing task only affects
/// its own record.
pub fn bulk_isochrones(
    graph: &StreetGraph,
    points: &[QueryPoint],
    request: &IsochroneRequest,
) -> Vec<IsochroneRecord> {
    let tasks: Vec<(&QueryPoint, Minutes)> = points
        .iter()
        .flat_map(|point| request.budgets.iter().map(move |&budget| (point, budget)))
        .collect();

    let records: Vec<IsochroneRecord> = tasks
        .par_iter()
        .map(|&(point, budget)| {
            let outcome = calculate_isochrone(graph, point, budget, request);
            if let Err(e) = &outcome {
                warn!("{e}");
            }
            IsochroneRecord {
                point_id: point.id.clone(),
                budget,
                outcome,
            }
        })
        .collect();

    let failed = records.iter().filter(|r| r.outcome.is_err()).count();
    debug!(
        "Computed {} isochrones for {} points ({failed} failed)",
        records.len(),
        points.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use geo::{Area, Rect, coord};

    use super::*;
    use crate::model::RegionNetwork;
    use crate::{GraphBuildOptions, build_street_graph};

    /// 5x5 grid of 100 m blocks, node ids row by row
    fn grid() -> StreetGraph {
        let mut region = RegionNetwork::default();
        for row in 0..5u64 {
            for col in 0..5u64 {
                region.add_node(row * 5 + col, col as f64 * 100.0, row as f64 * 100.0);
            }
        }
        for row in 0..5u64 {
            for col in 0..5u64 {
                let id = row * 5 + col;
                if col < 4 {
                    region.add_edge(id, id + 1, 100.0);
                }
                if row < 4 {
                    region.add_edge(id, id + 5, 100.0);
                }
            }
        }
        build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap()
    }

    fn request(budgets: Vec<Minutes>) -> IsochroneRequest {
        IsochroneRequest::new(budgets, WalkingSpeed::from_meters_per_minute(100.0).unwrap())
    }

    #[test]
    fn centre_of_grid_gives_diamond() {
        let graph = grid();
        let point = QueryPoint::new("centre", 201.0, 199.0);
        let isochrone = calculate_isochrone(&graph, &point, 2.0, &request(vec![2.0])).unwrap();

        assert_eq!(isochrone.source_node, NodeId(12));
        assert_eq!(isochrone.reached_nodes, 13);
        let IsochroneShape::Area(area) = &isochrone.shape else {
            panic!("expected an area");
        };
        // Diamond with 200 m half-diagonals
        assert!((area.unsigned_area() - 80_000.0).abs() < 1e-6);
        let label = isochrone.label_point().unwrap();
        assert!((label.x() - 200.0).abs() < 1e-9 && (label.y() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zero_budget_is_degenerate() {
        let graph = grid();
        let point = QueryPoint::new("corner", 0.0, 0.0);
        let isochrone = calculate_isochrone(&graph, &point, 0.0, &request(vec![0.0])).unwrap();
        assert_eq!(
            isochrone.shape,
            IsochroneShape::Degenerate(DegenerateHull::Point(Point::new(0.0, 0.0)))
        );
        assert!(!isochrone.is_plottable());
    }

    #[test]
    fn clipping_removes_area_outside_boundary() {
        let graph = grid();
        let land = ClipBoundary::from_polygon(
            Rect::new(coord! {x: 0.0, y: 0.0}, coord! {x: 200.0, y: 400.0}).to_polygon(),
        );
        let req = request(vec![2.0]).with_clip(land);
        let point = QueryPoint::new("centre", 200.0, 200.0);
        let isochrone = calculate_isochrone(&graph, &point, 2.0, &req).unwrap();

        let IsochroneShape::Area(area) = &isochrone.shape else {
            panic!("expected an area");
        };
        assert!((area.unsigned_area() - 40_000.0).abs() < 1e-6);
    }

    #[test]
    fn hull_outside_boundary_is_empty() {
        let graph = grid();
        let far_away = ClipBoundary::from_polygon(
            Rect::new(coord! {x: 1000.0, y: 1000.0}, coord! {x: 2000.0, y: 2000.0}).to_polygon(),
        );
        let req = request(vec![1.0, 0.0]).with_clip(far_away);
        let point = QueryPoint::new("corner", 0.0, 0.0);

        let records = bulk_isochrones(&graph, &[point], &req);
        assert_eq!(records.len(), 2);
        for record in records {
            assert_eq!(record.outcome.unwrap().shape, IsochroneShape::Empty);
        }
    }

    #[test]
    fn snap_limit_fails_only_that_point() {
        let graph = grid();
        let req = request(vec![1.0, 2.0]).with_max_snap_distance(50.0);
        let points = vec![
            QueryPoint::new("near", 10.0, 10.0),
            QueryPoint::new("far", 1000.0, 1000.0),
        ];

        let records = bulk_isochrones(&graph, &points, &req);
        let summary: Vec<(&str, Minutes, bool)> = records
            .iter()
            .map(|r| (r.point_id.as_str(), r.budget, r.outcome.is_ok()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("near", 1.0, true),
                ("near", 2.0, true),
                ("far", 1.0, false),
                ("far", 2.0, false),
            ]
        );

        let error = records[2].outcome.as_ref().unwrap_err();
        assert_eq!(error.point_id, "far");
        assert!(matches!(error.source, Error::SnapTooFar { .. }));
    }

    #[test]
    fn invalid_budget_is_a_task_error() {
        let graph = grid();
        let point = QueryPoint::new("p", 0.0, 0.0);
        let error = calculate_isochrone(&graph, &point, -5.0, &request(vec![-5.0])).unwrap_err();
        assert_eq!(error.budget, -5.0);
        assert!(matches!(error.source, Error::InvalidBudget(_)));
    }

    #[test]
    fn empty_graph_fails_every_task() {
        let graph = build_street_graph(Vec::new(), &GraphBuildOptions::planar()).unwrap();
        let records = bulk_isochrones(&graph, &[QueryPoint::new("p", 0.0, 0.0)], &request(vec![5.0]));
        assert!(matches!(
            records[0].outcome.as_ref().unwrap_err().source,
            Error::EmptyGraph
        ));
    }
}
