//! Street graph with a spatial index over its nodes

use std::cmp::Ordering;

use geo::{Distance, Euclidean, Haversine, Point};
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};
use serde::{Deserialize, Serialize};

use super::components::{NodeId, StreetEdge, StreetNode};
use crate::Error;

/// Node position stored in the R-tree together with its graph index
pub type IndexedPoint = GeomWithData<Point<f64>, NodeIndex>;

/// Node position in search space: planar `(x, y, 0)` or a unit vector on the sphere
type SearchPoint = GeomWithData<[f64; 3], NodeIndex>;

/// Relative slack when comparing index bounds with metric distances
const BOUND_SLACK: f64 = 1e-9;

/// Mean Earth radius used by the haversine metric, meters
const EARTH_RADIUS: f64 = 6_371_008.8;

/// How node coordinates are to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Longitude/latitude in degrees, distances in meters along the sphere
    #[default]
    Geographic,
    /// Projected coordinates, Euclidean distances in coordinate units
    Planar,
}

impl CoordinateSystem {
    pub fn distance(self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            CoordinateSystem::Geographic => Haversine.distance(a, b),
            CoordinateSystem::Planar => Euclidean.distance(a, b),
        }
    }

    /// Position used by the spatial index.
    ///
    /// Geographic positions become unit vectors, so that straight-line
    /// distance between them grows with great-circle distance everywhere,
    /// across the antimeridian and near the poles included.
    fn search_position(self, point: Point<f64>) -> [f64; 3] {
        match self {
            CoordinateSystem::Geographic => {
                let (lon, lat) = (point.x().to_radians(), point.y().to_radians());
                [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
            }
            CoordinateSystem::Planar => [point.x(), point.y(), 0.0],
        }
    }

    /// Metric distance matching a straight-line distance in search space
    fn distance_from_search(self, chord: f64) -> f64 {
        match self {
            CoordinateSystem::Geographic => {
                2.0 * (chord / 2.0).min(1.0).asin() * EARTH_RADIUS
            }
            CoordinateSystem::Planar => chord,
        }
    }

    /// Tolerance under which two node positions are considered the same location
    pub fn default_tolerance(self) -> f64 {
        match self {
            CoordinateSystem::Geographic => 1e-7,
            CoordinateSystem::Planar => 1e-3,
        }
    }
}

/// Walkable street network
///
/// Built once and shared read-only between queries. Nothing speed-dependent
/// is stored here, see [`crate::EdgeTimes`].
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: DiGraph<StreetNode, StreetEdge>,
    rtree: RTree<SearchPoint>,
    node_ids: HashMap<NodeId, NodeIndex>,
    coordinate_system: CoordinateSystem,
}

impl StreetGraph {
    pub fn new(graph: DiGraph<StreetNode, StreetEdge>, coordinate_system: CoordinateSystem) -> Self {
        let points: Vec<SearchPoint> = graph
            .node_indices()
            .map(|idx| GeomWithData::new(coordinate_system.search_position(graph[idx].geometry), idx))
            .collect();
        let node_ids = graph
            .node_indices()
            .map(|idx| (graph[idx].id, idx))
            .collect();

        Self {
            graph,
            rtree: RTree::bulk_load(points),
            node_ids,
            coordinate_system,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    pub fn node(&self, node: NodeIndex) -> Option<&StreetNode> {
        self.graph.node_weight(node)
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_ids.get(&id).copied()
    }

    /// Outgoing edges of a node
    pub fn edges(&self, node: NodeIndex) -> petgraph::graph::Edges<'_, StreetEdge, petgraph::Directed> {
        self.graph.edges(node)
    }

    pub fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        self.coordinate_system.distance(a, b)
    }

    /// Number of weakly connected components and the size of the largest one
    pub fn component_summary(&self) -> (usize, usize) {
        let components = rustworkx_core::connectivity::connected_components(&self.graph);
        let largest = components.iter().map(|c| c.len()).max().unwrap_or(0);
        (components.len(), largest)
    }

    /// Closest node to `point` and the distance to it.
    ///
    /// Equidistant candidates resolve to the lowest [`NodeId`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGraph`] if the graph has no nodes.
    pub fn nearest_node(&self, point: &Point<f64>) -> Result<(NodeIndex, f64), Error> {
        let query = self.coordinate_system.search_position(*point);
        let mut best: Option<(f64, NodeId, NodeIndex)> = None;

        // Candidates arrive by increasing search-space distance, which orders
        // them exactly like the metric distance
        for (candidate, distance_2) in self.rtree.nearest_neighbor_iter_with_distance_2(&query) {
            if let Some((best_distance, _, _)) = best {
                let bound = self.coordinate_system.distance_from_search(distance_2.sqrt());
                if bound > best_distance * (1.0 + BOUND_SLACK) + BOUND_SLACK {
                    break;
                }
            }

            let node = &self.graph[candidate.data];
            let distance = self.distance(*point, node.geometry);
            let better = match best {
                None => true,
                Some((best_distance, best_id, _)) => {
                    distance < best_distance || (distance == best_distance && node.id < best_id)
                }
            };
            if better {
                best = Some((distance, node.id, candidate.data));
            }
        }

        best.map(|(distance, _, node)| (node, distance))
            .ok_or(Error::EmptyGraph)
    }

    /// Reference nearest node search scanning every node.
    ///
    /// Same tie-breaking as [`StreetGraph::nearest_node`].
    pub fn nearest_node_linear(&self, point: &Point<f64>) -> Result<(NodeIndex, f64), Error> {
        self.graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                (self.distance(*point, node.geometry), node.id, idx)
            })
            .min_by(|a, b| match a.0.total_cmp(&b.0) {
                Ordering::Equal => a.1.cmp(&b.1),
                other => other,
            })
            .map(|(distance, _, node)| (node, distance))
            .ok_or(Error::EmptyGraph)
    }
}

/// Identifier of the street node closest to `(x, y)`
pub fn nearest(graph: &StreetGraph, x: f64, y: f64) -> Result<NodeId, Error> {
    let (node, _) = graph.nearest_node(&Point::new(x, y))?;
    Ok(graph.graph[node].id)
}
