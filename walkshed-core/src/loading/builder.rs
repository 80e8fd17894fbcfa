use geo::{Distance, Euclidean, LineString};
use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use super::config::GraphBuildOptions;
use crate::model::{
    IndexedPoint, NodeId, RegionEdge, RegionNetwork, StreetEdge, StreetGraph, StreetNode,
};
use crate::Error;

/// Unions per-region networks into a single street graph.
///
/// Nodes sharing an id, or lying within the coalesce tolerance of each other,
/// become one node carrying the lowest id. Edges coinciding on
/// `(from, to, key)` after that are kept once.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for non-finite coordinates, negative or
/// non-finite lengths and edges referencing nodes missing from their region.
pub fn build_street_graph(
    regions: Vec<RegionNetwork>,
    options: &GraphBuildOptions,
) -> Result<StreetGraph, Error> {
    let tolerance = options.tolerance();
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(Error::InvalidData(format!(
            "Coalesce tolerance must be a non-negative number, got {tolerance}"
        )));
    }

    let region_count = regions.len();
    let mut builder = GraphUnion::new(tolerance);
    for (region_idx, region) in regions.into_iter().enumerate() {
        builder.add_region(region_idx, region)?;
    }

    let coalesced = builder.coalesced;
    let street_graph = StreetGraph::new(builder.graph, options.coordinate_system);

    info!(
        "Built street graph from {region_count} regions: {} nodes, {} arcs ({coalesced} shared nodes merged)",
        street_graph.node_count(),
        street_graph.edge_count(),
    );
    if !street_graph.is_empty() {
        let (components, largest) = street_graph.component_summary();
        info!("Street graph has {components} connected components, the largest spans {largest} nodes");
    }

    Ok(street_graph)
}

struct GraphUnion {
    graph: DiGraph<StreetNode, StreetEdge>,
    by_id: HashMap<NodeId, NodeIndex>,
    locator: RTree<IndexedPoint>,
    arcs: HashSet<(NodeIndex, NodeIndex, u32)>,
    tolerance: f64,
    coalesced: usize,
}

impl GraphUnion {
    fn new(tolerance: f64) -> Self {
        Self {
            graph: DiGraph::new(),
            by_id: HashMap::new(),
            locator: RTree::new(),
            arcs: HashSet::new(),
            tolerance,
            coalesced: 0,
        }
    }

    fn add_region(&mut self, region_idx: usize, region: RegionNetwork) -> Result<(), Error> {
        debug!(
            "Adding region {region_idx}: {} nodes, {} edges",
            region.nodes.len(),
            region.edges.len()
        );

        let mut local: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(region.nodes.len());
        for node in region.nodes {
            let (x, y) = node.geometry.x_y();
            if !(x.is_finite() && y.is_finite()) {
                return Err(Error::InvalidData(format!(
                    "Node {} in region {region_idx} has non-finite coordinates",
                    node.id
                )));
            }
            let idx = self.resolve_node(node.id, node.geometry);
            local.insert(node.id, idx);
        }

        for edge in region.edges {
            self.add_edge(region_idx, &local, edge)?;
        }
        Ok(())
    }

    fn resolve_node(&mut self, id: NodeId, geometry: geo::Point<f64>) -> NodeIndex {
        if let Some(&idx) = self.by_id.get(&id) {
            return idx;
        }

        let shared = self
            .locator
            .nearest_neighbor(&geometry)
            .filter(|candidate| Euclidean.distance(*candidate.geom(), geometry) <= self.tolerance)
            .map(|candidate| candidate.data);

        let idx = if let Some(idx) = shared {
            self.coalesced += 1;
            let existing = &mut self.graph[idx];
            if id < existing.id {
                existing.id = id;
            }
            idx
        } else {
            let idx = self.graph.add_node(StreetNode { id, geometry });
            self.locator.insert(GeomWithData::new(geometry, idx));
            idx
        };
        self.by_id.insert(id, idx);
        idx
    }

    fn add_edge(
        &mut self,
        region_idx: usize,
        local: &HashMap<NodeId, NodeIndex>,
        edge: RegionEdge,
    ) -> Result<(), Error> {
        let lookup = |id: NodeId| {
            local.get(&id).copied().ok_or_else(|| {
                Error::InvalidData(format!(
                    "Edge {} -> {} in region {region_idx} references unknown node {id}",
                    edge.from, edge.to
                ))
            })
        };
        let from = lookup(edge.from)?;
        let to = lookup(edge.to)?;

        if !(edge.length.is_finite() && edge.length >= 0.0) {
            return Err(Error::InvalidData(format!(
                "Edge {} -> {} in region {region_idx} has invalid length {}",
                edge.from, edge.to, edge.length
            )));
        }

        let geometry = edge.geometry.unwrap_or_else(|| {
            LineString::from(vec![self.graph[from].geometry, self.graph[to].geometry])
        });

        if !edge.oneway {
            let mut reversed = geometry.clone();
            reversed.0.reverse();
            self.add_arc(to, from, edge.key, edge.length, reversed);
        }
        self.add_arc(from, to, edge.key, edge.length, geometry);
        Ok(())
    }

    fn add_arc(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        key: u32,
        length: f64,
        geometry: LineString<f64>,
    ) {
        if self.arcs.insert((from, to, key)) {
            self.graph.add_edge(
                from,
                to,
                StreetEdge {
                    length,
                    key,
                    geometry,
                },
            );
        }
    }
}
