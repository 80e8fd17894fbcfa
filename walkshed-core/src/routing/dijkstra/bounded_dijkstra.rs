use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::routing::ReachableSet;
use crate::{EdgeTimes, Error, Minutes, TIME_EPSILON};

/// Dijkstra's algorithm over the walking network, cut off at `max_cost`.
///
/// Paths are never extended past `max_cost` minutes, so only the
/// neighbourhood of `start` is explored. Returns every node whose shortest
/// travel time from `start` is within the budget.
///
/// # Errors
///
/// Returns [`Error::UnknownSource`] if `start` is not a node of the graph.
pub fn bounded_dijkstra(
    times: &EdgeTimes<'_>,
    start: NodeIndex,
    max_cost: Minutes,
) -> Result<ReachableSet, Error> {
    let street_graph = times.graph();
    let start_node = street_graph.node(start).ok_or(Error::UnknownSource)?;
    let limit = max_cost + TIME_EPSILON;

    let mut distances: HashMap<NodeIndex, Minutes> = HashMap::new();
    let mut settled = FixedBitSet::with_capacity(street_graph.node_count());
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        id: start_node.id,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        // Skip stale entries, the node was settled with a better time
        if settled.put(node.index()) {
            continue;
        }

        // Examine neighbors
        for edge in street_graph.edges(node) {
            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }

            let next_cost = cost + times.edge_time(edge.weight());
            if next_cost > limit {
                continue;
            }

            let improved = match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    true
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        true
                    } else {
                        false
                    }
                }
            };
            if improved {
                heap.push(State {
                    cost: next_cost,
                    id: street_graph.graph[next].id,
                    node: next,
                });
            }
        }
    }

    Ok(ReachableSet::from_parts(start, max_cost, distances))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionNetwork;
    use crate::{GraphBuildOptions, NodeId, StreetGraph, WalkingSpeed, annotate_times, build_street_graph};

    fn speed(value: f64) -> WalkingSpeed {
        WalkingSpeed::from_meters_per_minute(value).unwrap()
    }

    fn graph(region: RegionNetwork) -> StreetGraph {
        build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap()
    }

    fn time_of(set: &ReachableSet, graph: &StreetGraph, id: u64) -> Option<Minutes> {
        set.time(graph.node_index(NodeId(id))?)
    }

    #[test]
    fn prefers_cheaper_detour() {
        // 1 -- 2 directly costs 10, through 3 it costs 4
        let mut region = RegionNetwork::default();
        region
            .add_node(1, 0.0, 0.0)
            .add_node(2, 10.0, 0.0)
            .add_node(3, 5.0, 1.0);
        region.add_edge(1, 2, 10.0).add_edge(1, 3, 2.0).add_edge(3, 2, 2.0);
        let graph = graph(region);

        let times = annotate_times(&graph, speed(1.0));
        let start = graph.node_index(NodeId(1)).unwrap();
        let set = bounded_dijkstra(&times, start, 100.0).unwrap();

        assert_eq!(time_of(&set, &graph, 2), Some(4.0));
        assert_eq!(time_of(&set, &graph, 3), Some(2.0));
    }

    #[test]
    fn parallel_edges_use_the_shortest() {
        let mut region = RegionNetwork::default();
        region.add_node(1, 0.0, 0.0).add_node(2, 1.0, 0.0);
        region.add_edge(1, 2, 9.0).add_edge(1, 2, 3.0);
        let graph = graph(region);

        let times = annotate_times(&graph, speed(1.0));
        let start = graph.node_index(NodeId(1)).unwrap();
        let set = bounded_dijkstra(&times, start, 5.0).unwrap();
        assert_eq!(time_of(&set, &graph, 2), Some(3.0));
    }

    #[test]
    fn respects_oneway_streets() {
        let mut region = RegionNetwork::default();
        region.add_node(1, 0.0, 0.0).add_node(2, 1.0, 0.0);
        region.add_oneway_edge(1, 2, 1.0);
        let graph = graph(region);
        let times = annotate_times(&graph, speed(1.0));

        let forward = bounded_dijkstra(&times, graph.node_index(NodeId(1)).unwrap(), 5.0).unwrap();
        assert_eq!(forward.len(), 2);
        let backward = bounded_dijkstra(&times, graph.node_index(NodeId(2)).unwrap(), 5.0).unwrap();
        assert_eq!(backward.len(), 1);
    }

    #[test]
    fn budget_is_inclusive() {
        let mut region = RegionNetwork::default();
        region
            .add_node(1, 0.0, 0.0)
            .add_node(2, 1.0, 0.0)
            .add_node(3, 2.0, 0.0)
            .add_node(4, 3.0, 0.0);
        // Three edges of 0.1 minutes each do not sum exactly to 0.3 in floating point
        region.add_edge(1, 2, 0.1).add_edge(2, 3, 0.1).add_edge(3, 4, 0.1);
        let graph = graph(region);
        let times = annotate_times(&graph, speed(1.0));

        let set = bounded_dijkstra(&times, graph.node_index(NodeId(1)).unwrap(), 0.3).unwrap();
        assert_eq!(set.len(), 4);
        let set = bounded_dijkstra(&times, graph.node_index(NodeId(1)).unwrap(), 0.29).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn zero_length_edges_reach_at_zero_budget() {
        let mut region = RegionNetwork::default();
        region.add_node(1, 0.0, 0.0).add_node(2, 0.0, 0.0001).add_node(3, 5.0, 0.0);
        region.add_edge(1, 2, 0.0).add_edge(2, 3, 5.0);
        let graph = build_street_graph(
            vec![region],
            &GraphBuildOptions {
                coalesce_tolerance: Some(0.0),
                ..GraphBuildOptions::planar()
            },
        )
        .unwrap();
        let times = annotate_times(&graph, speed(1.0));

        let set = bounded_dijkstra(&times, graph.node_index(NodeId(1)).unwrap(), 0.0).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(time_of(&set, &graph, 2), Some(0.0));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let mut region = RegionNetwork::default();
        region.add_node(1, 0.0, 0.0);
        let graph = graph(region);
        let times = annotate_times(&graph, speed(1.0));
        assert!(matches!(
            bounded_dijkstra(&times, NodeIndex::new(42), 10.0),
            Err(Error::UnknownSource)
        ));
    }
}
