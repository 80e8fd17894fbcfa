use std::collections::BTreeMap;

use hashbrown::HashMap;
use petgraph::graph::NodeIndex;

use super::dijkstra::bounded_dijkstra;
use crate::loading::validate_budget;
use crate::{Error, Minutes, NodeId, StreetGraph, WalkingSpeed, annotate_times};

/// Time allowance of a single query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkBudget {
    pub minutes: Minutes,
    pub speed: WalkingSpeed,
}

impl WalkBudget {
    pub fn new(minutes: Minutes, speed: WalkingSpeed) -> Result<Self, Error> {
        validate_budget(minutes)?;
        Ok(Self { minutes, speed })
    }
}

/// Nodes reachable from a source within a budget, with their shortest travel time
#[derive(Debug, Clone)]
pub struct ReachableSet {
    source: NodeIndex,
    budget: Minutes,
    times: HashMap<NodeIndex, Minutes>,
}

impl ReachableSet {
    pub fn from_parts(
        source: NodeIndex,
        budget: Minutes,
        times: HashMap<NodeIndex, Minutes>,
    ) -> Self {
        Self {
            source,
            budget,
            times,
        }
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn budget(&self) -> Minutes {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.times.contains_key(&node)
    }

    pub fn time(&self, node: NodeIndex) -> Option<Minutes> {
        self.times.get(&node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, Minutes)> + '_ {
        self.times.iter().map(|(&node, &time)| (node, time))
    }

    /// Travel times keyed by node identifier, in identifier order
    pub fn by_id(&self, graph: &StreetGraph) -> BTreeMap<NodeId, Minutes> {
        self.iter()
            .filter_map(|(node, time)| graph.node(node).map(|n| (n.id, time)))
            .collect()
    }
}

/// Nodes reachable from `source` without exceeding `budget`.
///
/// Edge times are derived from the budget's speed for this call only.
///
/// # Errors
///
/// Returns [`Error::UnknownSource`] if `source` is not in `graph` and
/// [`Error::InvalidBudget`] for negative or non-finite budgets.
pub fn reachable(
    graph: &StreetGraph,
    source: NodeIndex,
    budget: WalkBudget,
) -> Result<ReachableSet, Error> {
    validate_budget(budget.minutes)?;
    let times = annotate_times(graph, budget.speed);
    bounded_dijkstra(&times, source, budget.minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionNetwork;
    use crate::{GraphBuildOptions, build_street_graph};

    fn line_graph() -> StreetGraph {
        let mut region = RegionNetwork::default();
        for id in 0..6 {
            region.add_node(id, id as f64 * 100.0, 0.0);
        }
        for id in 0..5 {
            region.add_edge(id, id + 1, 100.0);
        }
        build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap()
    }

    #[test]
    fn budget_rejects_negative_minutes() {
        let speed = WalkingSpeed::default();
        assert!(matches!(
            WalkBudget::new(-1.0, speed),
            Err(Error::InvalidBudget(_))
        ));
        assert!(WalkBudget::new(f64::NAN, speed).is_err());
        assert!(WalkBudget::new(0.0, speed).is_ok());
    }

    #[test]
    fn same_graph_serves_different_speeds() {
        let graph = line_graph();
        let source = graph.node_index(NodeId(0)).unwrap();

        let slow = WalkBudget::new(2.0, WalkingSpeed::from_meters_per_minute(50.0).unwrap()).unwrap();
        let fast = WalkBudget::new(2.0, WalkingSpeed::from_meters_per_minute(100.0).unwrap()).unwrap();

        assert_eq!(reachable(&graph, source, slow).unwrap().len(), 2);
        assert_eq!(reachable(&graph, source, fast).unwrap().len(), 3);
        assert_eq!(reachable(&graph, source, slow).unwrap().len(), 2);
    }

    #[test]
    fn by_id_is_ordered() {
        let graph = line_graph();
        let source = graph.node_index(NodeId(3)).unwrap();
        let speed = WalkingSpeed::from_meters_per_minute(100.0).unwrap();
        let set = reachable(&graph, source, WalkBudget::new(1.0, speed).unwrap()).unwrap();

        let ids: Vec<u64> = set.by_id(&graph).keys().map(|id| id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(set.time(source), Some(0.0));
        assert_eq!(set.source(), source);
    }
}
