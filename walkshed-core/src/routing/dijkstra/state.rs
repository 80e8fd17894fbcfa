use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::{Minutes, NodeId};

#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: Minutes,
    pub(super) id: NodeId,
    pub(super) node: NodeIndex,
}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // equal costs pop the lowest node id first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn heap_pops_cheapest_then_lowest_id() {
        let mut heap = BinaryHeap::new();
        for (cost, id) in [(2.0, 1), (1.0, 9), (1.0, 3), (0.5, 7)] {
            heap.push(State {
                cost,
                id: NodeId(id),
                node: NodeIndex::new(id as usize),
            });
        }
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop()).map(|s| s.id.0).collect();
        assert_eq!(order, vec![7, 3, 9, 1]);
    }
}
