//! Time-bounded shortest path search over the street graph

pub mod dijkstra;
mod reachable;

pub use dijkstra::bounded_dijkstra;
pub use reachable::{ReachableSet, WalkBudget, reachable};
