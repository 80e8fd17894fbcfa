//! Pedestrian street network model

pub mod components;
pub mod network;

pub use components::{NodeId, StreetEdge, StreetNode};
pub use network::{CoordinateSystem, IndexedPoint, StreetGraph, nearest};
