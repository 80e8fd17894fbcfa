//! Data model for pedestrian street networks
//!
//! Contains the street graph, per-region input networks and
//! speed-dependent edge weighting.

pub mod query;
pub mod region;
pub mod speed;
pub mod streets;

pub use query::QueryPoint;
pub use region::{RegionEdge, RegionNetwork, RegionNode};
pub use speed::{EdgeTimes, WalkingSpeed, annotate_times};
pub use streets::network::{CoordinateSystem, IndexedPoint, StreetGraph, nearest};
pub use streets::{NodeId, StreetEdge, StreetNode};
