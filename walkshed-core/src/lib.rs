//! Walking isochrones over pedestrian street networks.
//!
//! The crate snaps query locations to a street graph, expands a time-bounded
//! shortest path tree from the snapped node and turns the reached nodes into
//! a polygon, optionally clipped to an outer boundary.

pub mod algo;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::{Error, TaskError};
pub use loading::{
    GraphBuildOptions, WalkshedConfig, build_street_graph, dedup_locations, network_from_geojson,
    read_clip_boundary, read_points_file, read_region_file,
};
pub use model::{
    CoordinateSystem, EdgeTimes, NodeId, QueryPoint, RegionNetwork, StreetGraph, WalkingSpeed,
    annotate_times, nearest,
};

/// Travel time in minutes
pub type Minutes = f64;

/// Slack applied when comparing accumulated travel times against a budget
pub const TIME_EPSILON: Minutes = 1e-9;
