//! This module is responsible for loading street networks, query points
//! and clip boundaries, and for assembling region networks into a single
//! street graph.

mod builder;
mod config;
mod features;

pub use builder::build_street_graph;
pub(crate) use config::{validate_budget, validate_budgets};
pub use config::{GraphBuildOptions, WalkshedConfig};
pub use features::{
    clip_boundary_from_geojson, dedup_locations, network_from_geojson, points_from_geojson,
    read_clip_boundary, read_points_file, read_region_file,
};
