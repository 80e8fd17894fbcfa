//! Street network and clip boundary loading for the server and batch runs

use anyhow::Context;
use rayon::prelude::*;
use tracing::info;
use walkshed_core::algo::ClipBoundary;
use walkshed_core::{StreetGraph, build_street_graph, read_clip_boundary, read_region_file};

use crate::config::ServerConfig;

/// Reads every configured region in parallel and unions them
pub fn load_street_graph(config: &ServerConfig) -> anyhow::Result<StreetGraph> {
    let coordinate_system = config.isochrones.coordinate_system;
    let regions = config
        .network_paths
        .par_iter()
        .map(|path| {
            read_region_file(path, coordinate_system)
                .with_context(|| format!("Failed to load street network {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let graph = build_street_graph(regions, &config.isochrones.build_options())?;
    anyhow::ensure!(!graph.is_empty(), "Configured street networks contain no nodes");
    Ok(graph)
}

pub fn load_clip_boundary(config: &ServerConfig) -> anyhow::Result<Option<ClipBoundary>> {
    let Some(path) = &config.clip_boundary_path else {
        return Ok(None);
    };
    let boundary = read_clip_boundary(path)
        .with_context(|| format!("Failed to load clip boundary {}", path.display()))?;
    info!(
        "Loaded clip boundary with {} polygons from {}",
        boundary.polygons().0.len(),
        path.display()
    );
    Ok(Some(boundary))
}
