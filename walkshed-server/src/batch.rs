use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use walkshed_core::algo::{ClipBoundary, bulk_isochrones, records_to_geojson_string};
use walkshed_core::{StreetGraph, WalkshedConfig, dedup_locations, read_points_file};

/// Where query points come from and how they are cleaned up
#[derive(Debug, Clone, Copy)]
pub struct PointsInput<'a> {
    pub path: &'a Path,
    /// Property holding the point identifier
    pub id_field: &'a str,
    /// Keep only the last point listed at each location
    pub dedup_locations: bool,
}

/// Computes isochrones for every point of a GeoJSON file and writes them
/// to `output` as one feature collection.
pub fn run_batch(
    graph: &StreetGraph,
    clip: Option<ClipBoundary>,
    config: &WalkshedConfig,
    input: PointsInput<'_>,
    output: &Path,
) -> anyhow::Result<()> {
    let mut points = read_points_file(input.path, input.id_field)
        .with_context(|| format!("Failed to read points from {}", input.path.display()))?;
    if input.dedup_locations {
        points = dedup_locations(points);
    }
    anyhow::ensure!(!points.is_empty(), "No usable points in {}", input.path.display());

    let request = config.request(clip)?;
    info!(
        "Computing isochrones for {} points at budgets {:?}",
        points.len(),
        request.budgets
    );

    let records = bulk_isochrones(graph, &points, &request);
    let failed = records.iter().filter(|r| r.outcome.is_err()).count();
    let plottable = records
        .iter()
        .filter(|r| r.outcome.as_ref().is_ok_and(|i| i.is_plottable()))
        .count();
    if failed > 0 {
        warn!("{failed} of {} isochrones failed", records.len());
    }

    let text = records_to_geojson_string(&records)?;
    std::fs::write(output, text)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} isochrones ({plottable} with an area) to {}",
        records.len(),
        output.display()
    );
    Ok(())
}
