//! GeoJSON readers for street networks, query points and clip boundaries

use std::path::Path;

use geo::{BooleanOps, Centroid, LineString, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection, GeoJson, feature::Id};
use hashbrown::HashMap;
use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::algo::ClipBoundary;
use crate::model::{QueryPoint, RegionEdge, RegionNetwork, RegionNode};
use crate::{CoordinateSystem, Error, NodeId};

/// Builds a region network from an osmnx-style GeoJSON export.
///
/// Point features with an `osmid` (or `id`) property are nodes. LineString
/// features with `u` and `v` properties are edges, optionally carrying
/// `key`, `length` (meters) and `oneway`. Missing lengths are measured
/// along the line geometry.
pub fn network_from_geojson(
    collection: &FeatureCollection,
    coordinate_system: CoordinateSystem,
) -> Result<RegionNetwork, Error> {
    let mut region = RegionNetwork::default();
    let mut skipped = 0;

    for feature in &collection.features {
        match feature_geometry(feature)? {
            Some(geo::Geometry::Point(point)) => {
                let Some(id) = property_u64(feature, "osmid")
                    .or_else(|| property_u64(feature, "id"))
                    .or_else(|| feature_id_u64(feature))
                else {
                    skipped += 1;
                    continue;
                };
                region.nodes.push(RegionNode {
                    id: NodeId(id),
                    geometry: point,
                });
            }
            Some(geo::Geometry::LineString(line)) => {
                let (Some(from), Some(to)) = (property_u64(feature, "u"), property_u64(feature, "v"))
                else {
                    skipped += 1;
                    continue;
                };
                let key = property_u64(feature, "key")
                    .and_then(|key| u32::try_from(key).ok())
                    .unwrap_or(0);
                let length = feature
                    .property("length")
                    .and_then(JsonValue::as_f64)
                    .unwrap_or_else(|| line_length(&line, coordinate_system));
                let oneway = feature
                    .property("oneway")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(false);

                region.edges.push(RegionEdge {
                    from: NodeId(from),
                    to: NodeId(to),
                    key,
                    length,
                    oneway,
                    geometry: Some(line),
                });
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} features that are neither street nodes nor street edges");
    }
    Ok(region)
}

/// Reads one region network from a GeoJSON file
pub fn read_region_file(
    path: impl AsRef<Path>,
    coordinate_system: CoordinateSystem,
) -> Result<RegionNetwork, Error> {
    let path = path.as_ref();
    let collection = read_feature_collection(path)?;
    let region = network_from_geojson(&collection, coordinate_system)?;
    info!(
        "Read {} nodes and {} edges from {}",
        region.nodes.len(),
        region.edges.len(),
        path.display()
    );
    Ok(region)
}

/// Reads query points, identified by the `id_field` property.
///
/// Polygonal features are represented by their centroid. Points sharing an
/// identifier are deduplicated, keeping the last one.
pub fn read_points_file(path: impl AsRef<Path>, id_field: &str) -> Result<Vec<QueryPoint>, Error> {
    let collection = read_feature_collection(path.as_ref())?;
    points_from_geojson(&collection, id_field)
}

pub fn points_from_geojson(
    collection: &FeatureCollection,
    id_field: &str,
) -> Result<Vec<QueryPoint>, Error> {
    let mut points = Vec::with_capacity(collection.features.len());

    for feature in &collection.features {
        let Some(id) = property_string(feature, id_field).or_else(|| feature_id_string(feature))
        else {
            warn!("Skipping point feature without '{id_field}' identifier");
            continue;
        };

        let location = match feature_geometry(feature)? {
            Some(geo::Geometry::Point(point)) => Some(point),
            Some(geo::Geometry::Polygon(polygon)) => polygon.centroid(),
            Some(geo::Geometry::MultiPolygon(polygons)) => polygons.centroid(),
            _ => None,
        };
        match location {
            Some(geometry) => points.push(QueryPoint { id, geometry }),
            None => warn!("Skipping point '{id}' without usable geometry"),
        }
    }

    Ok(dedup_keep_last(points))
}

/// Reads a clip boundary, unioning every polygonal feature of the file
pub fn read_clip_boundary(path: impl AsRef<Path>) -> Result<ClipBoundary, Error> {
    let collection = read_feature_collection(path.as_ref())?;
    clip_boundary_from_geojson(&collection)
}

pub fn clip_boundary_from_geojson(collection: &FeatureCollection) -> Result<ClipBoundary, Error> {
    let mut parts: Vec<MultiPolygon<f64>> = Vec::new();
    for feature in &collection.features {
        match feature_geometry(feature)? {
            Some(geo::Geometry::Polygon(polygon)) => parts.push(MultiPolygon::new(vec![polygon])),
            Some(geo::Geometry::MultiPolygon(polygons)) => parts.push(polygons),
            _ => {}
        }
    }

    let mut parts = parts.into_iter();
    let first = parts.next().ok_or_else(|| {
        Error::InvalidData("Clip boundary contains no polygon features".to_string())
    })?;
    let area = parts.fold(first, |acc, part| acc.union(&part));
    Ok(ClipBoundary::new(area))
}

fn read_feature_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let geojson = content
        .parse::<GeoJson>()
        .map_err(|e| Error::GeoJsonError(format!("{}: {e}", path.display())))?;

    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => FeatureCollection {
            features: vec![feature],
            bbox: None,
            foreign_members: None,
        },
        GeoJson::Geometry(geometry) => FeatureCollection {
            features: vec![Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            bbox: None,
            foreign_members: None,
        },
    })
}

fn feature_geometry(feature: &Feature) -> Result<Option<geo::Geometry<f64>>, Error> {
    feature
        .geometry
        .as_ref()
        .map(|geometry| {
            geo::Geometry::<f64>::try_from(geometry.value.clone())
                .map_err(|e| Error::GeoJsonError(e.to_string()))
        })
        .transpose()
}

fn line_length(line: &LineString<f64>, coordinate_system: CoordinateSystem) -> f64 {
    line.points()
        .zip(line.points().skip(1))
        .map(|(a, b)| coordinate_system.distance(a, b))
        .sum()
}

fn property_u64(feature: &Feature, name: &str) -> Option<u64> {
    match feature.property(name)? {
        JsonValue::Number(number) => number.as_u64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn property_string(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        JsonValue::String(text) if !text.is_empty() => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn feature_id_u64(feature: &Feature) -> Option<u64> {
    match feature.id.as_ref()? {
        Id::Number(number) => number.as_u64(),
        Id::String(text) => text.parse().ok(),
    }
}

fn feature_id_string(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::Number(number) => Some(number.to_string()),
        Id::String(text) => Some(text.clone()),
    }
}

fn dedup_keep_last(points: Vec<QueryPoint>) -> Vec<QueryPoint> {
    let keep: Vec<bool> = {
        let last: HashMap<&str, usize> = points
            .iter()
            .enumerate()
            .map(|(idx, point)| (point.id.as_str(), idx))
            .collect();
        points
            .iter()
            .enumerate()
            .map(|(idx, point)| last.get(point.id.as_str()) == Some(&idx))
            .collect()
    };

    let duplicates = keep.iter().filter(|kept| !**kept).count();
    if duplicates > 0 {
        info!("Dropped {duplicates} query points with duplicate identifiers");
    }
    retain_flagged(points, keep)
}

/// Keeps one point per location, the last one listed wins
pub fn dedup_locations(points: Vec<QueryPoint>) -> Vec<QueryPoint> {
    let keep: Vec<bool> = {
        let last: HashMap<(u64, u64), usize> = points
            .iter()
            .enumerate()
            .map(|(idx, point)| (location_key(&point.geometry), idx))
            .collect();
        points
            .iter()
            .enumerate()
            .map(|(idx, point)| last.get(&location_key(&point.geometry)) == Some(&idx))
            .collect()
    };

    let duplicates = keep.iter().filter(|kept| !**kept).count();
    if duplicates > 0 {
        info!("Dropped {duplicates} query points sharing a location with a later point");
    }
    retain_flagged(points, keep)
}

fn location_key(point: &Point<f64>) -> (u64, u64) {
    // Adding zero folds -0.0 into 0.0
    ((point.x() + 0.0).to_bits(), (point.y() + 0.0).to_bits())
}

fn retain_flagged(points: Vec<QueryPoint>, keep: Vec<bool>) -> Vec<QueryPoint> {
    points
        .into_iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(point))
        .collect()
}
