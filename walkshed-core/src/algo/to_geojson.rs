use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Value as JsonValue, json};

use super::hull::DegenerateHull;
use super::isochrone::{IsochroneRecord, IsochroneShape};
use crate::Error;

/// Converts isochrone records to a `GeoJSON` `FeatureCollection`.
///
/// Larger budgets come first so that smaller isochrones are drawn on top.
/// Degenerate, empty and failed records are kept with a `status` property
/// so consumers can decide to omit them.
pub fn records_to_geojson(records: &[IsochroneRecord]) -> Result<FeatureCollection, Error> {
    let mut ordered: Vec<&IsochroneRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.budget.total_cmp(&a.budget));

    let features = ordered
        .into_iter()
        .map(record_to_feature)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn records_to_geojson_string(records: &[IsochroneRecord]) -> Result<String, Error> {
    serde_json::to_string(&records_to_geojson(records)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn record_to_feature(record: &IsochroneRecord) -> Result<Feature, Error> {
    let value = match &record.outcome {
        Ok(isochrone) => {
            let (status, geometry) = match &isochrone.shape {
                IsochroneShape::Area(polygons) => (
                    "area",
                    Some(Geometry::new(GeoJsonValue::from(polygons))),
                ),
                IsochroneShape::Degenerate(DegenerateHull::Point(point)) => (
                    "degenerate",
                    Some(Geometry::new(GeoJsonValue::from(point))),
                ),
                IsochroneShape::Degenerate(DegenerateHull::Segment(line)) => {
                    let line = LineString::from(vec![line.start, line.end]);
                    ("degenerate", Some(Geometry::new(GeoJsonValue::from(&line))))
                }
                IsochroneShape::Empty => ("empty", None),
            };
            let label = isochrone
                .label_point()
                .map_or(JsonValue::Null, |p| json!([p.x(), p.y()]));

            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "point_id": record.point_id,
                    "budget_minutes": record.budget,
                    "status": status,
                    "source_node": isochrone.source_node,
                    "snap_distance": isochrone.snap_distance,
                    "reached_nodes": isochrone.reached_nodes,
                    "label_point": label,
                }
            })
        }
        Err(e) => json!({
            "type": "Feature",
            "geometry": JsonValue::Null,
            "properties": {
                "point_id": record.point_id,
                "budget_minutes": record.budget,
                "status": "failed",
                "error": e.source.to_string(),
            }
        }),
    };

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
