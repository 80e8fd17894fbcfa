//! Isochrone geometry: hull extraction, clipping and the per-query pipeline

mod clip;
mod hull;
mod isochrone;
mod to_geojson;

pub use clip::{ClipBoundary, Clipped, clip, clip_polygon};
pub use hull::{DegenerateHull, Hull, boundary, convex_hull_of};
pub use isochrone::{
    Isochrone, IsochroneRecord, IsochroneRequest, IsochroneShape, bulk_isochrones,
    calculate_isochrone, snap_point,
};
pub use to_geojson::{records_to_geojson, records_to_geojson_string};
