// Re-export key components
pub use crate::algo::{
    ClipBoundary, Clipped, DegenerateHull, Hull, Isochrone, IsochroneRecord, IsochroneRequest,
    IsochroneShape, boundary, bulk_isochrones, calculate_isochrone, clip, clip_polygon,
    records_to_geojson, records_to_geojson_string, snap_point,
};
pub use crate::loading::{
    GraphBuildOptions, WalkshedConfig, build_street_graph, dedup_locations, network_from_geojson,
    points_from_geojson, read_clip_boundary, read_points_file, read_region_file,
};
pub use crate::model::{
    CoordinateSystem, EdgeTimes, NodeId, QueryPoint, RegionNetwork, StreetGraph, WalkingSpeed,
    annotate_times, nearest,
};
pub use crate::routing::{ReachableSet, WalkBudget, reachable};
pub use crate::{Error, Minutes, TaskError};
