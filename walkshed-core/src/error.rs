use thiserror::Error;

use crate::Minutes;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Street graph has no nodes to search")]
    EmptyGraph,
    #[error("Source node is not part of the street graph")]
    UnknownSource,
    #[error("Reachable set contains no nodes")]
    EmptyReachableSet,
    #[error("Invalid walking speed: {0} m/min")]
    InvalidSpeed(f64),
    #[error("Invalid time budget: {0} min")]
    InvalidBudget(Minutes),
    #[error("Nearest street node is {distance:.1} away (limit {limit:.1})")]
    SnapTooFar { distance: f64, limit: f64 },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

/// Failure of a single (point, budget) computation.
///
/// Carries enough context for the caller to log and skip the pair.
#[derive(Error, Debug)]
#[error("Isochrone for point '{point_id}' at {budget} min failed: {source}")]
pub struct TaskError {
    pub point_id: String,
    pub budget: Minutes,
    #[source]
    pub source: Error,
}

impl TaskError {
    pub fn new(point_id: impl Into<String>, budget: Minutes, source: Error) -> Self {
        Self {
            point_id: point_id.into(),
            budget,
            source,
        }
    }
}
