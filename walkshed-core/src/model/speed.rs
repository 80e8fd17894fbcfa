//! Speed-dependent edge weighting.
//!
//! Traversal time is a pure function of edge length and the speed of the
//! query asking for it. Nothing is written back to the graph, so queries
//! with different speeds can share one [`StreetGraph`].

use petgraph::graph::EdgeIndex;
use serde::Serialize;

use super::{StreetEdge, StreetGraph};
use crate::{Error, Minutes};

const METERS_PER_MILE: f64 = 1609.344;

/// Walking speed in meters per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct WalkingSpeed(f64);

impl WalkingSpeed {
    /// 3 mph, roughly 4.8 km/h
    pub const DEFAULT_MILES_PER_HOUR: f64 = 3.0;

    /// # Errors
    ///
    /// Returns [`Error::InvalidSpeed`] unless the value is finite and positive.
    pub fn from_meters_per_minute(value: f64) -> Result<Self, Error> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSpeed(value))
        }
    }

    pub fn from_km_per_hour(value: f64) -> Result<Self, Error> {
        Self::from_meters_per_minute(value * 1000.0 / 60.0)
    }

    pub fn from_miles_per_hour(value: f64) -> Result<Self, Error> {
        Self::from_meters_per_minute(value * METERS_PER_MILE / 60.0)
    }

    pub fn meters_per_minute(self) -> f64 {
        self.0
    }

    /// Minutes needed to walk `length` meters
    pub fn traversal_time(self, length: f64) -> Minutes {
        length / self.0
    }
}

impl Default for WalkingSpeed {
    fn default() -> Self {
        Self(Self::DEFAULT_MILES_PER_HOUR * METERS_PER_MILE / 60.0)
    }
}

/// Read-only traversal time view over a street graph for one speed
#[derive(Debug, Clone, Copy)]
pub struct EdgeTimes<'g> {
    graph: &'g StreetGraph,
    speed: WalkingSpeed,
}

impl<'g> EdgeTimes<'g> {
    pub fn graph(&self) -> &'g StreetGraph {
        self.graph
    }

    pub fn speed(&self) -> WalkingSpeed {
        self.speed
    }

    pub fn edge_time(&self, edge: &StreetEdge) -> Minutes {
        self.speed.traversal_time(edge.length)
    }

    pub fn time(&self, edge: EdgeIndex) -> Option<Minutes> {
        self.graph
            .graph
            .edge_weight(edge)
            .map(|edge| self.edge_time(edge))
    }
}

/// Weights every edge of `graph` by `length / speed`
pub fn annotate_times(graph: &StreetGraph, speed: WalkingSpeed) -> EdgeTimes<'_> {
    EdgeTimes { graph, speed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionNetwork;
    use crate::{GraphBuildOptions, build_street_graph};

    #[test]
    fn speed_conversions() {
        let kmh = WalkingSpeed::from_km_per_hour(4.8).unwrap();
        assert!((kmh.meters_per_minute() - 80.0).abs() < 1e-9);

        let mph = WalkingSpeed::from_miles_per_hour(3.0).unwrap();
        assert!((mph.meters_per_minute() - 80.4672).abs() < 1e-9);
        assert_eq!(mph, WalkingSpeed::default());
    }

    #[test]
    fn rejects_non_positive_speed() {
        assert!(matches!(
            WalkingSpeed::from_meters_per_minute(0.0),
            Err(Error::InvalidSpeed(_))
        ));
        assert!(WalkingSpeed::from_meters_per_minute(-3.0).is_err());
        assert!(WalkingSpeed::from_meters_per_minute(f64::NAN).is_err());
        assert!(WalkingSpeed::from_meters_per_minute(f64::INFINITY).is_err());
    }

    #[test]
    fn views_with_different_speeds_do_not_interfere() {
        let mut region = RegionNetwork::default();
        region.add_node(1, 0.0, 0.0);
        region.add_node(2, 120.0, 0.0);
        region.add_edge(1, 2, 120.0);
        region.add_edge(2, 2, 0.0);
        let graph = build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap();

        let slow = annotate_times(&graph, WalkingSpeed::from_meters_per_minute(60.0).unwrap());
        let fast = annotate_times(&graph, WalkingSpeed::from_meters_per_minute(120.0).unwrap());

        for edge in graph.graph.edge_indices() {
            let length = graph.graph[edge].length;
            assert_eq!(slow.time(edge), Some(length / 60.0));
            assert_eq!(fast.time(edge), Some(length / 120.0));
            // Recomputing is idempotent
            assert_eq!(slow.time(edge), slow.time(edge));
        }
        assert!(slow.time(EdgeIndex::new(100)).is_none());
    }
}
