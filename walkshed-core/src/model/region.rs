//! Street network of a single region, as delivered by a network provider.
//!
//! Several regions are unioned into one [`crate::StreetGraph`] by
//! [`crate::build_street_graph`].

use geo::{LineString, Point};

use super::NodeId;

#[derive(Debug, Clone)]
pub struct RegionNode {
    pub id: NodeId,
    pub geometry: Point<f64>,
}

#[derive(Debug, Clone)]
pub struct RegionEdge {
    pub from: NodeId,
    pub to: NodeId,
    /// Parallel edge key, edges sharing `(from, to, key)` across regions are merged
    pub key: u32,
    /// Length in meters
    pub length: f64,
    /// One-way segments are only walkable from `from` to `to`
    pub oneway: bool,
    pub geometry: Option<LineString<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct RegionNetwork {
    pub nodes: Vec<RegionNode>,
    pub edges: Vec<RegionEdge>,
}

impl RegionNetwork {
    pub fn add_node(&mut self, id: u64, x: f64, y: f64) -> &mut Self {
        self.nodes.push(RegionNode {
            id: NodeId(id),
            geometry: Point::new(x, y),
        });
        self
    }

    /// Adds a two-way street segment
    pub fn add_edge(&mut self, from: u64, to: u64, length: f64) -> &mut Self {
        self.push_edge(from, to, length, false)
    }

    pub fn add_oneway_edge(&mut self, from: u64, to: u64, length: f64) -> &mut Self {
        self.push_edge(from, to, length, true)
    }

    fn push_edge(&mut self, from: u64, to: u64, length: f64, oneway: bool) -> &mut Self {
        let key = self
            .edges
            .iter()
            .filter(|e| e.from.0 == from && e.to.0 == to)
            .count();
        self.edges.push(RegionEdge {
            from: NodeId(from),
            to: NodeId(to),
            key: u32::try_from(key).unwrap_or(u32::MAX),
            length,
            oneway,
            geometry: None,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
