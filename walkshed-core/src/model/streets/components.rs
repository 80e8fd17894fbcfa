//! Street network components - nodes and edges

use std::fmt;

use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

/// Stable identifier of a street node, as assigned by the network provider
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// Provider ID of the node
    pub id: NodeId,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge (one traversal direction of a street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Physical length in meters
    pub length: f64,
    /// Distinguishes parallel segments between the same pair of nodes
    pub key: u32,
    /// Optional geometry for visualization
    pub geometry: LineString<f64>,
}

