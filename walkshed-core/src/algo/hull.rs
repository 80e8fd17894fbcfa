//! Convex hull of the reached street nodes.
//!
//! The hull deliberately overstates reach around concave street layouts
//! (peninsulas, parks, water). Clipping against an outer boundary removes
//! the worst of it, see [`super::clip`].

use geo::{Area, ConvexHull, Coord, Line, MultiPoint, Point, Polygon};
use itertools::Itertools;

use crate::routing::ReachableSet;
use crate::{Error, StreetGraph};

/// Hull of fewer than three non-collinear points, not usable as an area
#[derive(Debug, Clone, PartialEq)]
pub enum DegenerateHull {
    Point(Point<f64>),
    Segment(Line<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Hull {
    Polygon(Polygon<f64>),
    Degenerate(DegenerateHull),
}

impl Hull {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Hull::Degenerate(_))
    }
}

/// Convex hull over the coordinates of every node in `reachable`.
///
/// # Errors
///
/// Returns [`Error::EmptyReachableSet`] when none of the nodes resolve to
/// a position in `graph`.
pub fn boundary(reachable: &ReachableSet, graph: &StreetGraph) -> Result<Hull, Error> {
    let coords = reachable
        .iter()
        .filter_map(|(node, _)| graph.node(node))
        .map(|node| node.geometry.0)
        .collect();
    convex_hull_of(coords)
}

pub fn convex_hull_of(coords: Vec<Coord<f64>>) -> Result<Hull, Error> {
    let distinct: Vec<Coord<f64>> = coords
        .into_iter()
        // Adding zero folds -0.0 into 0.0, which total_cmp orders apart
        .map(|c| Coord {
            x: c.x + 0.0,
            y: c.y + 0.0,
        })
        .sorted_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        .dedup()
        .collect();

    match distinct.len() {
        0 => Err(Error::EmptyReachableSet),
        1 => Ok(Hull::Degenerate(DegenerateHull::Point(Point::from(
            distinct[0],
        )))),
        2 => Ok(Hull::Degenerate(DegenerateHull::Segment(Line::new(
            distinct[0],
            distinct[1],
        )))),
        n => {
            let (first, last) = (distinct[0], distinct[n - 1]);
            let hull = distinct
                .into_iter()
                .map(Point::from)
                .collect::<MultiPoint<f64>>()
                .convex_hull();
            if hull.unsigned_area() > 0.0 {
                Ok(Hull::Polygon(hull))
            } else {
                // Collinear: lexicographic extremes are the segment ends
                Ok(Hull::Degenerate(DegenerateHull::Segment(Line::new(first, last))))
            }
        }
    }
}
