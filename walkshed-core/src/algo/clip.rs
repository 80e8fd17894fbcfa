use geo::{Area, BooleanOps, MultiPolygon, Polygon};

/// Outer area isochrones are trimmed to, e.g. a landmass outline
#[derive(Debug, Clone, PartialEq)]
pub struct ClipBoundary {
    polygons: MultiPolygon<f64>,
}

impl ClipBoundary {
    pub fn new(polygons: MultiPolygon<f64>) -> Self {
        Self { polygons }
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]))
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }
}

/// Result of clipping, an empty intersection is a regular outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Clipped {
    Area(MultiPolygon<f64>),
    Empty,
}

impl Clipped {
    pub fn is_empty(&self) -> bool {
        matches!(self, Clipped::Empty)
    }
}

/// Intersection of `shape` with the clip boundary.
///
/// Zero-area leftovers (shared edges or corners) count as empty.
pub fn clip(shape: &MultiPolygon<f64>, boundary: &ClipBoundary) -> Clipped {
    let parts: Vec<Polygon<f64>> = shape
        .intersection(&boundary.polygons)
        .into_iter()
        .filter(|part| part.unsigned_area() > 0.0)
        .collect();

    if parts.is_empty() {
        Clipped::Empty
    } else {
        Clipped::Area(MultiPolygon::new(parts))
    }
}

pub fn clip_polygon(polygon: &Polygon<f64>, boundary: &ClipBoundary) -> Clipped {
    clip(&MultiPolygon::new(vec![polygon.clone()]), boundary)
}
