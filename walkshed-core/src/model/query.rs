use geo::Point;

/// Location an isochrone is computed for
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPoint {
    /// Stable identifier supplied by the point-of-interest source
    pub id: String,
    pub geometry: Point<f64>,
}

impl QueryPoint {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            geometry: Point::new(x, y),
        }
    }
}
