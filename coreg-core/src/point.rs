use nalgebra::Point2;

/// A named ground control point in one raster's pixel coordinates.
///
/// The coordinate system follows raster conventions: +x faces right starting
/// from the left edge of the image, +y faces down starting from the top edge.
/// The name identifies the same physical point across the master and slave
/// rasters, so control points observed in both can be paired.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    /// Stable identifier shared between the master and slave observations.
    pub name: String,
    /// Sub-pixel position in this raster.
    pub position: Point2<f64>,
}

impl ControlPoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: Point2::new(x, y),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}
