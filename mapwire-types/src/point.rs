use serde::{Deserialize, Serialize};

/// Position on the map canvas in pixels from the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for ScreenPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
