use serde::{Deserialize, Serialize};

/// A point in viewport coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Collision test used during scatter placement: true when the two
    /// boxes, each grown by `pad` on the trailing edges, intersect.
    pub fn overlaps_padded(&self, other: &Rect, pad: f64) -> bool {
        self.x < other.x + other.width + pad
            && self.x + self.width + pad > other.x
            && self.y < other.y + other.height + pad
            && self.y + self.height + pad > other.y
    }
}
