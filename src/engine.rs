use crate::error::PlateError;
use image::DynamicImage;

/// A point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Four corners of a detected region: top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox(pub [Point; 4]);

impl BoundingBox {
    /// Axis-aligned box from its edges
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    /// Vertical midpoint between the first and third corners
    pub fn center_y(&self) -> f32 {
        (self.0[0].y + self.0[2].y) / 2.0
    }
}

/// One text region reported by a recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTextRegion {
    pub bbox: BoundingBox,
    pub text: String,
    /// Engine confidence in [0, 1]
    pub confidence: f64,
}

/// Trait that all OCR engines must implement
pub trait TextRecognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Detect and read every text line in an already preprocessed image
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<DetectedTextRegion>, PlateError>;
}
