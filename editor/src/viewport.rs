#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SCALE;

/// A point in either document or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Uniform-scale mapping between document space and the preview surface.
///
/// Document space is the fixed page coordinate system in points, origin
/// top-left. Screen space is the preview surface in pixels, related by a
/// single zoom factor. The template model only ever stores document
/// coordinates; conversion happens at the input and draw boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Zoom factor from document points to screen pixels (1.0 = no zoom).
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: DEFAULT_SCALE }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Convert a document-space point to screen coordinates.
    #[must_use]
    pub fn doc_to_screen(&self, doc: Point) -> Point {
        Point { x: doc.x * self.scale, y: doc.y * self.scale }
    }

    /// Convert a screen-space point (pixels) to document coordinates.
    #[must_use]
    pub fn screen_to_doc(&self, screen: Point) -> Point {
        Point { x: screen.x / self.scale, y: screen.y / self.scale }
    }

    /// Convert a screen-space distance (pixels) to a document-space distance.
    #[must_use]
    pub fn screen_dist_to_doc(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
