//! Viewport and point types for camera framing.
//!
//! Viewports are normalized to the `[0.0, 1.0]` source frame; points are in
//! source-video pixels.

use serde::{Deserialize, Serialize};

/// A rectangular crop within the source frame.
///
/// Coordinates are normalized: `(0.0, 0.0)` is top-left,
/// `(1.0, 1.0)` is bottom-right of the full capture area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub w: f64,
    /// Height (normalized).
    pub h: f64,
}

impl Viewport {
    /// Full-screen viewport (no zoom).
    pub const FULL: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Crop for a camera centered at a pixel position with the given zoom.
    ///
    /// The crop is kept inside the frame, so a camera near an edge is framed
    /// against that edge rather than showing out-of-frame area.
    pub fn from_camera(
        center_x_px: f64,
        center_y_px: f64,
        zoom: f64,
        frame_width: f64,
        frame_height: f64,
    ) -> Self {
        let zoom = zoom.max(1.0);
        let w = 1.0 / zoom;
        let h = 1.0 / zoom;
        let cx = if frame_width > 0.0 {
            center_x_px / frame_width
        } else {
            0.5
        };
        let cy = if frame_height > 0.0 {
            center_y_px / frame_height
        } else {
            0.5
        };

        Self {
            x: (cx - w / 2.0).clamp(0.0, 1.0 - w),
            y: (cy - h / 2.0).clamp(0.0, 1.0 - h),
            w,
            h,
        }
    }

    /// The center point of this viewport.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Effective zoom factor (1.0 = no zoom, 2.0 = 200% zoom).
    pub fn zoom_factor(&self) -> f64 {
        1.0 / self.w.min(self.h).max(0.01)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

/// A 2D point in source-video pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unzoomed_camera_is_full_frame() {
        let vp = Viewport::from_camera(960.0, 540.0, 1.0, 1920.0, 1080.0);
        assert_eq!(vp, Viewport::FULL);
    }

    #[test]
    fn test_camera_crop_is_centered() {
        let vp = Viewport::from_camera(960.0, 540.0, 2.0, 1920.0, 1080.0);
        assert!((vp.x - 0.25).abs() < 1e-9);
        assert!((vp.w - 0.5).abs() < 1e-9);
        assert!((vp.zoom_factor() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_camera_crop_clamps_at_edges() {
        let vp = Viewport::from_camera(0.0, 1080.0, 2.0, 1920.0, 1080.0);
        assert_eq!(vp.x, 0.0);
        assert!((vp.y - 0.5).abs() < 1e-9);
        let (cx, _) = vp.center();
        assert!((cx - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_point2d_distance_and_lerp() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
        let mid = Point2D::lerp(&a, &b, 0.5);
        assert!((mid.x - 1.5).abs() < 1e-9);
    }
}
