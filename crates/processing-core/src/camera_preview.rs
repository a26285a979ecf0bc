//! Camera path lookup and motion preview helpers.
//!
//! The renderer samples the dense camera path per frame with
//! [`camera_sample_at`]. UI clients get CSS-like transforms so they can
//! preview camera movement without running the renderer.

use framecue_project_model::timeline::CameraPathSample;
use framecue_project_model::viewport::Viewport;

use crate::auto_zoom::FrameSize;

/// Interpolated camera at `time_secs`, clamped to the first/last sample.
///
/// Returns `None` for an empty path.
pub fn camera_sample_at(path: &[CameraPathSample], time_secs: f64) -> Option<CameraPathSample> {
    let first = path.first()?;
    let last = path.last()?;

    if !(time_secs > first.time_secs) {
        return Some(CameraPathSample {
            time_secs,
            ..*first
        });
    }
    if time_secs >= last.time_secs {
        return Some(CameraPathSample {
            time_secs,
            ..*last
        });
    }

    let idx = path.partition_point(|s| s.time_secs <= time_secs);
    let a = &path[idx - 1];
    let b = &path[idx];
    let span = b.time_secs - a.time_secs;
    let f = if span > f64::EPSILON {
        (time_secs - a.time_secs) / span
    } else {
        1.0
    };

    Some(CameraPathSample {
        time_secs,
        x: a.x + (b.x - a.x) * f,
        y: a.y + (b.y - a.y) * f,
        zoom: a.zoom + (b.zoom - a.zoom) * f,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMotionFrame {
    pub time_secs: f64,
    pub translate_x_percent: f64,
    pub translate_y_percent: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CameraMotionFrame {
    /// Transform for a full-size source frame showing `sample`.
    pub fn from_sample(sample: &CameraPathSample, frame: FrameSize) -> Self {
        let viewport =
            Viewport::from_camera(sample.x, sample.y, sample.zoom, frame.width, frame.height);
        Self {
            time_secs: sample.time_secs,
            translate_x_percent: -viewport.x * 100.0,
            translate_y_percent: -viewport.y * 100.0,
            scale_x: 1.0 / viewport.w.max(0.01),
            scale_y: 1.0 / viewport.h.max(0.01),
        }
    }

    pub fn css_transform(&self) -> String {
        format!(
            "translate({:.3}%, {:.3}%) scale({:.4}, {:.4})",
            self.translate_x_percent, self.translate_y_percent, self.scale_x, self.scale_y
        )
    }
}

/// Preview frame at one instant, or `None` without a camera path.
pub fn preview_frame(
    path: &[CameraPathSample],
    time_secs: f64,
    frame: FrameSize,
) -> Option<CameraMotionFrame> {
    camera_sample_at(path, time_secs).map(|s| CameraMotionFrame::from_sample(&s, frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: FrameSize = FrameSize {
        width: 1920.0,
        height: 1080.0,
    };

    fn sample(time_secs: f64, x: f64, y: f64, zoom: f64) -> CameraPathSample {
        CameraPathSample {
            time_secs,
            x,
            y,
            zoom,
        }
    }

    #[test]
    fn test_lookup_interpolates() {
        let path = [sample(0.0, 0.0, 0.0, 1.0), sample(1.0, 100.0, 50.0, 2.0)];
        let mid = camera_sample_at(&path, 0.25).unwrap();
        assert!((mid.x - 25.0).abs() < 1e-9);
        assert!((mid.y - 12.5).abs() < 1e-9);
        assert!((mid.zoom - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_clamps_and_handles_empty() {
        let path = [sample(1.0, 10.0, 10.0, 1.5), sample(2.0, 20.0, 20.0, 2.0)];
        let before = camera_sample_at(&path, 0.0).unwrap();
        assert_eq!((before.x, before.zoom, before.time_secs), (10.0, 1.5, 0.0));
        let after = camera_sample_at(&path, 5.0).unwrap();
        assert_eq!((after.x, after.zoom), (20.0, 2.0));
        assert!(camera_sample_at(&[], 1.0).is_none());
    }

    #[test]
    fn test_preview_frame_follows_zoom() {
        let path = [
            sample(0.0, 960.0, 540.0, 1.0),
            sample(2.0, 960.0, 540.0, 2.0),
        ];
        let start = preview_frame(&path, 0.0, FRAME).unwrap();
        assert!((start.scale_x - 1.0).abs() < 1e-9);
        let end = preview_frame(&path, 2.0, FRAME).unwrap();
        assert!((end.scale_x - 2.0).abs() < 1e-9);
        assert!((end.translate_x_percent + 25.0).abs() < 1e-9);
        assert!(preview_frame(&[], 1.0, FRAME).is_none());
    }

    #[test]
    fn test_css_transform_string_is_stable() {
        let frame = CameraMotionFrame {
            time_secs: 1.0,
            translate_x_percent: -12.345,
            translate_y_percent: -9.876,
            scale_x: 1.5,
            scale_y: 1.4,
        };
        let css = frame.css_transform();
        assert!(css.contains("translate(-12.345%, -9.876%)"));
        assert!(css.contains("scale(1.5000, 1.4000)"));
    }
}
