//! Editing timeline: segments and the overlays derived for them.
//!
//! Each [`Segment`] owns its trim range, the cursor and keystroke visibility
//! intervals, user zoom keyframes, and the generated camera path. Derived
//! data is replaced wholesale when regenerated; hand edits go through the
//! processing core so lists stay merge-clean.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval::{DisplayInterval, Span, TimeRange};

/// Easing curve applied to a normalized progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    Linear,
    EaseInCubic,
    EaseOutCubic,
    #[default]
    EaseInOut,
}

impl EasingFunction {
    /// Map `t` in `[0, 1]` (clamped) through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A user-authored zoom target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomKeyframe {
    pub time_secs: f64,
    /// Custom size of the influence window before the keyframe; 0 = auto.
    #[serde(default)]
    pub duration_secs: f64,
    /// Magnification, at least 1.0.
    pub zoom_factor: f64,
    /// Normalized horizontal focus position in `[0, 1]`.
    pub position_x: f64,
    /// Normalized vertical focus position in `[0, 1]`.
    pub position_y: f64,
    #[serde(default)]
    pub easing: EasingFunction,
}

impl ZoomKeyframe {
    /// Create a keyframe, clamping zoom and position into range.
    pub fn new(time_secs: f64, zoom_factor: f64, position_x: f64, position_y: f64) -> Self {
        Self {
            time_secs,
            duration_secs: 0.0,
            zoom_factor: zoom_factor.max(1.0),
            position_x: position_x.clamp(0.0, 1.0),
            position_y: position_y.clamp(0.0, 1.0),
            easing: EasingFunction::default(),
        }
    }
}

/// One step of the generated camera path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPathSample {
    pub time_secs: f64,
    /// Camera center X in source-video pixels.
    pub x: f64,
    /// Camera center Y in source-video pixels.
    pub y: f64,
    /// Magnification, at least 1.0.
    pub zoom: f64,
}

/// Sparse user control point blended into the automatic zoom downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluencePoint {
    pub time_secs: f64,
    /// Strength in `[0, 1]`.
    pub value: f64,
}

/// Which keystrokes get a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeystrokeMode {
    Off,
    #[default]
    Keyboard,
    KeyboardMouse,
}

impl FromStr for KeystrokeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(KeystrokeMode::Off),
            "keyboard" => Ok(KeystrokeMode::Keyboard),
            "keyboard_mouse" | "keyboardmouse" | "keyboard-mouse" | "all" => {
                Ok(KeystrokeMode::KeyboardMouse)
            }
            other => Err(format!(
                "unknown keystroke mode '{other}' (expected off, keyboard or keyboard_mouse)"
            )),
        }
    }
}

/// Cursor overlay settings and the derived visibility windows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorOverlay {
    /// Hide the cursor while the pointer idles.
    pub hide_when_idle: bool,
    /// Windows during which the cursor is shown.
    pub intervals: Vec<DisplayInterval>,
}

/// Keystroke overlay settings and the derived visibility windows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystrokeOverlay {
    pub mode: KeystrokeMode,
    /// Global shift applied to badge windows, in `[-1, 1]` seconds.
    pub delay_secs: f64,
    /// `None` until generated; legacy segments show badges unconditionally.
    pub intervals: Option<Vec<DisplayInterval>>,
}

/// Auto-zoom state for a segment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomTrack {
    pub auto_zoom: bool,
    pub keyframes: Vec<ZoomKeyframe>,
    pub camera_path: Vec<CameraPathSample>,
    pub influence_points: Vec<InfluencePoint>,
}

/// A trimmed piece of the recording with its overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    /// Trim window in source-recording seconds.
    pub trim: TimeRange,
    #[serde(default)]
    pub cursor: CursorOverlay,
    #[serde(default)]
    pub keystrokes: KeystrokeOverlay,
    #[serde(default)]
    pub zoom: ZoomTrack,
}

impl Segment {
    /// Create a segment covering `[trim_start, trim_end]`.
    pub fn new(trim_start_secs: f64, trim_end_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            trim: TimeRange::new(trim_start_secs, trim_end_secs),
            cursor: CursorOverlay::default(),
            keystrokes: KeystrokeOverlay::default(),
            zoom: ZoomTrack::default(),
        }
    }

    /// Output-timeline length of the segment.
    pub fn duration_secs(&self) -> f64 {
        self.trim.duration_secs()
    }

    /// Intervals for the cursor evaluator; `None` when hiding is disabled.
    pub fn cursor_visibility(&self) -> Option<&[DisplayInterval]> {
        self.cursor
            .hide_when_idle
            .then_some(self.cursor.intervals.as_slice())
    }

    /// Intervals for the keystroke evaluator; `None` when never generated.
    pub fn keystroke_visibility(&self) -> Option<&[DisplayInterval]> {
        self.keystrokes.intervals.as_deref()
    }
}

/// The editing timeline (`timeline.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Schema version.
    pub version: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            segments: vec![],
        }
    }

    pub fn segment(&self, id: Uuid) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn segment_mut(&mut self, id: Uuid) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Total output duration across all segments.
    pub fn duration_secs(&self) -> f64 {
        self.segments.iter().map(Segment::duration_secs).sum()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
