//! Auto-Zoom: a virtual camera that chases the pointer.
//!
//! Produces a dense camera path for one segment by stepping a spring-driven
//! camera at a fixed rate across the trim range.
//!
//! # Algorithm
//!
//! Per step at time `t`:
//!
//! 1. **Sample** the pointer position and its centered speed.
//! 2. **Look ahead**: aim at the pointer position `t + lookahead`, where the
//!    look-ahead grows with speed and saturates at a ceiling.
//! 3. **Interaction state**: accumulate hover time while the pointer has
//!    barely moved over a short trailing window (decaying twice as fast
//!    otherwise) and check for a nearby click.
//! 4. **Zoom target**: base zoom, pulled down by speed, raised by clicks,
//!    forced to maximum on long hovers, then low-pass filtered.
//! 5. **Keyframes**: blend toward the nearest user keyframe with a
//!    raised-cosine weight.
//! 6. **Spring**: advance critically damped springs for x, y and zoom.
//!
//! The whole state lives in [`CameraState`] and is threaded through
//! [`AutoZoomSynthesizer::step`], so independent segments can be
//! simulated in parallel.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

use framecue_project_model::event::PointerSample;
use framecue_project_model::interval::{Span, TimeRange};
use framecue_project_model::timeline::{CameraPathSample, InfluencePoint, ZoomKeyframe};
use framecue_project_model::viewport::Point2D;

use crate::pointer_track::PointerTrack;

/// Upper bound on path length, about 37 hours at 60 steps per second.
const MAX_PATH_STEPS: f64 = 8_000_000.0;

/// Configuration for the auto-zoom synthesizer.
#[derive(Debug, Clone)]
pub struct AutoZoomConfig {
    /// Simulation timestep (seconds).
    pub step_secs: f64,

    /// Half-width `w` of the centered speed difference (seconds).
    pub speed_window_secs: f64,

    /// Look-ahead ceiling reached at high pointer speed (seconds).
    pub lookahead_max_secs: f64,

    /// Speed at which look-ahead reaches ~63% of its ceiling (px/s).
    pub lookahead_scale_px_per_sec: f64,

    /// Pointer movement over `hover_window_secs` below this counts as
    /// hovering (px).
    pub hover_move_threshold_px: f64,

    /// Trailing window the hover movement is measured over (seconds).
    pub hover_window_secs: f64,

    /// Hover time after which the camera zooms all the way in (seconds).
    pub long_hover_secs: f64,

    /// Hover time stops accumulating here (seconds).
    pub hover_cap_secs: f64,

    /// A click this far behind `t` still counts as near.
    pub click_lookbehind_secs: f64,

    /// A click this far ahead of `t` counts as imminent.
    pub click_lookahead_secs: f64,

    /// Zoom while the pointer is at rest without interaction.
    pub base_zoom: f64,

    /// Zoom at or above the speed penalty ceiling.
    pub min_zoom: f64,

    /// Zoom after a long hover.
    pub max_zoom: f64,

    /// Lower bound on the target zoom around a click.
    pub click_focus_zoom: f64,

    /// Speed at which the target zoom reaches `min_zoom` (px/s).
    pub speed_penalty_px_per_sec: f64,

    /// Low-pass blend factor applied to the zoom target each step.
    pub zoom_filter_alpha: f64,

    /// Default influence radius around each keyframe (seconds).
    pub keyframe_window_secs: f64,

    /// Mass of the position springs.
    pub spring_mass: f64,

    /// Tension shared by all springs.
    pub spring_tension: f64,

    /// Zoom spring mass relative to the position springs.
    pub zoom_mass_multiplier: f64,

    /// Absolute zoom bounds applied after each step.
    pub zoom_safety_min: f64,
    pub zoom_safety_max: f64,
}

impl Default for AutoZoomConfig {
    fn default() -> Self {
        Self {
            step_secs: 1.0 / 60.0,
            speed_window_secs: 0.1,
            lookahead_max_secs: 0.3,
            lookahead_scale_px_per_sec: 600.0,
            hover_move_threshold_px: 3.0,
            hover_window_secs: 0.25,
            long_hover_secs: 1.5,
            hover_cap_secs: 2.0,
            click_lookbehind_secs: 0.1,
            click_lookahead_secs: 0.35,
            base_zoom: 1.5,
            min_zoom: 1.0,
            max_zoom: 2.5,
            click_focus_zoom: 2.0,
            speed_penalty_px_per_sec: 1500.0,
            zoom_filter_alpha: 0.05,
            keyframe_window_secs: 1.0,
            spring_mass: 1.0,
            spring_tension: 120.0,
            zoom_mass_multiplier: 2.0,
            zoom_safety_min: 1.0,
            zoom_safety_max: 5.0,
        }
    }
}

/// Source frame size in pixels; keyframe positions are fractions of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }
}

/// Mass-spring-damper coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub mass: f64,
    pub tension: f64,
    pub friction: f64,
}

impl SpringParams {
    /// Friction `2·sqrt(tension·mass)`: no overshoot.
    pub fn critically_damped(mass: f64, tension: f64) -> Self {
        let mass = mass.max(1e-4);
        let tension = tension.max(1e-4);
        Self {
            mass,
            tension,
            friction: 2.0 * (tension * mass).sqrt(),
        }
    }
}

/// One spring-driven channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringAxis {
    pub value: f64,
    pub velocity: f64,
}

impl SpringAxis {
    pub fn at_rest(value: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Integrate velocity, then position, over `dt`.
    pub fn step(&mut self, target: f64, params: SpringParams, dt: f64) {
        let spring_force = -params.tension * (self.value - target);
        let accel = (spring_force - params.friction * self.velocity) / params.mass;
        self.velocity += accel * dt;
        self.value += self.velocity * dt;
    }
}

/// Running simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub x: SpringAxis,
    pub y: SpringAxis,
    pub zoom: SpringAxis,
    /// Low-passed automatic zoom target.
    pub filtered_zoom: f64,
    pub hover_secs: f64,
}

impl CameraState {
    /// Unzoomed camera resting on `position`.
    pub fn at_rest(position: Point2D) -> Self {
        Self {
            x: SpringAxis::at_rest(position.x),
            y: SpringAxis::at_rest(position.y),
            zoom: SpringAxis::at_rest(1.0),
            filtered_zoom: 1.0,
            hover_secs: 0.0,
        }
    }
}

/// Where the camera wants to be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl CameraTarget {
    /// Pixel-space target of a keyframe.
    pub fn from_keyframe(keyframe: &ZoomKeyframe, frame: FrameSize) -> Self {
        Self {
            x: keyframe.position_x * frame.width,
            y: keyframe.position_y * frame.height,
            zoom: keyframe.zoom_factor,
        }
    }
}

/// Blend automatic tracking toward a manual target.
///
/// `weight` is clamped to `[0, 1]`; 1 means the manual target wins outright.
pub fn blend_targets(auto: CameraTarget, manual: CameraTarget, weight: f64) -> CameraTarget {
    let w = if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    };
    CameraTarget {
        x: auto.x + (manual.x - auto.x) * w,
        y: auto.y + (manual.y - auto.y) * w,
        zoom: auto.zoom + (manual.zoom - auto.zoom) * w,
    }
}

/// Raised-cosine weight of `keyframe` at `time_secs`: 1 on the keyframe,
/// 0 at the window edge.
///
/// A positive `duration_secs` on the keyframe replaces the window on its
/// left side.
pub fn keyframe_influence(
    keyframe: &ZoomKeyframe,
    time_secs: f64,
    default_window_secs: f64,
) -> f64 {
    let offset = time_secs - keyframe.time_secs;
    let window = if offset < 0.0 && keyframe.duration_secs > 0.0 {
        keyframe.duration_secs
    } else {
        default_window_secs
    };
    if !(window > 0.0) {
        return if offset == 0.0 { 1.0 } else { 0.0 };
    }

    let normalized = offset.abs() / window;
    if !(normalized < 1.0) {
        return 0.0;
    }
    0.5 * (1.0 + (PI * normalized).cos())
}

/// Result of one synthesis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoZoomOutput {
    pub camera_path: Vec<CameraPathSample>,
    pub influence_points: Vec<InfluencePoint>,
}

impl AutoZoomOutput {
    pub fn is_empty(&self) -> bool {
        self.camera_path.is_empty()
    }
}

/// The auto-zoom synthesizer.
#[derive(Debug, Clone)]
pub struct AutoZoomSynthesizer {
    config: AutoZoomConfig,
}

impl AutoZoomSynthesizer {
    /// Create a new synthesizer with the given configuration.
    pub fn new(config: AutoZoomConfig) -> Self {
        Self { config }
    }

    /// Create a synthesizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AutoZoomConfig::default())
    }

    pub fn config(&self) -> &AutoZoomConfig {
        &self.config
    }

    /// Simulate the camera across `trim`.
    ///
    /// Times in the output are on the recording clock. Fewer than two
    /// pointer samples or an empty trim yield an empty output.
    pub fn generate(
        &self,
        samples: &[PointerSample],
        trim: TimeRange,
        keyframes: &[ZoomKeyframe],
        frame: FrameSize,
    ) -> AutoZoomOutput {
        self.run(samples, trim, keyframes, frame, None)
            .unwrap_or_default()
    }

    /// Like [`generate`](Self::generate), but polls `cancel` once per
    /// simulated second and returns `None` once it is set.
    pub fn generate_cancellable(
        &self,
        samples: &[PointerSample],
        trim: TimeRange,
        keyframes: &[ZoomKeyframe],
        frame: FrameSize,
        cancel: &AtomicBool,
    ) -> Option<AutoZoomOutput> {
        self.run(samples, trim, keyframes, frame, Some(cancel))
    }

    fn run(
        &self,
        samples: &[PointerSample],
        trim: TimeRange,
        keyframes: &[ZoomKeyframe],
        frame: FrameSize,
        cancel: Option<&AtomicBool>,
    ) -> Option<AutoZoomOutput> {
        let step = self.config.step_secs;
        let length = trim.duration_secs();
        if !(length > 0.0) || !(step > 0.0) || !trim.start_secs.is_finite() {
            tracing::debug!(length, "Empty trim range, no camera path");
            return Some(AutoZoomOutput::default());
        }
        let step_count = (length / step - 1e-9).ceil();
        if !step_count.is_finite() || step_count >= MAX_PATH_STEPS {
            tracing::warn!(length, "Trim range too long for a camera path");
            return Some(AutoZoomOutput::default());
        }

        let track = PointerTrack::new(samples);
        let Some(start) = track
            .position_at(trim.start_secs)
            .filter(|_| track.len() >= 2)
        else {
            tracing::warn!(
                samples = track.len(),
                "Fewer than 2 pointer samples, auto-zoom unavailable"
            );
            return Some(AutoZoomOutput::default());
        };

        let mut keyframes: Vec<ZoomKeyframe> = keyframes
            .iter()
            .filter(|k| k.time_secs.is_finite() && k.zoom_factor.is_finite())
            .cloned()
            .collect();
        keyframes.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));

        let steps = step_count.max(0.0) as usize;
        let poll_every = ((1.0 / step).round() as usize).max(1);

        let mut state = CameraState::at_rest(start);
        let mut camera_path = Vec::with_capacity(steps + 1);

        for i in 0..=steps {
            if let Some(flag) = cancel {
                if i % poll_every == 0 && flag.load(Ordering::Relaxed) {
                    tracing::info!(step = i, "Auto-zoom synthesis cancelled");
                    return None;
                }
            }

            let t = trim.start_secs + i as f64 * step;
            state = self.step(state, &track, t, &keyframes, frame);
            camera_path.push(CameraPathSample {
                time_secs: t,
                x: round_to(state.x.value, 2),
                y: round_to(state.y.value, 2),
                zoom: round_to(state.zoom.value, 4),
            });
        }

        tracing::debug!(
            samples = track.len(),
            keyframes = keyframes.len(),
            path = camera_path.len(),
            "Camera path synthesized"
        );

        Some(AutoZoomOutput {
            camera_path,
            influence_points: vec![
                InfluencePoint {
                    time_secs: trim.start_secs,
                    value: 1.0,
                },
                InfluencePoint {
                    time_secs: trim.end_secs,
                    value: 1.0,
                },
            ],
        })
    }

    /// Advance the camera one timestep to `time_secs`.
    ///
    /// `keyframes` must be sorted by time.
    pub fn step(
        &self,
        state: CameraState,
        track: &PointerTrack,
        time_secs: f64,
        keyframes: &[ZoomKeyframe],
        frame: FrameSize,
    ) -> CameraState {
        let c = &self.config;
        let Some(pointer) = track.position_at(time_secs) else {
            return state;
        };

        let speed = track.speed_at(time_secs, c.speed_window_secs);
        let lookahead = if c.lookahead_scale_px_per_sec > 0.0 {
            c.lookahead_max_secs * (1.0 - (-speed / c.lookahead_scale_px_per_sec).exp())
        } else {
            c.lookahead_max_secs
        };
        let future = track.position_at(time_secs + lookahead).unwrap_or(pointer);

        let recent = track
            .position_at(time_secs - c.hover_window_secs.max(0.0))
            .unwrap_or(pointer);
        let hover_secs = if pointer.distance_to(&recent) < c.hover_move_threshold_px {
            (state.hover_secs + c.step_secs).min(c.hover_cap_secs)
        } else {
            (state.hover_secs - 2.0 * c.step_secs).max(0.0)
        };
        let click_near = track.has_click_between(
            time_secs - c.click_lookbehind_secs,
            time_secs + c.click_lookahead_secs,
        );

        let raw_zoom = self.target_zoom(speed, hover_secs, click_near);
        let filtered_zoom =
            state.filtered_zoom + c.zoom_filter_alpha * (raw_zoom - state.filtered_zoom);

        let auto = CameraTarget {
            x: future.x,
            y: future.y,
            zoom: filtered_zoom,
        };
        let target = match nearest_keyframe(keyframes, time_secs) {
            Some(keyframe) => blend_targets(
                auto,
                CameraTarget::from_keyframe(keyframe, frame),
                keyframe_influence(keyframe, time_secs, c.keyframe_window_secs),
            ),
            None => auto,
        };

        let position_spring = SpringParams::critically_damped(c.spring_mass, c.spring_tension);
        let zoom_spring = SpringParams::critically_damped(
            c.spring_mass * c.zoom_mass_multiplier,
            c.spring_tension,
        );

        let mut next = state;
        next.x.step(target.x, position_spring, c.step_secs);
        next.y.step(target.y, position_spring, c.step_secs);
        next.zoom.step(target.zoom, zoom_spring, c.step_secs);
        next.zoom.value = next.zoom.value.clamp(c.zoom_safety_min, c.zoom_safety_max);
        next.filtered_zoom = filtered_zoom;
        next.hover_secs = hover_secs;
        next
    }

    /// Unfiltered automatic zoom target.
    pub fn target_zoom(&self, speed_px_per_sec: f64, hover_secs: f64, click_near: bool) -> f64 {
        let c = &self.config;
        if hover_secs >= c.long_hover_secs {
            return c.max_zoom;
        }

        let penalty = if c.speed_penalty_px_per_sec > 0.0 {
            (speed_px_per_sec / c.speed_penalty_px_per_sec).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let zoom = c.base_zoom + (c.min_zoom - c.base_zoom) * penalty;

        if click_near {
            zoom.max(c.click_focus_zoom)
        } else {
            zoom
        }
    }
}

/// Keyframe closest in time to `time_secs`; ties go to the earlier one.
fn nearest_keyframe(keyframes: &[ZoomKeyframe], time_secs: f64) -> Option<&ZoomKeyframe> {
    let idx = keyframes.partition_point(|k| k.time_secs <= time_secs);
    let before = idx.checked_sub(1).and_then(|i| keyframes.get(i));
    let after = keyframes.get(idx);
    match (before, after) {
        (Some(b), Some(a)) => {
            if time_secs - b.time_secs <= a.time_secs - time_secs {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => b.or(a),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
