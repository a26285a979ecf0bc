//! Cursor hiding: classify pointer activity and derive visible windows.
//!
//! # Algorithm
//!
//! 1. **Window velocity**: for each sample, measure path length and net
//!    displacement across a centered window. A sample is active when it is
//!    fast enough *and* moved far enough, or when a click falls in the window.
//! 2. **Anchored runs**: long stretches that never leave a small radius around
//!    their centroid are forced inactive (sub-pixel drift from game pads or
//!    tablets reads as velocity but is not cursor movement).
//! 3. **Idle runs**: consecutive inactive samples, plus sampling gaps, that
//!    last long enough become idle runs.
//! 4. **Visible windows**: the complement of the idle runs, padded with entry
//!    and exit margins and merged across short gaps.

use framecue_project_model::event::PointerSample;
use framecue_project_model::interval::{DisplayInterval, Span, TimeRange};

use crate::intervals::{complement, merge};

/// Tuning for the cursor activity detector.
#[derive(Debug, Clone)]
pub struct CursorActivityConfig {
    /// Width of the centered velocity window (seconds).
    pub velocity_window_secs: f64,

    /// Minimum path speed across the window to count as movement (px/s).
    pub min_velocity_px_per_sec: f64,

    /// Minimum net displacement across the window (px).
    pub min_displacement_px: f64,

    /// Minimum accumulated path length across the window (px).
    /// Lets small curved motions count even when they end near their start.
    pub min_path_length_px: f64,

    /// Minimum length of an anchored run (seconds).
    pub anchored_duration_secs: f64,

    /// Maximum distance from the run centroid for an anchored run (px).
    pub anchored_radius_px: f64,

    /// Idle runs shorter than this never hide the cursor (seconds).
    pub idle_duration_threshold_secs: f64,

    /// Lead time added before each visible window (seconds).
    pub margin_before_secs: f64,

    /// Tail time added after each visible window (seconds).
    pub margin_after_secs: f64,

    /// Visible windows separated by less than this are joined (seconds).
    pub min_gap_to_merge_secs: f64,
}

impl Default for CursorActivityConfig {
    fn default() -> Self {
        Self {
            velocity_window_secs: 0.1,
            min_velocity_px_per_sec: 30.0,
            min_displacement_px: 4.0,
            min_path_length_px: 10.0,
            anchored_duration_secs: 0.5,
            anchored_radius_px: 15.0,
            idle_duration_threshold_secs: 1.0,
            margin_before_secs: 0.2,
            margin_after_secs: 0.4,
            min_gap_to_merge_secs: 0.5,
        }
    }
}

/// Per-sample classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Inactive,
}

/// The cursor activity detector.
pub struct CursorActivityDetector {
    config: CursorActivityConfig,
}

impl CursorActivityDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: CursorActivityConfig) -> Self {
        Self { config }
    }

    /// Create a detector with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CursorActivityConfig::default())
    }

    pub fn config(&self) -> &CursorActivityConfig {
        &self.config
    }

    /// Derive the windows during which the cursor is visible.
    ///
    /// With a `trim`, sample times are shifted so `trim.start` maps to 0 and
    /// the duration is capped at the trim length.
    pub fn detect(
        &self,
        samples: &[PointerSample],
        duration_secs: f64,
        trim: Option<TimeRange>,
    ) -> Vec<DisplayInterval> {
        let (intervals, _) = self.detect_with_runs(samples, duration_secs, trim);
        intervals
    }

    /// Derive visible windows and return the idle runs they were built from.
    pub fn detect_with_runs(
        &self,
        samples: &[PointerSample],
        duration_secs: f64,
        trim: Option<TimeRange>,
    ) -> (Vec<DisplayInterval>, Vec<TimeRange>) {
        let duration = match trim {
            Some(trim) => duration_secs.min(trim.duration_secs()),
            None => duration_secs,
        };
        if !(duration > 0.0) {
            return (vec![], vec![]);
        }

        let samples = prepare_samples(samples, duration, trim);
        if samples.len() < 2 {
            tracing::debug!(
                samples = samples.len(),
                "Too few pointer samples to infer idling; cursor always visible"
            );
            return (vec![DisplayInterval::new(0.0, duration)], vec![]);
        }

        let states = self.classify(&samples);
        let idle_runs = self.idle_runs(&samples, &states, duration);
        if idle_runs.is_empty() {
            return (vec![DisplayInterval::new(0.0, duration)], idle_runs);
        }

        let whole = TimeRange::new(0.0, duration);
        let padded: Vec<TimeRange> = complement(whole, &idle_runs)
            .into_iter()
            .map(|visible| {
                TimeRange::new(
                    (visible.start_secs - self.config.margin_before_secs).max(0.0),
                    (visible.end_secs + self.config.margin_after_secs).min(duration),
                )
            })
            .collect();

        let intervals: Vec<DisplayInterval> = merge(&padded, self.config.min_gap_to_merge_secs)
            .into_iter()
            .map(DisplayInterval::from)
            .collect();

        tracing::debug!(
            samples = samples.len(),
            idle_runs = idle_runs.len(),
            visible = intervals.len(),
            "Cursor visibility derived"
        );

        (intervals, idle_runs)
    }

    /// Classify each sample of a time-sorted stream.
    pub fn classify(&self, samples: &[PointerSample]) -> Vec<ActivityState> {
        let mut states = self.classify_by_velocity(samples);

        for run in self.anchored_runs(samples) {
            for (state, sample) in states[run.clone()].iter_mut().zip(&samples[run]) {
                if !sample.is_clicked {
                    *state = ActivityState::Inactive;
                }
            }
        }

        states
    }

    fn classify_by_velocity(&self, samples: &[PointerSample]) -> Vec<ActivityState> {
        let n = samples.len();
        let half_window = self.config.velocity_window_secs.max(0.0) / 2.0;

        // Prefix sums so every window costs O(1).
        let mut path_prefix = Vec::with_capacity(n);
        let mut click_prefix = Vec::with_capacity(n + 1);
        let mut path = 0.0;
        let mut clicks = 0usize;
        click_prefix.push(0);
        for (i, sample) in samples.iter().enumerate() {
            if i > 0 {
                path += sample.distance_to(&samples[i - 1]);
            }
            path_prefix.push(path);
            if sample.is_clicked {
                clicks += 1;
            }
            click_prefix.push(clicks);
        }

        let mut states = Vec::with_capacity(n);
        let mut lo = 0;
        let mut hi = 0;
        for (i, sample) in samples.iter().enumerate() {
            let t = sample.timestamp_secs;
            while samples[lo].timestamp_secs < t - half_window {
                lo += 1;
            }
            hi = hi.max(i);
            while hi + 1 < n && samples[hi + 1].timestamp_secs <= t + half_window {
                hi += 1;
            }

            if click_prefix[hi + 1] > click_prefix[lo] {
                states.push(ActivityState::Active);
                continue;
            }

            let elapsed = samples[hi].timestamp_secs - samples[lo].timestamp_secs;
            let path_length = path_prefix[hi] - path_prefix[lo];
            let net = samples[hi].distance_to(&samples[lo]);
            let velocity = if elapsed > f64::EPSILON {
                path_length / elapsed
            } else {
                0.0
            };

            let moved = net >= self.config.min_displacement_px
                || path_length >= self.config.min_path_length_px;
            states.push(if velocity >= self.config.min_velocity_px_per_sec && moved {
                ActivityState::Active
            } else {
                ActivityState::Inactive
            });
        }
        states
    }

    /// Index ranges of maximal anchored runs, found greedily left to right.
    fn anchored_runs(&self, samples: &[PointerSample]) -> Vec<std::ops::Range<usize>> {
        let n = samples.len();
        let radius = self.config.anchored_radius_px;
        let fan = direction_fan();
        let mut runs = vec![];
        let mut i = 0;

        while i < n {
            let mut sum_x = samples[i].x;
            let mut sum_y = samples[i].y;
            let mut bounds = Bounds::new(&samples[i]);
            let mut extremes = Extremes::new(&samples[i], &fan);
            let mut j = i;

            while j + 1 < n {
                let next = &samples[j + 1];
                let count = (j + 2 - i) as f64;
                let cx = (sum_x + next.x) / count;
                let cy = (sum_y + next.y) / count;
                let mut grown = bounds;
                grown.include(next);
                let mut reach = extremes;
                reach.include(next, &fan);

                let fits = if grown.max_corner_distance(cx, cy) <= radius {
                    true
                } else {
                    let estimate = reach.farthest_from(cx, cy);
                    if estimate > radius {
                        false
                    } else if estimate <= radius * FAN_COVERAGE {
                        true
                    } else {
                        samples[i..=j + 1]
                            .iter()
                            .all(|s| (s.x - cx).hypot(s.y - cy) <= radius)
                    }
                };
                if !fits {
                    break;
                }

                sum_x += next.x;
                sum_y += next.y;
                bounds = grown;
                extremes = reach;
                j += 1;
            }

            let span = samples[j].timestamp_secs - samples[i].timestamp_secs;
            if j > i && span >= self.config.anchored_duration_secs {
                runs.push(i..j + 1);
                i = j + 1;
            } else {
                i += 1;
            }
        }

        runs
    }

    /// Idle runs long enough to hide the cursor, in output time.
    fn idle_runs(
        &self,
        samples: &[PointerSample],
        states: &[ActivityState],
        duration: f64,
    ) -> Vec<TimeRange> {
        let n = samples.len();
        let threshold = self.config.idle_duration_threshold_secs;
        let mut spans = vec![];

        let mut i = 0;
        while i < n {
            if states[i] == ActivityState::Active {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < n && states[i] == ActivityState::Inactive {
                i += 1;
            }
            let start = if run_start == 0 {
                0.0
            } else {
                samples[run_start].timestamp_secs
            };
            let end = if i == n {
                duration
            } else {
                samples[i].timestamp_secs
            };
            spans.push(TimeRange::new(start, end));
        }

        // Stretches with no samples at all mean the pointer did not move.
        for pair in samples.windows(2) {
            if pair[1].timestamp_secs - pair[0].timestamp_secs >= threshold {
                spans.push(TimeRange::new(pair[0].timestamp_secs, pair[1].timestamp_secs));
            }
        }
        let first = samples[0].timestamp_secs;
        let last = samples[n - 1].timestamp_secs;
        if first >= threshold {
            spans.push(TimeRange::new(0.0, first));
        }
        if duration - last >= threshold {
            spans.push(TimeRange::new(last, duration));
        }

        merge(&spans, 0.0)
            .into_iter()
            .filter(|run| run.duration_secs() >= threshold)
            .collect()
    }
}

/// Axis-aligned bounds of a sample window.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn new(sample: &PointerSample) -> Self {
        Self {
            min_x: sample.x,
            max_x: sample.x,
            min_y: sample.y,
            max_y: sample.y,
        }
    }

    fn include(&mut self, sample: &PointerSample) {
        self.min_x = self.min_x.min(sample.x);
        self.max_x = self.max_x.max(sample.x);
        self.min_y = self.min_y.min(sample.y);
        self.max_y = self.max_y.max(sample.y);
    }

    /// Upper bound on the distance from `(cx, cy)` to any point inside.
    fn max_corner_distance(&self, cx: f64, cy: f64) -> f64 {
        let dx = (cx - self.min_x).abs().max((self.max_x - cx).abs());
        let dy = (cy - self.min_y).abs().max((self.max_y - cy).abs());
        (dx * dx + dy * dy).sqrt()
    }
}

const FAN_DIRECTIONS: usize = 32;

/// `cos(PI / FAN_DIRECTIONS)`: the fan's farthest extreme is at least this
/// fraction of the true farthest distance.
const FAN_COVERAGE: f64 = 0.995_184_726_672_196_9;

fn direction_fan() -> [(f64, f64); FAN_DIRECTIONS] {
    let mut fan = [(0.0, 0.0); FAN_DIRECTIONS];
    for (k, dir) in fan.iter_mut().enumerate() {
        let angle = std::f64::consts::TAU * k as f64 / FAN_DIRECTIONS as f64;
        *dir = (angle.cos(), angle.sin());
    }
    fan
}

/// The sample reaching farthest along each fan direction.
///
/// Distance from any point to the farthest of these bounds the distance to
/// the farthest sample from below within [`FAN_COVERAGE`].
#[derive(Clone, Copy)]
struct Extremes {
    /// `(projection, x, y)` per direction.
    reach: [(f64, f64, f64); FAN_DIRECTIONS],
}

impl Extremes {
    fn new(sample: &PointerSample, fan: &[(f64, f64); FAN_DIRECTIONS]) -> Self {
        let mut reach = [(0.0, sample.x, sample.y); FAN_DIRECTIONS];
        for (slot, (dx, dy)) in reach.iter_mut().zip(fan) {
            slot.0 = sample.x * dx + sample.y * dy;
        }
        Self { reach }
    }

    fn include(&mut self, sample: &PointerSample, fan: &[(f64, f64); FAN_DIRECTIONS]) {
        for (slot, (dx, dy)) in self.reach.iter_mut().zip(fan) {
            let projection = sample.x * dx + sample.y * dy;
            if projection > slot.0 {
                *slot = (projection, sample.x, sample.y);
            }
        }
    }

    fn farthest_from(&self, cx: f64, cy: f64) -> f64 {
        self.reach
            .iter()
            .map(|&(_, x, y)| (x - cx).hypot(y - cy))
            .fold(0.0, f64::max)
    }
}

/// Map into output time, keep `[0, duration]`, and sort.
fn prepare_samples(
    samples: &[PointerSample],
    duration: f64,
    trim: Option<TimeRange>,
) -> Vec<PointerSample> {
    let offset = trim.map(|t| t.start_secs).unwrap_or(0.0);
    let mut prepared: Vec<PointerSample> = samples
        .iter()
        .filter(|s| s.x.is_finite() && s.y.is_finite())
        .filter_map(|s| {
            let t = s.timestamp_secs - offset;
            (t >= 0.0 && t <= duration).then(|| PointerSample {
                timestamp_secs: t,
                ..s.clone()
            })
        })
        .collect();
    prepared.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
    prepared
}
