//! Time-indexed view over a pointer sample stream.
//!
//! Capture may deliver slightly out-of-order samples, so the track keeps its
//! own sorted copy and answers position, speed and click queries by binary
//! search with linear interpolation between bracketing samples.

use framecue_project_model::event::PointerSample;
use framecue_project_model::viewport::Point2D;

/// Sorted, owned pointer samples.
#[derive(Debug, Clone, Default)]
pub struct PointerTrack {
    samples: Vec<PointerSample>,
}

impl PointerTrack {
    /// Build a track, dropping samples with non-finite fields and sorting by
    /// timestamp (stable, so equal timestamps keep capture order).
    pub fn new(samples: &[PointerSample]) -> Self {
        let mut samples: Vec<PointerSample> = samples
            .iter()
            .filter(|s| s.timestamp_secs.is_finite() && s.x.is_finite() && s.y.is_finite())
            .cloned()
            .collect();
        samples.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
        Self { samples }
    }

    pub fn samples(&self) -> &[PointerSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interpolated position at `time_secs`, clamped to the first/last sample.
    pub fn position_at(&self, time_secs: f64) -> Option<Point2D> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;

        if !(time_secs > first.timestamp_secs) {
            return Some(Point2D::new(first.x, first.y));
        }
        if time_secs >= last.timestamp_secs {
            return Some(Point2D::new(last.x, last.y));
        }

        // First sample strictly after `time_secs`; always in 1..len here.
        let idx = self
            .samples
            .partition_point(|s| s.timestamp_secs <= time_secs);
        let a = &self.samples[idx - 1];
        let b = &self.samples[idx];

        let span = b.timestamp_secs - a.timestamp_secs;
        if span <= f64::EPSILON {
            return Some(Point2D::new(b.x, b.y));
        }

        let t = (time_secs - a.timestamp_secs) / span;
        Some(Point2D::lerp(
            &Point2D::new(a.x, a.y),
            &Point2D::new(b.x, b.y),
            t,
        ))
    }

    /// Centered finite-difference speed `|p(t+w) - p(t-w)| / 2w` in px/s.
    ///
    /// A non-positive window or an empty track reads as zero speed.
    pub fn speed_at(&self, time_secs: f64, window_secs: f64) -> f64 {
        if !(window_secs > 0.0) {
            return 0.0;
        }
        match (
            self.position_at(time_secs + window_secs),
            self.position_at(time_secs - window_secs),
        ) {
            (Some(ahead), Some(behind)) => ahead.distance_to(&behind) / (2.0 * window_secs),
            _ => 0.0,
        }
    }

    /// Whether any sample in `[from_secs, to_secs]` carries the click flag.
    pub fn has_click_between(&self, from_secs: f64, to_secs: f64) -> bool {
        let start = self.samples.partition_point(|s| s.timestamp_secs < from_secs);
        self.samples[start..]
            .iter()
            .take_while(|s| s.timestamp_secs <= to_secs)
            .any(|s| s.is_clicked)
    }
}
