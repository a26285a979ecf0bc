//! Eased opacity and scale for interval-driven overlays.
//!
//! Preview playback and export both call [`VisibilityCurve::evaluate`] for
//! every frame, in any time order. It holds no state and does not allocate.

use framecue_project_model::interval::Span;
use framecue_project_model::timeline::EasingFunction;

/// Opacity and scale of an overlay at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    /// In `[0, 1]`.
    pub opacity: f64,
    pub scale: f64,
}

impl Visibility {
    pub const VISIBLE: Visibility = Visibility {
        opacity: 1.0,
        scale: 1.0,
    };
}

/// Fade timings and scale endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityCurve {
    /// Ramp-in length before each interval start (seconds).
    pub fade_in_secs: f64,
    /// Ramp-out length after each interval end (seconds).
    pub fade_out_secs: f64,
    pub scale_hidden: f64,
    pub scale_visible: f64,
}

impl VisibilityCurve {
    pub const DEFAULT: VisibilityCurve = VisibilityCurve {
        fade_in_secs: 0.2,
        fade_out_secs: 0.25,
        scale_hidden: 0.5,
        scale_visible: 1.0,
    };

    /// Visibility at `time_secs`.
    ///
    /// `None` means the overlay is not interval-driven and is always shown.
    /// An empty list means it is never shown. Intervals are expected sorted
    /// and non-overlapping. Priority is by zone across the whole list, not by
    /// scan order: containment in any interval beats a fade-in, and a fade-in
    /// beats a fade-out, so a gap shorter than both fades shows the next
    /// interval's entrance rather than the previous one's exit.
    pub fn evaluate<S: Span>(&self, time_secs: f64, intervals: Option<&[S]>) -> Visibility {
        let Some(intervals) = intervals else {
            return Visibility::VISIBLE;
        };

        if intervals.iter().any(|iv| iv.contains(time_secs)) {
            return self.at_fraction(1.0);
        }

        if self.fade_in_secs > 0.0 {
            let entering = intervals.iter().find(|iv| {
                time_secs >= iv.start_secs() - self.fade_in_secs && time_secs < iv.start_secs()
            });
            if let Some(iv) = entering {
                let progress =
                    (time_secs - (iv.start_secs() - self.fade_in_secs)) / self.fade_in_secs;
                return self.at_fraction(EasingFunction::EaseOutCubic.apply(progress));
            }
        }

        if self.fade_out_secs > 0.0 {
            let leaving = intervals.iter().find(|iv| {
                time_secs > iv.end_secs() && time_secs <= iv.end_secs() + self.fade_out_secs
            });
            if let Some(iv) = leaving {
                let progress = (time_secs - iv.end_secs()) / self.fade_out_secs;
                return self.at_fraction(1.0 - EasingFunction::EaseInCubic.apply(progress));
            }
        }

        self.at_fraction(0.0)
    }

    fn at_fraction(&self, fraction: f64) -> Visibility {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Visibility {
            opacity: fraction,
            scale: self.scale_hidden + (self.scale_visible - self.scale_hidden) * fraction,
        }
    }
}

impl Default for VisibilityCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`VisibilityCurve::DEFAULT`] evaluated at `time_secs`.
pub fn visibility_at<S: Span>(time_secs: f64, intervals: Option<&[S]>) -> Visibility {
    VisibilityCurve::DEFAULT.evaluate(time_secs, intervals)
}
