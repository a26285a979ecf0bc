//! Time intervals on the output timeline.
//!
//! A [`DisplayInterval`] is a "show this overlay during this window"
//! instruction. Lists of them are kept sorted and merge-clean by the
//! processing core; the model only guarantees `start_secs <= end_secs`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything with a `[start, end]` extent in seconds.
pub trait Span {
    fn start_secs(&self) -> f64;

    fn end_secs(&self) -> f64;

    /// Copy of `self` with new bounds, keeping any identity.
    fn with_bounds(&self, start_secs: f64, end_secs: f64) -> Self
    where
        Self: Sized;

    fn duration_secs(&self) -> f64 {
        (self.end_secs() - self.start_secs()).max(0.0)
    }

    /// Inclusive containment.
    fn contains(&self, time_secs: f64) -> bool {
        time_secs >= self.start_secs() && time_secs <= self.end_secs()
    }
}

/// A bare time range without identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeRange {
    /// Create a range; reversed bounds are swapped.
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        if start_secs <= end_secs {
            Self {
                start_secs,
                end_secs,
            }
        } else {
            Self {
                start_secs: end_secs,
                end_secs: start_secs,
            }
        }
    }
}

impl Span for TimeRange {
    fn start_secs(&self) -> f64 {
        self.start_secs
    }

    fn end_secs(&self) -> f64 {
        self.end_secs
    }

    fn with_bounds(&self, start_secs: f64, end_secs: f64) -> Self {
        TimeRange::new(start_secs, end_secs)
    }
}

/// A window during which an overlay is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInterval {
    /// Stable identity for UI binding.
    pub id: Uuid,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl DisplayInterval {
    /// Create an interval with a fresh identity; reversed bounds are swapped.
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        let range = TimeRange::new(start_secs, end_secs);
        Self {
            id: Uuid::new_v4(),
            start_secs: range.start_secs,
            end_secs: range.end_secs,
        }
    }

    /// The bounds without identity.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_secs, self.end_secs)
    }
}

impl From<TimeRange> for DisplayInterval {
    fn from(range: TimeRange) -> Self {
        DisplayInterval::new(range.start_secs, range.end_secs)
    }
}

impl Span for DisplayInterval {
    fn start_secs(&self) -> f64 {
        self.start_secs
    }

    fn end_secs(&self) -> f64 {
        self.end_secs
    }

    fn with_bounds(&self, start_secs: f64, end_secs: f64) -> Self {
        let range = TimeRange::new(start_secs, end_secs);
        Self {
            id: self.id,
            start_secs: range.start_secs,
            end_secs: range.end_secs,
        }
    }
}

/// Whether two interval lists have the same length and every boundary
/// agrees within `tolerance_secs`. Identities are ignored.
pub fn bounds_equivalent<A: Span, B: Span>(a: &[A], b: &[B], tolerance_secs: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            (x.start_secs() - y.start_secs()).abs() <= tolerance_secs
                && (x.end_secs() - y.end_secs()).abs() <= tolerance_secs
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let iv = DisplayInterval::new(5.0, 2.0);
        assert_eq!(iv.start_secs, 2.0);
        assert_eq!(iv.end_secs, 5.0);
        assert!((iv.duration_secs() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_bounds_keeps_identity() {
        let iv = DisplayInterval::new(1.0, 2.0);
        let moved = iv.with_bounds(1.5, 4.0);
        assert_eq!(moved.id, iv.id);
        assert_eq!(moved.range(), TimeRange::new(1.5, 4.0));
    }

    #[test]
    fn test_fresh_identities_differ() {
        let a = DisplayInterval::new(0.0, 1.0);
        let b = DisplayInterval::new(0.0, 1.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = TimeRange::new(1.0, 2.0);
        assert!(range.contains(1.0));
        assert!(range.contains(2.0));
        assert!(!range.contains(2.0001));
    }

    #[test]
    fn test_bounds_equivalent_ignores_ids() {
        let a = vec![DisplayInterval::new(0.0, 1.0), DisplayInterval::new(2.0, 3.0)];
        let b = vec![TimeRange::new(0.0002, 1.0), TimeRange::new(2.0, 2.9996)];
        assert!(bounds_equivalent(&a, &b, 0.0005));
        assert!(!bounds_equivalent(&a, &b, 0.0001));
        assert!(!bounds_equivalent(&a, &b[..1], 1.0));
    }
}
