//! Interval algebra shared by every overlay derivation.
//!
//! All functions are total: unsorted input is sorted, non-finite bounds are
//! dropped, and outputs are always sorted by start and merge-clean.

use framecue_project_model::interval::{Span, TimeRange};

/// Intervals whose clipped length is at or below this are discarded (1 ms).
pub const MIN_INTERVAL_SECS: f64 = 0.001;

/// Sort by start and fold entries where `next.start <= current.end + touch_tolerance`.
///
/// A merged entry keeps the identity of the earliest interval it absorbed.
pub fn merge<S: Span + Clone>(intervals: &[S], touch_tolerance_secs: f64) -> Vec<S> {
    let tolerance = touch_tolerance_secs.max(0.0);

    let mut sorted: Vec<S> = intervals
        .iter()
        .filter(|iv| iv.start_secs().is_finite() && iv.end_secs().is_finite())
        .cloned()
        .collect();
    sorted.sort_by(|a, b| {
        a.start_secs()
            .total_cmp(&b.start_secs())
            .then(a.end_secs().total_cmp(&b.end_secs()))
    });

    let mut merged: Vec<S> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(last) if iv.start_secs() <= last.end_secs() + tolerance => {
                if iv.end_secs() > last.end_secs() {
                    *last = last.with_bounds(last.start_secs(), iv.end_secs());
                }
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Clip every interval into `[range_start, range_end]`, drop slivers of
/// [`MIN_INTERVAL_SECS`] or less, then merge touching entries.
pub fn clamp_to_range<S: Span + Clone>(
    intervals: &[S],
    range_start: f64,
    range_end: f64,
) -> Vec<S> {
    if !(range_end > range_start) {
        return vec![];
    }

    let clipped: Vec<S> = intervals
        .iter()
        .filter_map(|iv| {
            let start = iv.start_secs().max(range_start);
            let end = iv.end_secs().min(range_end);
            (end - start > MIN_INTERVAL_SECS).then(|| iv.with_bounds(start, end))
        })
        .collect();

    merge(&clipped, 0.0)
}

/// The parts of `intervals` that overlap `range`, clipped to it.
pub fn intersect<S: Span + Clone>(range: TimeRange, intervals: &[S]) -> Vec<S> {
    merge(intervals, 0.0)
        .into_iter()
        .filter(|iv| iv.start_secs() < range.end_secs && iv.end_secs() > range.start_secs)
        .map(|iv| {
            iv.with_bounds(
                iv.start_secs().max(range.start_secs),
                iv.end_secs().min(range.end_secs),
            )
        })
        .collect()
}

/// The gaps inside `range` not covered by `intervals`.
pub fn complement<S: Span + Clone>(range: TimeRange, intervals: &[S]) -> Vec<TimeRange> {
    let mut gaps = vec![];
    let mut cursor = range.start_secs;

    for iv in intersect(range, intervals) {
        if iv.start_secs() > cursor {
            gaps.push(TimeRange::new(cursor, iv.start_secs()));
        }
        cursor = cursor.max(iv.end_secs());
    }

    if range.end_secs > cursor {
        gaps.push(TimeRange::new(cursor, range.end_secs));
    }
    gaps
}

/// Sum of interval lengths after merging.
pub fn total_duration<S: Span + Clone>(intervals: &[S]) -> f64 {
    merge(intervals, 0.0).iter().map(Span::duration_secs).sum()
}

/// Whether the list is sorted and no two entries overlap or sit within
/// `touch_tolerance_secs` of each other.
pub fn is_merge_clean<S: Span>(intervals: &[S], touch_tolerance_secs: f64) -> bool {
    intervals.iter().all(|iv| iv.start_secs() <= iv.end_secs())
        && intervals
            .windows(2)
            .all(|w| w[1].start_secs() > w[0].end_secs() + touch_tolerance_secs.max(0.0))
}
