//! Segment-level edit actions.
//!
//! Wires the detectors and the synthesizer to a [`Segment`]: each action reads
//! the immutable input streams, derives a brand-new overlay, and replaces the
//! stored one. Manual edits keep interval lists merge-clean.

use framecue_project_model::event::{KeystrokeEvent, PointerSample, RawInputEvent};
use framecue_project_model::interval::{DisplayInterval, Span};
use framecue_project_model::timeline::{KeystrokeMode, Segment};
use uuid::Uuid;

use crate::auto_zoom::{AutoZoomConfig, AutoZoomOutput, AutoZoomSynthesizer, FrameSize};
use crate::cursor_activity::{CursorActivityConfig, CursorActivityDetector};
use crate::intervals::clamp_to_range;
use crate::keystroke::{DelayMigration, KeystrokeBuilder, KeystrokeConfig};

/// Which interval list of a segment an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Cursor,
    Keystrokes,
}

/// Applies derivations to segments.
pub struct OverlayEditor {
    cursor: CursorActivityDetector,
    keystrokes: KeystrokeBuilder,
    zoom: AutoZoomSynthesizer,
}

impl OverlayEditor {
    pub fn new(
        cursor: CursorActivityConfig,
        keystrokes: KeystrokeConfig,
        zoom: AutoZoomConfig,
    ) -> Self {
        Self {
            cursor: CursorActivityDetector::new(cursor),
            keystrokes: KeystrokeBuilder::new(keystrokes),
            zoom: AutoZoomSynthesizer::new(zoom),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            CursorActivityConfig::default(),
            KeystrokeConfig::default(),
            AutoZoomConfig::default(),
        )
    }

    pub fn cursor_detector(&self) -> &CursorActivityDetector {
        &self.cursor
    }

    pub fn keystroke_builder(&self) -> &KeystrokeBuilder {
        &self.keystrokes
    }

    pub fn synthesizer(&self) -> &AutoZoomSynthesizer {
        &self.zoom
    }

    /// Re-derive the cursor windows from the pointer stream.
    pub fn regenerate_cursor_visibility(&self, segment: &mut Segment, samples: &[PointerSample]) {
        let intervals = self
            .cursor
            .detect(samples, segment.duration_secs(), Some(segment.trim));
        tracing::debug!(
            segment = %segment.id,
            intervals = intervals.len(),
            "Cursor visibility regenerated"
        );
        segment.cursor.intervals = intervals;
    }

    /// Keystroke events mapped into the segment's output time.
    pub fn segment_keystrokes(
        &self,
        segment: &Segment,
        raw: &[RawInputEvent],
    ) -> Vec<KeystrokeEvent> {
        let offset = segment.trim.start_secs;
        self.keystrokes
            .build_events(raw)
            .into_iter()
            .map(|mut event| {
                event.start_secs -= offset;
                event.end_secs -= offset;
                event
            })
            .collect()
    }

    /// Re-derive badge windows for the segment's mode and delay.
    pub fn regenerate_keystroke_visibility(&self, segment: &mut Segment, raw: &[RawInputEvent]) {
        let events = self.segment_keystrokes(segment, raw);
        let intervals = self.keystrokes.generate_segments(
            &events,
            segment.keystrokes.mode,
            segment.duration_secs(),
            segment.keystrokes.delay_secs,
        );
        tracing::debug!(
            segment = %segment.id,
            mode = ?segment.keystrokes.mode,
            intervals = intervals.len(),
            "Keystroke visibility regenerated"
        );
        segment.keystrokes.intervals = Some(intervals);
    }

    /// Switch the badge mode and regenerate.
    pub fn set_keystroke_mode(
        &self,
        segment: &mut Segment,
        mode: KeystrokeMode,
        raw: &[RawInputEvent],
    ) {
        segment.keystrokes.mode = mode;
        self.regenerate_keystroke_visibility(segment, raw);
    }

    /// Change the global badge delay.
    ///
    /// Stored windows follow the new delay only when they are still the
    /// auto-generated ones for the old delay; hand-edited windows are kept.
    pub fn set_keystroke_delay(
        &self,
        segment: &mut Segment,
        delay_secs: f64,
        raw: &[RawInputEvent],
    ) -> DelayMigration {
        let old_delay = segment.keystrokes.delay_secs;
        let new_delay = self.keystrokes.clamp_delay(delay_secs);
        segment.keystrokes.delay_secs = new_delay;

        let events = self.segment_keystrokes(segment, raw);
        let outcome = match &segment.keystrokes.intervals {
            None => DelayMigration::Migrated(self.keystrokes.generate_segments(
                &events,
                segment.keystrokes.mode,
                segment.duration_secs(),
                new_delay,
            )),
            Some(stored) => self.keystrokes.migrate_for_delay_change(
                stored,
                &events,
                segment.keystrokes.mode,
                segment.duration_secs(),
                old_delay,
                new_delay,
            ),
        };

        if let DelayMigration::Migrated(intervals) = &outcome {
            segment.keystrokes.intervals = Some(intervals.clone());
        }
        outcome
    }

    /// Turn auto-zoom on (generating a fresh path) or off (discarding it).
    ///
    /// Returns whether a camera path is now available.
    pub fn set_auto_zoom(
        &self,
        segment: &mut Segment,
        enabled: bool,
        samples: &[PointerSample],
        frame: FrameSize,
    ) -> bool {
        if !enabled {
            apply_auto_zoom(segment, None);
            return false;
        }
        let output = self
            .zoom
            .generate(samples, segment.trim, &segment.zoom.keyframes, frame);
        apply_auto_zoom(segment, Some(output))
    }
}

/// Store a synthesis result on the segment; `None` disables auto-zoom.
///
/// Returns whether a camera path is now available.
pub fn apply_auto_zoom(segment: &mut Segment, output: Option<AutoZoomOutput>) -> bool {
    match output {
        Some(output) if !output.is_empty() => {
            segment.zoom.auto_zoom = true;
            segment.zoom.camera_path = output.camera_path;
            segment.zoom.influence_points = output.influence_points;
            true
        }
        Some(_) => {
            tracing::warn!(segment = %segment.id, "Auto-zoom unavailable for segment");
            segment.zoom.auto_zoom = false;
            segment.zoom.camera_path.clear();
            segment.zoom.influence_points.clear();
            false
        }
        None => {
            segment.zoom.auto_zoom = false;
            segment.zoom.camera_path.clear();
            segment.zoom.influence_points.clear();
            false
        }
    }
}

fn intervals_mut(segment: &mut Segment, kind: OverlayKind) -> &mut Vec<DisplayInterval> {
    match kind {
        OverlayKind::Cursor => &mut segment.cursor.intervals,
        OverlayKind::Keystrokes => segment.keystrokes.intervals.get_or_insert_with(Vec::new),
    }
}

fn normalize(intervals: &mut Vec<DisplayInterval>, duration_secs: f64) {
    *intervals = clamp_to_range(intervals, 0.0, duration_secs);
}

/// Draw a new window. Returns the identity of the window that now covers it,
/// which is an existing one when the new window merged into it.
pub fn add_interval(
    segment: &mut Segment,
    kind: OverlayKind,
    start_secs: f64,
    end_secs: f64,
) -> Option<Uuid> {
    let duration = segment.duration_secs();
    let added = DisplayInterval::new(start_secs, end_secs);
    let midpoint = (added.start_secs + added.end_secs) / 2.0;

    let intervals = intervals_mut(segment, kind);
    intervals.push(added);
    normalize(intervals, duration);
    intervals.iter().find(|iv| iv.contains(midpoint)).map(|iv| iv.id)
}

/// Move the bounds of window `id`. Returns false when it does not exist.
pub fn resize_interval(
    segment: &mut Segment,
    kind: OverlayKind,
    id: Uuid,
    start_secs: f64,
    end_secs: f64,
) -> bool {
    let duration = segment.duration_secs();
    let intervals = intervals_mut(segment, kind);
    let Some(target) = intervals.iter_mut().find(|iv| iv.id == id) else {
        return false;
    };
    *target = target.with_bounds(start_secs, end_secs);
    normalize(intervals, duration);
    true
}

/// Delete window `id`. Returns false when it does not exist.
pub fn remove_interval(segment: &mut Segment, kind: OverlayKind, id: Uuid) -> bool {
    let intervals = intervals_mut(segment, kind);
    let before = intervals.len();
    intervals.retain(|iv| iv.id != id);
    intervals.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::is_merge_clean;
    use framecue_project_model::history::EditHistory;
    use framecue_project_model::interval::TimeRange;

    fn moving_then_still(offset: f64) -> Vec<PointerSample> {
        (0..600)
            .map(|i| {
                let t = i as f64 / 60.0;
                let x = if t < 2.0 { t * 200.0 } else { 400.0 };
                PointerSample::new(offset + t, x, 100.0)
            })
            .collect()
    }

    fn taps(times: &[f64]) -> Vec<RawInputEvent> {
        times
            .iter()
            .map(|&t| RawInputEvent::key_tap(t, "KeyK"))
            .collect()
    }

    #[test]
    fn test_regenerate_cursor_uses_trim() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(5.0, 15.0);
        segment.cursor.hide_when_idle = true;

        editor.regenerate_cursor_visibility(&mut segment, &moving_then_still(5.0));
        let intervals = segment.cursor_visibility().unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start_secs, 0.0);
        assert!(intervals[0].end_secs > 2.0 && intervals[0].end_secs < 3.0);
    }

    #[test]
    fn test_regenerate_keystrokes_maps_trim() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(10.0, 20.0);
        editor.regenerate_keystroke_visibility(&mut segment, &taps(&[12.0, 30.0]));

        let intervals = segment.keystroke_visibility().unwrap();
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start_secs - 1.95).abs() < 1e-9);
    }

    #[test]
    fn test_off_mode_stores_empty_list() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(0.0, 10.0);
        editor.set_keystroke_mode(&mut segment, KeystrokeMode::Off, &taps(&[1.0]));
        assert_eq!(segment.keystroke_visibility(), Some(&[][..]));
    }

    #[test]
    fn test_delay_change_migrates_auto_windows() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(0.0, 10.0);
        let raw = taps(&[2.0]);
        editor.regenerate_keystroke_visibility(&mut segment, &raw);

        let outcome = editor.set_keystroke_delay(&mut segment, 0.5, &raw);
        assert!(matches!(outcome, DelayMigration::Migrated(_)));
        assert_eq!(segment.keystrokes.delay_secs, 0.5);
        let start = segment.keystroke_visibility().unwrap()[0].start_secs;
        assert!((start - 2.45).abs() < 1e-9);
    }

    #[test]
    fn test_delay_change_keeps_hand_edits() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(0.0, 10.0);
        let raw = taps(&[2.0]);
        editor.regenerate_keystroke_visibility(&mut segment, &raw);
        add_interval(&mut segment, OverlayKind::Keystrokes, 6.0, 7.0);
        let edited = segment.keystrokes.intervals.clone();

        let outcome = editor.set_keystroke_delay(&mut segment, 0.5, &raw);
        assert_eq!(outcome, DelayMigration::Preserved);
        assert_eq!(segment.keystrokes.intervals, edited);
        assert_eq!(segment.keystrokes.delay_secs, 0.5);
    }

    #[test]
    fn test_delay_is_clamped_on_segment() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(0.0, 10.0);
        editor.set_keystroke_delay(&mut segment, 3.0, &[]);
        assert_eq!(segment.keystrokes.delay_secs, 1.0);
        assert_eq!(segment.keystroke_visibility(), Some(&[][..]));
    }

    #[test]
    fn test_auto_zoom_toggle() {
        let editor = OverlayEditor::with_defaults();
        let mut segment = Segment::new(0.0, 2.0);
        let frame = FrameSize::new(1920, 1080);

        assert!(editor.set_auto_zoom(&mut segment, true, &moving_then_still(0.0), frame));
        assert!(segment.zoom.auto_zoom);
        assert!(!segment.zoom.camera_path.is_empty());
        assert_eq!(segment.zoom.influence_points.len(), 2);

        assert!(!editor.set_auto_zoom(&mut segment, false, &[], frame));
        assert!(segment.zoom.camera_path.is_empty());
        assert!(segment.zoom.influence_points.is_empty());

        assert!(!editor.set_auto_zoom(&mut segment, true, &[], frame));
        assert!(!segment.zoom.auto_zoom);
    }

    #[test]
    fn test_manual_edits_stay_merge_clean() {
        let mut segment = Segment::new(0.0, 10.0);
        let first = add_interval(&mut segment, OverlayKind::Cursor, 1.0, 2.0).unwrap();
        add_interval(&mut segment, OverlayKind::Cursor, 4.0, 5.0);
        let merged = add_interval(&mut segment, OverlayKind::Cursor, 1.5, 3.0);
        assert_eq!(merged, Some(first));
        assert_eq!(segment.cursor.intervals.len(), 2);

        // Dragging the first window over the second joins them.
        assert!(resize_interval(&mut segment, OverlayKind::Cursor, first, 1.0, 4.5));
        assert_eq!(segment.cursor.intervals.len(), 1);
        assert_eq!(segment.cursor.intervals[0].range(), TimeRange::new(1.0, 5.0));

        add_interval(&mut segment, OverlayKind::Cursor, 8.0, 12.0);
        assert_eq!(segment.cursor.intervals[1].end_secs, 10.0);
        assert!(is_merge_clean(&segment.cursor.intervals, 0.0));

        assert!(remove_interval(&mut segment, OverlayKind::Cursor, first));
        assert!(!remove_interval(&mut segment, OverlayKind::Cursor, first));
        assert_eq!(segment.cursor.intervals.len(), 1);
    }

    #[test]
    fn test_resize_unknown_interval() {
        let mut segment = Segment::new(0.0, 10.0);
        assert!(!resize_interval(
            &mut segment,
            OverlayKind::Cursor,
            Uuid::new_v4(),
            0.0,
            1.0
        ));
    }

    #[test]
    fn test_edits_undo_through_history() {
        let mut history = EditHistory::new(10);
        let mut segment = Segment::new(0.0, 10.0);
        let id = add_interval(&mut segment, OverlayKind::Cursor, 1.0, 2.0).unwrap();
        let original = segment.clone();

        history.begin_batch(&segment);
        for end in [2.5, 3.0, 3.5] {
            resize_interval(&mut segment, OverlayKind::Cursor, id, 1.0, end);
        }
        history.commit_batch(&segment);
        assert_eq!(segment.cursor.intervals[0].end_secs, 3.5);

        let restored = history.undo(&segment).unwrap();
        assert_eq!(restored, original);
        assert!(history.can_redo());
    }
}
