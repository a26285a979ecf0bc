//! Keystroke badges: rebuild logical presses from raw input and derive the
//! windows during which the badge overlay is shown.

use std::collections::HashMap;

use framecue_project_model::event::{
    ButtonState, KeystrokeEvent, KeystrokeKind, Modifiers, MouseButton, RawInputEvent,
    RawInputKind, WheelDirection,
};
use framecue_project_model::interval::{bounds_equivalent, DisplayInterval, TimeRange};
use framecue_project_model::timeline::KeystrokeMode;
use uuid::Uuid;

use crate::intervals::{clamp_to_range, merge};

/// Tuning for keystroke reconstruction and badge windows.
#[derive(Debug, Clone)]
pub struct KeystrokeConfig {
    /// Display time for a press without a matching release, and for
    /// instantaneous events (seconds).
    pub default_display_secs: f64,

    /// A released press stays visible at least this long after its start.
    pub min_release_display_secs: f64,

    /// Presses held longer than this are flagged as holds.
    pub hold_threshold_secs: f64,

    /// Lead time before each badge window.
    pub margin_before_secs: f64,

    /// Tail time after each badge window.
    pub margin_after_secs: f64,

    /// Badge windows closer than this are joined.
    pub merge_gap_secs: f64,

    /// Global delay is clamped to `[-max, max]`.
    pub max_delay_secs: f64,

    /// Per-boundary tolerance when deciding whether stored windows are
    /// still the auto-generated ones.
    pub migration_tolerance_secs: f64,
}

impl Default for KeystrokeConfig {
    fn default() -> Self {
        Self {
            default_display_secs: 1.2,
            min_release_display_secs: 0.6,
            hold_threshold_secs: 0.2,
            margin_before_secs: 0.05,
            margin_after_secs: 0.15,
            merge_gap_secs: 0.1,
            max_delay_secs: 1.0,
            migration_tolerance_secs: 0.0005,
        }
    }
}

/// Outcome of re-deriving badge windows after a delay change.
#[derive(Debug, Clone, PartialEq)]
pub enum DelayMigration {
    /// The stored list matched the old auto-generated windows and was
    /// replaced by the windows for the new delay.
    Migrated(Vec<DisplayInterval>),
    /// The stored list had been edited by hand and must be kept as is.
    Preserved,
}

/// Identity shared by the down and up halves of one press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PressToken {
    Key(String),
    VirtualKey(u32),
    Button(Option<MouseButton>),
}

/// Builds keystroke events and badge windows.
pub struct KeystrokeBuilder {
    config: KeystrokeConfig,
}

impl KeystrokeBuilder {
    pub fn new(config: KeystrokeConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(KeystrokeConfig::default())
    }

    pub fn config(&self) -> &KeystrokeConfig {
        &self.config
    }

    /// Rebuild logical presses from a raw input stream.
    ///
    /// Down events are matched with the next up event for the same key or
    /// button. Repeated downs while a press is open are auto-repeat and are
    /// ignored. Modifier-only key presses produce no event of their own.
    pub fn build_events(&self, raw: &[RawInputEvent]) -> Vec<KeystrokeEvent> {
        let mut sorted: Vec<&RawInputEvent> = raw
            .iter()
            .filter(|e| e.timestamp_secs.is_finite())
            .collect();
        sorted.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));

        let mut events: Vec<KeystrokeEvent> = Vec::new();
        let mut open: HashMap<PressToken, usize> = HashMap::new();

        for raw in sorted {
            let t = raw.timestamp_secs;
            let (token, kind) = match &raw.kind {
                RawInputKind::Keyboard { key, vk_code } => {
                    if is_modifier_only(key.as_deref(), *vk_code) {
                        continue;
                    }
                    let token = match (key, vk_code) {
                        (Some(key), _) => PressToken::Key(key.clone()),
                        (None, Some(code)) => PressToken::VirtualKey(*code),
                        (None, None) => continue,
                    };
                    (Some(token), KeystrokeKind::Keyboard)
                }
                RawInputKind::Mousedown { button } => {
                    (Some(PressToken::Button(*button)), KeystrokeKind::Mouse)
                }
                RawInputKind::Wheel { .. } => (None, KeystrokeKind::Wheel),
            };

            match (token, raw.direction) {
                (Some(token), Some(ButtonState::Down)) => {
                    if open.contains_key(&token) {
                        continue;
                    }
                    open.insert(token, events.len());
                    events.push(self.new_event(raw, kind, t));
                }
                (Some(token), Some(ButtonState::Up)) => {
                    let Some(index) = open.remove(&token) else {
                        tracing::trace!(time = t, "Release without matching press ignored");
                        continue;
                    };
                    let event = &mut events[index];
                    let held = t - event.start_secs;
                    event.end_secs = t.max(event.start_secs + self.config.min_release_display_secs);
                    event.is_hold = held > self.config.hold_threshold_secs;
                }
                _ => events.push(self.new_event(raw, kind, t)),
            }
        }

        tracing::debug!(
            raw = raw.len(),
            events = events.len(),
            unreleased = open.len(),
            "Keystroke events rebuilt"
        );
        events
    }

    fn new_event(&self, raw: &RawInputEvent, kind: KeystrokeKind, start: f64) -> KeystrokeEvent {
        let (key, button) = match &raw.kind {
            RawInputKind::Keyboard { key, vk_code } => (
                key.clone().or_else(|| vk_code.map(|code| format!("vk:{code}"))),
                None,
            ),
            RawInputKind::Mousedown { button } => (None, *button),
            RawInputKind::Wheel { .. } => (None, None),
        };

        KeystrokeEvent {
            id: Uuid::new_v4(),
            kind,
            start_secs: start,
            end_secs: start + self.config.default_display_secs,
            label: label_for(&raw.kind, raw.modifiers),
            is_hold: false,
            modifiers: raw.modifiers,
            key,
            button,
        }
    }

    /// Per-event display windows after mode filtering, with each window's
    /// end trimmed to the start of the next shown event.
    pub fn effective_windows(
        &self,
        events: &[KeystrokeEvent],
        mode: KeystrokeMode,
    ) -> Vec<TimeRange> {
        let mut shown: Vec<&KeystrokeEvent> = events
            .iter()
            .filter(|e| mode_shows(mode, e.kind))
            .filter(|e| e.start_secs.is_finite() && e.end_secs.is_finite())
            .collect();
        shown.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));

        shown
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let mut end = event.end_secs;
                if let Some(next) = shown.get(i + 1) {
                    end = end.min(next.start_secs);
                }
                TimeRange::new(event.start_secs, end.max(event.start_secs))
            })
            .collect()
    }

    /// Badge windows for `events` on a timeline of `duration_secs`.
    pub fn generate_segments(
        &self,
        events: &[KeystrokeEvent],
        mode: KeystrokeMode,
        duration_secs: f64,
        delay_secs: f64,
    ) -> Vec<DisplayInterval> {
        if mode == KeystrokeMode::Off || !(duration_secs > 0.0) {
            return vec![];
        }
        let delay = self.clamp_delay(delay_secs);

        let padded: Vec<TimeRange> = self
            .effective_windows(events, mode)
            .into_iter()
            .map(|w| {
                TimeRange::new(
                    w.start_secs - self.config.margin_before_secs + delay,
                    w.end_secs + self.config.margin_after_secs + delay,
                )
            })
            .collect();

        let clipped = clamp_to_range(&padded, 0.0, duration_secs);
        merge(&clipped, self.config.merge_gap_secs)
            .into_iter()
            .map(DisplayInterval::from)
            .collect()
    }

    /// Clamp a global delay to the configured range; NaN reads as no delay.
    pub fn clamp_delay(&self, delay_secs: f64) -> f64 {
        if delay_secs.is_nan() {
            return 0.0;
        }
        let max = self.config.max_delay_secs.abs();
        delay_secs.clamp(-max, max)
    }

    /// Re-derive stored windows after a delay change.
    ///
    /// The stored list is replaced only when it matches, boundary by boundary,
    /// what auto-generation produced with the old delay. Anything else is
    /// treated as hand-edited and preserved.
    pub fn migrate_for_delay_change(
        &self,
        stored: &[DisplayInterval],
        events: &[KeystrokeEvent],
        mode: KeystrokeMode,
        duration_secs: f64,
        old_delay_secs: f64,
        new_delay_secs: f64,
    ) -> DelayMigration {
        let baseline = self.generate_segments(events, mode, duration_secs, old_delay_secs);
        if !bounds_equivalent(stored, &baseline, self.config.migration_tolerance_secs) {
            tracing::info!(
                stored = stored.len(),
                baseline = baseline.len(),
                "Keystroke windows were edited by hand; keeping them"
            );
            return DelayMigration::Preserved;
        }

        let migrated = self.generate_segments(events, mode, duration_secs, new_delay_secs);
        tracing::debug!(
            old_delay = old_delay_secs,
            new_delay = new_delay_secs,
            intervals = migrated.len(),
            "Keystroke windows migrated to new delay"
        );
        DelayMigration::Migrated(migrated)
    }
}

/// Whether events of `kind` get a badge in `mode`.
pub fn mode_shows(mode: KeystrokeMode, kind: KeystrokeKind) -> bool {
    match mode {
        KeystrokeMode::Off => false,
        KeystrokeMode::Keyboard => kind == KeystrokeKind::Keyboard,
        KeystrokeMode::KeyboardMouse => true,
    }
}

fn label_for(kind: &RawInputKind, modifiers: Modifiers) -> String {
    let name = match kind {
        RawInputKind::Keyboard { key, vk_code } => match (key, vk_code) {
            (Some(key), _) => key_display_name(key),
            (None, Some(code)) => vk_display_name(*code),
            (None, None) => "Key".to_string(),
        },
        RawInputKind::Mousedown { button } => match button {
            Some(button) => format!("{} Click", button.display_name()),
            None => "Click".to_string(),
        },
        RawInputKind::Wheel { scroll } => match scroll {
            Some(WheelDirection::Up) => "↑ Scroll".to_string(),
            Some(WheelDirection::Down) => "↓ Scroll".to_string(),
            Some(WheelDirection::Left) => "← Scroll".to_string(),
            Some(WheelDirection::Right) => "→ Scroll".to_string(),
            None => "Scroll".to_string(),
        },
    };

    modifiers
        .labels()
        .map(str::to_string)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Badge text for a named key (`KeyS` → `S`, `ArrowUp` → `↑`).
pub fn key_display_name(key: &str) -> String {
    if let Some(letter) = key.strip_prefix("Key").filter(|rest| rest.len() == 1) {
        return letter.to_ascii_uppercase();
    }
    if let Some(digit) = key.strip_prefix("Digit").filter(|rest| rest.len() == 1) {
        return digit.to_string();
    }
    if let Some(rest) = key.strip_prefix("Numpad") {
        return format!("Num {rest}");
    }

    let named = match key {
        "ArrowUp" | "Up" => "↑",
        "ArrowDown" | "Down" => "↓",
        "ArrowLeft" | "Left" => "←",
        "ArrowRight" | "Right" => "→",
        "Escape" | "Esc" => "Esc",
        " " | "Space" | "Spacebar" => "Space",
        "Enter" | "Return" => "Enter",
        "Backspace" => "Backspace",
        "Delete" | "Del" => "Del",
        "PageUp" => "PgUp",
        "PageDown" => "PgDn",
        "CapsLock" => "Caps Lock",
        "Insert" => "Ins",
        _ => {
            let mut chars = key.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_uppercase().collect(),
                _ => key.to_string(),
            };
        }
    };
    named.to_string()
}

/// Badge text for a Windows virtual-key code.
pub fn vk_display_name(code: u32) -> String {
    let named = match code {
        0x08 => "Backspace",
        0x09 => "Tab",
        0x0D => "Enter",
        0x1B => "Esc",
        0x20 => "Space",
        0x21 => "PgUp",
        0x22 => "PgDn",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "←",
        0x26 => "↑",
        0x27 => "→",
        0x28 => "↓",
        0x2D => "Ins",
        0x2E => "Del",
        0x30..=0x39 | 0x41..=0x5A => {
            return char::from_u32(code).map(String::from).unwrap_or_default();
        }
        0x60..=0x69 => return format!("Num {}", code - 0x60),
        0x70..=0x87 => return format!("F{}", code - 0x6F),
        _ => return format!("Key {code:#04X}"),
    };
    named.to_string()
}

fn is_modifier_only(key: Option<&str>, vk_code: Option<u32>) -> bool {
    if let Some(key) = key {
        return matches!(
            key.to_ascii_lowercase().as_str(),
            "shift"
                | "shiftleft"
                | "shiftright"
                | "lshift"
                | "rshift"
                | "control"
                | "controlleft"
                | "controlright"
                | "ctrl"
                | "lcontrol"
                | "rcontrol"
                | "alt"
                | "altleft"
                | "altright"
                | "altgraph"
                | "lalt"
                | "ralt"
                | "meta"
                | "metaleft"
                | "metaright"
                | "os"
                | "osleft"
                | "osright"
                | "win"
                | "lwin"
                | "rwin"
                | "super"
        );
    }
    matches!(
        vk_code,
        Some(0x10..=0x12 | 0x5B | 0x5C | 0xA0..=0xA5)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::is_merge_clean;
    use framecue_project_model::interval::Span;

    fn builder() -> KeystrokeBuilder {
        KeystrokeBuilder::with_defaults()
    }

    fn shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::NONE
        }
    }

    #[test]
    fn test_press_release_pair() {
        let events = builder().build_events(&[
            RawInputEvent::key_down(1.0, "KeyA"),
            RawInputEvent::key_up(1.5, "KeyA"),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "A");
        assert!((events[0].end_secs - 1.6).abs() < 1e-9);
        assert!(events[0].is_hold);
    }

    #[test]
    fn test_quick_tap_is_not_hold() {
        let events = builder().build_events(&[
            RawInputEvent::key_down(1.0, "KeyA"),
            RawInputEvent::key_up(1.05, "KeyA"),
        ]);
        assert!(!events[0].is_hold);
        assert!((events[0].end_secs - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_long_hold_ends_at_release() {
        let events = builder().build_events(&[
            RawInputEvent::key_down(1.0, "Enter"),
            RawInputEvent::key_up(3.0, "Enter"),
        ]);
        assert_eq!(events[0].end_secs, 3.0);
        assert!(events[0].is_hold);
    }

    #[test]
    fn test_unreleased_press_uses_default_duration() {
        let events = builder().build_events(&[RawInputEvent::key_down(1.0, "KeyQ")]);
        assert!((events[0].end_secs - 2.2).abs() < 1e-9);
        assert!(!events[0].is_hold);
    }

    #[test]
    fn test_auto_repeat_is_ignored() {
        let events = builder().build_events(&[
            RawInputEvent::key_down(1.0, "KeyJ"),
            RawInputEvent::key_down(1.1, "KeyJ"),
            RawInputEvent::key_down(1.2, "KeyJ"),
            RawInputEvent::key_up(1.5, "KeyJ"),
        ]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_modifier_only_presses_are_suppressed() {
        let events = builder().build_events(&[
            RawInputEvent::key_down(0.0, "ShiftLeft"),
            RawInputEvent::key_down(0.1, "KeyS").with_modifiers(shift()),
            RawInputEvent::key_up(0.2, "KeyS").with_modifiers(shift()),
            RawInputEvent::key_up(0.3, "ShiftLeft"),
            RawInputEvent::vk(0.4, 0x11, Some(ButtonState::Down)),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "Shift + S");
    }

    #[test]
    fn test_labels() {
        let all = Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::NONE
        };
        let events = builder().build_events(&[
            RawInputEvent::key_tap(0.0, "KeyS").with_modifiers(all),
            RawInputEvent::mouse_down(1.0, MouseButton::Left),
            RawInputEvent::wheel(2.0, WheelDirection::Up),
            RawInputEvent::vk(3.0, 0x41, None),
            RawInputEvent::key_tap(4.0, "ArrowLeft"),
        ]);
        let labels: Vec<&str> = events.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Ctrl + Alt + S", "Left Click", "↑ Scroll", "A", "←"]);
    }

    #[test]
    fn test_key_display_names() {
        assert_eq!(key_display_name("Digit7"), "7");
        assert_eq!(key_display_name("Escape"), "Esc");
        assert_eq!(key_display_name("q"), "Q");
        assert_eq!(key_display_name("F5"), "F5");
        assert_eq!(vk_display_name(0x70), "F1");
        assert_eq!(vk_display_name(0x63), "Num 3");
    }

    #[test]
    fn test_wheel_is_instantaneous() {
        let events = builder().build_events(&[RawInputEvent::wheel(2.0, WheelDirection::Down)]);
        assert_eq!(events[0].kind, KeystrokeKind::Wheel);
        assert!((events[0].end_secs - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_raw_input_is_sorted() {
        let events = builder().build_events(&[
            RawInputEvent::key_up(1.5, "KeyA"),
            RawInputEvent::key_down(1.0, "KeyA"),
        ]);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_hold);
    }

    #[test]
    fn test_rapid_presses_are_trimmed() {
        let b = builder();
        let events = b.build_events(&[
            RawInputEvent::key_down(0.0, "KeyA"),
            RawInputEvent::key_down(0.05, "KeyB"),
        ]);
        let windows = b.effective_windows(&events, KeystrokeMode::Keyboard);
        assert_eq!(windows.len(), 2);
        assert!(windows[0].end_secs <= 0.05);
        assert!(windows[0].end_secs <= windows[1].start_secs);

        let segments = b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.0);
        assert!(is_merge_clean(&segments, b.config().merge_gap_secs));
    }

    #[test]
    fn test_mode_filtering() {
        let b = builder();
        let events = b.build_events(&[
            RawInputEvent::key_tap(1.0, "KeyA"),
            RawInputEvent::mouse_down(5.0, MouseButton::Right),
        ]);

        assert_eq!(b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.0).len(), 1);
        assert_eq!(
            b.generate_segments(&events, KeystrokeMode::KeyboardMouse, 10.0, 0.0).len(),
            2
        );
        assert!(b.generate_segments(&events, KeystrokeMode::Off, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_delay_shifts_windows() {
        let b = builder();
        let events = b.build_events(&[RawInputEvent::key_tap(2.0, "KeyA")]);
        let segments = b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.5);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].start_secs - 2.45).abs() < 1e-9);
        assert!((segments[0].end_secs - 3.85).abs() < 1e-9);
    }

    #[test]
    fn test_delay_is_clamped() {
        let b = builder();
        assert_eq!(b.clamp_delay(5.0), 1.0);
        assert_eq!(b.clamp_delay(-5.0), -1.0);
        assert_eq!(b.clamp_delay(f64::NAN), 0.0);
        assert_eq!(b.clamp_delay(0.25), 0.25);
    }

    #[test]
    fn test_windows_clip_to_duration() {
        let b = builder();
        let events = b.build_events(&[
            RawInputEvent::key_tap(0.0, "KeyA"),
            RawInputEvent::key_tap(9.5, "KeyB"),
        ]);
        let segments = b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.0);
        assert_eq!(segments.first().map(Span::start_secs), Some(0.0));
        assert_eq!(segments.last().map(Span::end_secs), Some(10.0));
        assert!(b.generate_segments(&events, KeystrokeMode::Keyboard, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_migration_replaces_auto_generated_windows() {
        let b = builder();
        let events = b.build_events(&[
            RawInputEvent::key_tap(1.0, "KeyA"),
            RawInputEvent::key_tap(4.0, "KeyB"),
        ]);
        let stored = b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.0);

        let outcome =
            b.migrate_for_delay_change(&stored, &events, KeystrokeMode::Keyboard, 10.0, 0.0, 0.3);
        match outcome {
            DelayMigration::Migrated(intervals) => {
                assert_eq!(intervals.len(), 2);
                assert!((intervals[0].start_secs - 1.25).abs() < 1e-9);
            }
            DelayMigration::Preserved => panic!("auto windows should migrate"),
        }
    }

    #[test]
    fn test_migration_preserves_hand_edits() {
        let b = builder();
        let events = b.build_events(&[RawInputEvent::key_tap(1.0, "KeyA")]);
        let mut stored = b.generate_segments(&events, KeystrokeMode::Keyboard, 10.0, 0.0);
        stored[0].end_secs += 0.5;

        let outcome =
            b.migrate_for_delay_change(&stored, &events, KeystrokeMode::Keyboard, 10.0, 0.0, 0.3);
        assert_eq!(outcome, DelayMigration::Preserved);
    }
}
