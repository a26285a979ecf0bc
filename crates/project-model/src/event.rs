//! Input data contracts: pointer samples, raw key/mouse events, and the
//! logical keystroke presses reconstructed from them.
//!
//! Pointer and input streams are stored as append-only JSONL files written
//! by the capture collaborator. Timestamps are seconds since recording start;
//! pointer coordinates are pixels in source-video space.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single sampled pointer position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Seconds since recording start.
    #[serde(rename = "t")]
    pub timestamp_secs: f64,

    /// X coordinate in source-video pixels.
    pub x: f64,

    /// Y coordinate in source-video pixels.
    pub y: f64,

    /// Whether a mouse button was held when the sample was taken.
    #[serde(default)]
    pub is_clicked: bool,

    /// Cursor shape tag reported by the platform (e.g. "arrow", "ibeam").
    #[serde(default = "default_cursor_kind")]
    pub cursor_kind: String,
}

fn default_cursor_kind() -> String {
    "arrow".to_string()
}

impl PointerSample {
    /// Create an unclicked arrow-cursor sample.
    pub fn new(timestamp_secs: f64, x: f64, y: f64) -> Self {
        Self {
            timestamp_secs,
            x,
            y,
            is_clicked: false,
            cursor_kind: default_cursor_kind(),
        }
    }

    /// Create a sample with the click flag set.
    pub fn clicked(timestamp_secs: f64, x: f64, y: f64) -> Self {
        Self {
            is_clicked: true,
            ..Self::new(timestamp_secs, x, y)
        }
    }

    /// Euclidean distance to another sample, in pixels.
    pub fn distance_to(&self, other: &PointerSample) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// Human readable button name used in badges.
    pub fn display_name(self) -> &'static str {
        match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
            MouseButton::Middle => "Middle",
            MouseButton::Back => "Back",
            MouseButton::Forward => "Forward",
        }
    }
}

/// Button/key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Down,
    Up,
}

/// Scroll wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }

    /// Modifier names in badge order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Win"),
        ]
        .into_iter()
        .filter_map(|(held, name)| held.then_some(name))
    }
}

/// A raw key or mouse event as delivered by the capture collaborator.
///
/// Keyboard and mouse events may arrive as separate down/up pairs sharing a
/// key code or button, or as a single event without a direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// Seconds since recording start.
    #[serde(rename = "t")]
    pub timestamp_secs: f64,

    /// The event payload.
    #[serde(flatten)]
    pub kind: RawInputKind,

    /// Press or release; `None` for instantaneous events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<ButtonState>,

    /// Modifier keys held at event time.
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Discriminated union of raw input payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInputKind {
    /// Keyboard key event.
    Keyboard {
        /// Key name (e.g. "KeyS", "Enter", "ShiftLeft").
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Platform virtual-key code, when no name is available.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vk_code: Option<u32>,
    },

    /// Mouse button event.
    Mousedown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        button: Option<MouseButton>,
    },

    /// Scroll wheel tick.
    Wheel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scroll: Option<WheelDirection>,
    },
}

impl RawInputEvent {
    fn with_kind(timestamp_secs: f64, kind: RawInputKind, direction: Option<ButtonState>) -> Self {
        Self {
            timestamp_secs,
            kind,
            direction,
            modifiers: Modifiers::NONE,
        }
    }

    fn named_key(key: impl Into<String>) -> RawInputKind {
        RawInputKind::Keyboard {
            key: Some(key.into()),
            vk_code: None,
        }
    }

    /// Key press (down) event.
    pub fn key_down(timestamp_secs: f64, key: impl Into<String>) -> Self {
        Self::with_kind(timestamp_secs, Self::named_key(key), Some(ButtonState::Down))
    }

    /// Key release (up) event.
    pub fn key_up(timestamp_secs: f64, key: impl Into<String>) -> Self {
        Self::with_kind(timestamp_secs, Self::named_key(key), Some(ButtonState::Up))
    }

    /// Keyboard event without a direction.
    pub fn key_tap(timestamp_secs: f64, key: impl Into<String>) -> Self {
        Self::with_kind(timestamp_secs, Self::named_key(key), None)
    }

    /// Keyboard event identified only by virtual-key code.
    pub fn vk(timestamp_secs: f64, vk_code: u32, direction: Option<ButtonState>) -> Self {
        Self::with_kind(
            timestamp_secs,
            RawInputKind::Keyboard {
                key: None,
                vk_code: Some(vk_code),
            },
            direction,
        )
    }

    /// Mouse button press.
    pub fn mouse_down(timestamp_secs: f64, button: MouseButton) -> Self {
        Self::with_kind(
            timestamp_secs,
            RawInputKind::Mousedown {
                button: Some(button),
            },
            Some(ButtonState::Down),
        )
    }

    /// Mouse button release.
    pub fn mouse_up(timestamp_secs: f64, button: MouseButton) -> Self {
        Self::with_kind(
            timestamp_secs,
            RawInputKind::Mousedown {
                button: Some(button),
            },
            Some(ButtonState::Up),
        )
    }

    /// Scroll wheel tick.
    pub fn wheel(timestamp_secs: f64, scroll: WheelDirection) -> Self {
        Self::with_kind(
            timestamp_secs,
            RawInputKind::Wheel {
                scroll: Some(scroll),
            },
            None,
        )
    }

    /// Attach modifier flags.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Coarse category of a reconstructed keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeystrokeKind {
    Keyboard,
    Mouse,
    Wheel,
}

/// One logical press, built from a down/up pair or a single instant event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub id: Uuid,
    pub kind: KeystrokeKind,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Badge text, e.g. "Ctrl + Alt + S".
    pub label: String,
    /// Physical press lasted longer than the hold threshold.
    pub is_hold: bool,
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
}

/// Parse records from JSONL content (one JSON object per line).
///
/// Blank lines and `#` header/comment lines are skipped.
pub fn parse_jsonl<T: DeserializeOwned>(jsonl: &str) -> Result<Vec<T>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize records to JSONL format.
pub fn serialize_jsonl<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

/// Parse a pointer sample stream.
pub fn parse_pointer_samples(jsonl: &str) -> Result<Vec<PointerSample>, serde_json::Error> {
    parse_jsonl(jsonl)
}

/// Parse a raw input event stream.
pub fn parse_input_events(jsonl: &str) -> Result<Vec<RawInputEvent>, serde_json::Error> {
    parse_jsonl(jsonl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_sample_defaults() {
        let parsed: PointerSample = serde_json::from_str(r#"{"t":1.5,"x":10.0,"y":20.0}"#).unwrap();
        assert!(!parsed.is_clicked);
        assert_eq!(parsed.cursor_kind, "arrow");
        assert!((parsed.timestamp_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_keyboard_event_format() {
        let event = RawInputEvent::key_down(0.25, "KeyS").with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"keyboard\""));
        assert!(json.contains("\"key\":\"KeyS\""));
        assert!(json.contains("\"direction\":\"down\""));
        assert!(json.contains("\"ctrl\":true"));
    }

    #[test]
    fn test_parse_sparse_input_events() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n\
            {\"t\":0.1,\"type\":\"wheel\"}\n\
            \n\
            {\"t\":0.2,\"type\":\"mousedown\",\"button\":\"left\",\"direction\":\"up\"}\n\
            {\"t\":0.3,\"type\":\"keyboard\",\"vk_code\":65}\n";
        let parsed = parse_input_events(jsonl).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].kind, RawInputKind::Wheel { scroll: None });
        assert_eq!(parsed[1].direction, Some(ButtonState::Up));
        assert_eq!(parsed[2].modifiers, Modifiers::NONE);
        assert_eq!(
            parsed[2].kind,
            RawInputKind::Keyboard {
                key: None,
                vk_code: Some(65)
            }
        );
    }

    #[test]
    fn test_jsonl_roundtrip_pointer_stream() {
        let samples = vec![
            PointerSample::new(0.0, 100.0, 200.0),
            PointerSample::clicked(0.016, 101.0, 200.0),
        ];
        let jsonl = serialize_jsonl(&samples).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        assert_eq!(parse_pointer_samples(&jsonl).unwrap(), samples);
    }

    #[test]
    fn test_modifier_labels_order() {
        let mods = Modifiers {
            ctrl: true,
            alt: true,
            shift: false,
            meta: true,
        };
        assert!(mods.any());
        assert_eq!(mods.labels().collect::<Vec<_>>(), vec!["Ctrl", "Alt", "Win"]);
        assert!(!Modifiers::NONE.any());
    }

    #[test]
    fn test_distance_between_samples() {
        let a = PointerSample::new(0.0, 0.0, 0.0);
        let b = PointerSample::new(0.1, 3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }
}
