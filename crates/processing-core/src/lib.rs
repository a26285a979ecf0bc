//! FrameCue Processing Core: event-to-overlay synthesis.
//!
//! Turns sparse capture streams into timeline overlays:
//! - **Cursor hiding:** classify pointer activity and derive visible windows
//! - **Keystroke badges:** rebuild logical presses and derive badge windows
//! - **Visibility curve:** eased opacity/scale for any interval list
//! - **Auto-Zoom:** spring-driven camera path that chases the pointer
//!
//! This crate is pure computation with no I/O.
//! All inputs are data; all outputs are data.

pub mod auto_zoom;
pub mod camera_preview;
pub mod cursor_activity;
pub mod intervals;
pub mod keystroke;
pub mod overlay;
pub mod pointer_track;
pub mod visibility;

pub use auto_zoom::{AutoZoomConfig, AutoZoomOutput, AutoZoomSynthesizer, FrameSize};
pub use camera_preview::camera_sample_at;
pub use cursor_activity::{CursorActivityConfig, CursorActivityDetector};
pub use keystroke::{DelayMigration, KeystrokeBuilder, KeystrokeConfig};
pub use overlay::{OverlayEditor, OverlayKind};
pub use pointer_track::PointerTrack;
pub use visibility::{visibility_at, Visibility, VisibilityCurve};
