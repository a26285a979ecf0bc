//! FrameCue Project Model
//!
//! Defines the core data contracts for FrameCue projects:
//! - **Events:** Pointer samples, raw key/mouse events, reconstructed keystrokes
//! - **Intervals:** Display windows for cursor and keystroke overlays
//! - **Timeline:** Segments with trim ranges, overlays, zoom keyframes, camera paths
//! - **Project:** Bundle metadata and on-disk load/save
//! - **History:** Snapshot undo/redo used by editing front-ends
//!
//! Times are seconds; pointer and camera positions are source-video pixels.

pub mod event;
pub mod history;
pub mod interval;
pub mod project;
pub mod timeline;
pub mod viewport;

pub use event::*;
pub use history::*;
pub use interval::*;
pub use project::*;
pub use timeline::*;
pub use viewport::*;
