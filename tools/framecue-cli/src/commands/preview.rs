//! Evaluate a segment's overlays at a single instant.

use std::path::PathBuf;

use framecue_processing_core::auto_zoom::FrameSize;
use framecue_processing_core::camera_preview::preview_frame;
use framecue_processing_core::visibility::visibility_at;
use uuid::Uuid;

use super::{load_project, select_segment};

pub fn run(path: PathBuf, time: f64, segment: Option<Uuid>) -> anyhow::Result<()> {
    let mut project = load_project(&path)?;
    let segment_id = select_segment(&mut project, segment)?;
    let segment = project
        .timeline
        .segment(segment_id)
        .ok_or_else(|| anyhow::anyhow!("Segment {segment_id} not found"))?;

    let cursor = visibility_at(time, segment.cursor_visibility());
    let keys = visibility_at(time, segment.keystroke_visibility());

    println!("Segment {segment_id} at {time:.3}s");
    println!(
        "  Cursor: opacity {:.3}, scale {:.3}",
        cursor.opacity, cursor.scale
    );
    println!(
        "  Keystrokes: opacity {:.3}, scale {:.3}",
        keys.opacity, keys.scale
    );

    let frame = FrameSize::new(
        project.project.recording.capture_width,
        project.project.recording.capture_height,
    );
    match preview_frame(&segment.zoom.camera_path, segment.trim.start_secs + time, frame) {
        Some(camera) => println!("  Camera: {}", camera.css_transform()),
        None => println!("  Camera: full frame (no auto-zoom path)"),
    }

    Ok(())
}
