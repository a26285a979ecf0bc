//! Show project information.

use std::path::PathBuf;

use framecue_project_model::interval::Span;

use super::load_project;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;
    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Recording:");
    println!(
        "  Resolution: {}x{} @ {}fps",
        p.recording.capture_width, p.recording.capture_height, p.recording.fps
    );
    println!("  Duration: {:.2}s", project.recording_duration_secs());
    println!("  Pointer samples: {}", project.pointer_samples.len());
    println!("  Input events: {}", project.input_events.len());
    println!();

    println!("Timeline:");
    println!("  Output duration: {:.2}s", project.timeline.duration_secs());
    for segment in &project.timeline.segments {
        println!(
            "  Segment {} [{:.2}s, {:.2}s]",
            segment.id, segment.trim.start_secs, segment.trim.end_secs
        );

        let cursor = &segment.cursor;
        if cursor.hide_when_idle {
            let shown: f64 = cursor.intervals.iter().map(Span::duration_secs).sum();
            println!(
                "    Cursor: hidden when idle, {} window(s), {:.2}s shown",
                cursor.intervals.len(),
                shown
            );
        } else {
            println!("    Cursor: always shown");
        }

        let keys = &segment.keystrokes;
        match &keys.intervals {
            Some(intervals) => println!(
                "    Keystrokes: {:?}, delay {:+.2}s, {} window(s)",
                keys.mode,
                keys.delay_secs,
                intervals.len()
            ),
            None => println!("    Keystrokes: {:?}, not generated", keys.mode),
        }

        let zoom = &segment.zoom;
        println!(
            "    Auto-zoom: {} ({} path samples, {} keyframes)",
            if zoom.auto_zoom { "on" } else { "off" },
            zoom.camera_path.len(),
            zoom.keyframes.len()
        );
    }

    Ok(())
}
