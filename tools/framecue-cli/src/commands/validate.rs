//! Validate a FrameCue project bundle.

use std::path::PathBuf;

use framecue_processing_core::intervals::is_merge_clean;

use super::load_project;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project = load_project(&path)?;

    println!("  Name: {}", project.project.name);
    println!("  Version: {}", project.project.version);
    println!(
        "  Resolution: {}x{}",
        project.project.recording.capture_width, project.project.recording.capture_height
    );
    println!("  FPS: {}", project.project.recording.fps);
    println!("  Segments: {}", project.timeline.segments.len());

    let mut errors = project.validate();
    for segment in &project.timeline.segments {
        if !is_merge_clean(&segment.cursor.intervals, 0.0) {
            errors.push(format!(
                "Segment {} cursor windows overlap or are unsorted",
                segment.id
            ));
        }
        if let Some(intervals) = &segment.keystrokes.intervals {
            if !is_merge_clean(intervals, 0.0) {
                errors.push(format!(
                    "Segment {} keystroke windows overlap or are unsorted",
                    segment.id
                ));
            }
        }
    }

    if errors.is_empty() {
        println!("  Input streams: All present");
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Project may not be fully usable.",
            errors.len()
        );
    }

    Ok(())
}
