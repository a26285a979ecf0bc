//! Change the keystroke badge delay of a segment.

use std::path::PathBuf;

use framecue_processing_core::keystroke::DelayMigration;
use framecue_processing_core::overlay::OverlayEditor;
use uuid::Uuid;

use super::{load_project, select_segment};

pub fn run(path: PathBuf, delay: f64, segment: Option<Uuid>) -> anyhow::Result<()> {
    let mut project = load_project(&path)?;
    let segment_id = select_segment(&mut project, segment)?;

    let editor = OverlayEditor::with_defaults();
    let raw = project.input_events.clone();
    let segment = project
        .timeline
        .segment_mut(segment_id)
        .ok_or_else(|| anyhow::anyhow!("Segment {segment_id} not found"))?;

    let old_delay = segment.keystrokes.delay_secs;
    let outcome = editor.set_keystroke_delay(segment, delay, &raw);
    println!(
        "Keystroke delay: {:+.2}s -> {:+.2}s",
        old_delay, segment.keystrokes.delay_secs
    );
    match outcome {
        DelayMigration::Migrated(intervals) => {
            println!("  Badge windows regenerated ({} window(s))", intervals.len())
        }
        DelayMigration::Preserved => {
            println!("  Badge windows were edited by hand; kept as they are")
        }
    }

    project.project.touch();
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    Ok(())
}
