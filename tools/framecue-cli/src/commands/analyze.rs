//! Generate overlays for a segment.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framecue_common::FramecueError;
use framecue_processing_core::auto_zoom::FrameSize;
use framecue_processing_core::overlay::{apply_auto_zoom, OverlayEditor};
use framecue_project_model::timeline::KeystrokeMode;
use uuid::Uuid;

use super::{load_project, select_segment};

/// Overlay choices resolved from flags and the app config.
pub struct AnalyzeOptions {
    pub segment: Option<Uuid>,
    pub hide_idle_cursor: bool,
    pub keystroke_mode: String,
    pub delay_secs: f64,
    pub auto_zoom: bool,
}

pub async fn run(path: PathBuf, options: AnalyzeOptions) -> anyhow::Result<()> {
    let mode = options
        .keystroke_mode
        .parse::<KeystrokeMode>()
        .map_err(FramecueError::config)?;

    println!("Analyzing project at: {}", path.display());
    let mut project = load_project(&path)?;
    let segment_id = select_segment(&mut project, options.segment)?;
    let frame = FrameSize::new(
        project.project.recording.capture_width,
        project.project.recording.capture_height,
    );

    let editor = OverlayEditor::with_defaults();
    let mut segment = project
        .timeline
        .segment(segment_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Segment {segment_id} not found"))?;

    segment.cursor.hide_when_idle = options.hide_idle_cursor;
    editor.regenerate_cursor_visibility(&mut segment, &project.pointer_samples);

    segment.keystrokes.mode = mode;
    segment.keystrokes.delay_secs = editor.keystroke_builder().clamp_delay(options.delay_secs);
    editor.regenerate_keystroke_visibility(&mut segment, &project.input_events);

    if options.auto_zoom {
        let synthesizer = editor.synthesizer().clone();
        let samples = project.pointer_samples.clone();
        let trim = segment.trim;
        let keyframes = segment.zoom.keyframes.clone();
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_cancel = Arc::clone(&cancel);
        let mut task = tokio::task::spawn_blocking(move || {
            synthesizer.generate_cancellable(&samples, trim, &keyframes, frame, &worker_cancel)
        });

        let finished = tokio::select! {
            joined = &mut task => Some(joined?),
            _ = tokio::signal::ctrl_c() => None,
        };
        let output = match finished {
            Some(output) => output,
            None => {
                println!("Cancelling auto-zoom...");
                cancel.store(true, Ordering::Relaxed);
                task.await?
            }
        };

        match output {
            Some(output) => {
                if !apply_auto_zoom(&mut segment, Some(output)) {
                    println!("  Auto-zoom: no pointer data inside the segment");
                }
            }
            None => {
                println!("Auto-zoom cancelled; project left unchanged.");
                return Ok(());
            }
        }
    } else {
        apply_auto_zoom(&mut segment, None);
    }

    tracing::info!(
        segment = %segment_id,
        cursor_windows = segment.cursor.intervals.len(),
        camera_samples = segment.zoom.camera_path.len(),
        "Overlays generated"
    );

    println!("  Segment: {segment_id}");
    println!(
        "  Cursor: {}",
        if segment.cursor.hide_when_idle {
            format!("{} visible window(s)", segment.cursor.intervals.len())
        } else {
            "always shown".to_string()
        }
    );
    println!(
        "  Keystrokes: {:?}, delay {:+.2}s, {} window(s)",
        segment.keystrokes.mode,
        segment.keystrokes.delay_secs,
        segment.keystrokes.intervals.as_ref().map_or(0, Vec::len)
    );
    println!(
        "  Auto-zoom: {} ({} path samples)",
        if segment.zoom.auto_zoom { "on" } else { "off" },
        segment.zoom.camera_path.len()
    );

    if let Some(slot) = project.timeline.segment_mut(segment_id) {
        *slot = segment;
    }
    project.project.touch();
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("\nOverlays saved to {}", project.root.join("meta/timeline.json").display());
    Ok(())
}
