//! Initialize a new FrameCue project.

use std::path::{Path, PathBuf};

use framecue_project_model::event::{parse_input_events, parse_pointer_samples};
use framecue_project_model::LoadedProject;

pub fn run(
    name: String,
    output: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    pointer: Option<PathBuf>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let project_dir = output.join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let pointer_samples = match pointer {
        Some(path) => parse_pointer_samples(&read_stream(&path)?)
            .map_err(|e| anyhow::anyhow!("Invalid pointer stream {}: {e}", path.display()))?,
        None => vec![],
    };
    let input_events = match input {
        Some(path) => parse_input_events(&read_stream(&path)?)
            .map_err(|e| anyhow::anyhow!("Invalid input stream {}: {e}", path.display()))?,
        None => vec![],
    };

    let mut project = LoadedProject::create(&project_dir, &name, width, height, fps)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;
    project
        .write_input_streams(pointer_samples, input_events)
        .map_err(|e| anyhow::anyhow!("Failed to write input streams: {e}"))?;

    project.project.recording.duration_secs = project.recording_duration_secs();
    project.ensure_default_segment();
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", project.root.display());
    println!("  Resolution: {}x{}", width, height);
    println!("  FPS: {fps}");
    println!("  Pointer samples: {}", project.pointer_samples.len());
    println!("  Input events: {}", project.input_events.len());
    println!(
        "  Duration: {:.2}s",
        project.project.recording.duration_secs
    );
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── sources/     (raw media files)");
    println!("  └── meta/        (project.json, timeline.json, pointer.jsonl, input.jsonl)");

    Ok(())
}

fn read_stream(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))
}
