pub mod analyze;
pub mod delay;
pub mod info;
pub mod init;
pub mod preview;
pub mod validate;

use std::path::Path;

use framecue_project_model::LoadedProject;
use uuid::Uuid;

pub(crate) fn load_project(path: &Path) -> anyhow::Result<LoadedProject> {
    LoadedProject::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))
}

/// Resolve the segment a command operates on, creating the default one
/// when the timeline is empty and no id was given.
pub(crate) fn select_segment(
    project: &mut LoadedProject,
    id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    match id {
        Some(id) if project.timeline.segment(id).is_some() => Ok(id),
        Some(id) => anyhow::bail!("Segment {id} not found"),
        None => Ok(project.ensure_default_segment()),
    }
}
