//! Project metadata and bundle I/O.
//!
//! A project bundle is a directory:
//!
//! ```text
//! <root>/
//!   sources/              recorded media (owned by the capture collaborator)
//!   meta/project.json     metadata
//!   meta/pointer.jsonl    pointer samples
//!   meta/input.jsonl      raw key/mouse events
//!   meta/timeline.json    segments and derived overlays
//! ```
//!
//! Input streams are immutable once captured; only `project.json` and
//! `timeline.json` are rewritten by [`LoadedProject::save`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{parse_jsonl, serialize_jsonl, PointerSample, RawInputEvent};
use crate::timeline::{Segment, Timeline};

const POINTER_FILE: &str = "pointer.jsonl";
const INPUT_FILE: &str = "input.jsonl";
const PROJECT_FILE: &str = "project.json";
const TIMELINE_FILE: &str = "timeline.json";

/// Top-level project file (`project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier.
    pub id: Uuid,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Recording configuration that was used.
    pub recording: RecordingConfig,
}

/// Configuration used during recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Capture resolution (physical pixels).
    pub capture_width: u32,
    pub capture_height: u32,

    /// Recording frame rate.
    pub fps: u32,

    /// Recording length in seconds; 0 until the capture finishes.
    #[serde(default)]
    pub duration_secs: f64,
}

impl Project {
    /// Create a new project with defaults.
    pub fn new(name: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: Uuid::new_v4(),
            created_at: now.clone(),
            modified_at: now,
            recording: RecordingConfig {
                capture_width: width,
                capture_height: height,
                fps,
                duration_secs: 0.0,
            },
        }
    }

    /// Bump `modified_at` to now.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata.
    pub project: Project,

    /// Editing timeline.
    pub timeline: Timeline,

    /// Captured pointer samples, as stored.
    pub pointer_samples: Vec<PointerSample>,

    /// Captured raw input events, as stored.
    pub input_events: Vec<RawInputEvent>,
}

impl LoadedProject {
    /// Load a project from a directory.
    ///
    /// Missing `timeline.json` yields an empty timeline; missing input
    /// streams yield empty vectors.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();
        let meta = root.join("meta");

        let project_path = meta.join(PROJECT_FILE);
        let project_json = read_file(&project_path)?;
        let project: Project =
            serde_json::from_str(&project_json).map_err(|e| ProjectError::ParseError {
                path: project_path,
                source: e,
            })?;

        let timeline_path = meta.join(TIMELINE_FILE);
        let timeline = if timeline_path.exists() {
            let timeline_json = read_file(&timeline_path)?;
            serde_json::from_str(&timeline_json).map_err(|e| ProjectError::ParseError {
                path: timeline_path,
                source: e,
            })?
        } else {
            Timeline::new()
        };

        let pointer_samples = load_stream(&meta.join(POINTER_FILE))?;
        let input_events = load_stream(&meta.join(INPUT_FILE))?;

        tracing::debug!(
            root = %root.display(),
            segments = timeline.segments.len(),
            pointer_samples = pointer_samples.len(),
            input_events = input_events.len(),
            "Loaded project"
        );

        Ok(Self {
            root,
            project,
            timeline,
            pointer_samples,
            input_events,
        })
    }

    /// Save project metadata and timeline to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        write_json(&meta_dir.join(PROJECT_FILE), &self.project)?;
        write_json(&meta_dir.join(TIMELINE_FILE), &self.timeline)?;
        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["sources", "meta"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            project: Project::new(name, width, height, fps),
            timeline: Timeline::new(),
            pointer_samples: vec![],
            input_events: vec![],
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Write captured input streams. Called once by the capture side; the
    /// editor never rewrites them.
    pub fn write_input_streams(
        &mut self,
        pointer_samples: Vec<PointerSample>,
        input_events: Vec<RawInputEvent>,
    ) -> Result<(), ProjectError> {
        let meta = self.root.join("meta");
        write_stream(&meta.join(POINTER_FILE), &pointer_samples)?;
        write_stream(&meta.join(INPUT_FILE), &input_events)?;
        self.pointer_samples = pointer_samples;
        self.input_events = input_events;
        Ok(())
    }

    /// Ensure the timeline has at least one segment spanning the recording.
    ///
    /// Returns the id of the first segment.
    pub fn ensure_default_segment(&mut self) -> Uuid {
        if let Some(first) = self.timeline.segments.first() {
            return first.id;
        }
        let duration = self.recording_duration_secs();
        let segment = Segment::new(0.0, duration);
        let id = segment.id;
        self.timeline.segments.push(segment);
        id
    }

    /// Recording length: the metadata value, else the last input timestamp.
    pub fn recording_duration_secs(&self) -> f64 {
        if self.project.recording.duration_secs > 0.0 {
            return self.project.recording.duration_secs;
        }
        let last_pointer = self
            .pointer_samples
            .iter()
            .map(|s| s.timestamp_secs)
            .fold(0.0_f64, f64::max);
        let last_input = self
            .input_events
            .iter()
            .map(|e| e.timestamp_secs)
            .fold(0.0_f64, f64::max);
        last_pointer.max(last_input)
    }

    /// Validate that input streams exist and segments are sane.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        let meta = self.root.join("meta");

        for file in [POINTER_FILE, INPUT_FILE] {
            if !meta.join(file).exists() {
                errors.push(format!("Input stream missing: meta/{file}"));
            }
        }

        let duration = self.recording_duration_secs();
        for segment in &self.timeline.segments {
            if segment.trim.start_secs < 0.0 || segment.trim.end_secs > duration + 1e-6 {
                errors.push(format!(
                    "Segment {} trim [{:.3}, {:.3}] exceeds recording length {:.3}s",
                    segment.id, segment.trim.start_secs, segment.trim.end_secs, duration
                ));
            }
            if segment.zoom.auto_zoom && segment.zoom.camera_path.is_empty() {
                errors.push(format!(
                    "Segment {} has auto-zoom enabled but no camera path",
                    segment.id
                ));
            }
        }

        errors
    }
}

fn read_file(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_stream<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, ProjectError> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = read_file(path)?;
    parse_jsonl(&content).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_stream<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ProjectError> {
    let jsonl = serialize_jsonl(records).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = format!("# {{\"schema_version\":\"1.0\"}}\n{jsonl}");
    std::fs::write(path, content).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
