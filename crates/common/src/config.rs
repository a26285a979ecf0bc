//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FramecueResult;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults applied when a segment's overlays are generated.
    pub editor: EditorDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Overlay defaults used by the editor and CLI when no explicit choice is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Hide the cursor while the pointer idles.
    pub hide_idle_cursor: bool,

    /// Keystroke overlay mode: "off", "keyboard" or "keyboard_mouse".
    pub keystroke_mode: String,

    /// Global keystroke delay in seconds, clamped to [-1, 1] when applied.
    pub keystroke_delay_secs: f64,

    /// Generate the auto-zoom camera path on analysis.
    pub auto_zoom: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "framecue=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            hide_idle_cursor: true,
            keystroke_mode: "keyboard".to_string(),
            keystroke_delay_secs: 0.0,
            auto_zoom: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> FramecueResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &std::path::Path) -> FramecueResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("framecue").join("config.json")
}
