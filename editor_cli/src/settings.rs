//! Settings file loading
//!
//! Settings are a JSON object whose fields override [`EditorConfig`]
//! defaults, e.g. `{"tab_size": 2, "write_tabs": true}`. Missing fields keep
//! their defaults.

use std::fs;
use std::path::Path;

use editor_core::EditorConfig;
use serde_json::Value;
use tracing::debug;

use crate::error::CliError;

/// Loaded settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config: EditorConfig,
    /// Whether the file chose an undo depth
    pub sets_undo: bool,
}

/// Parses settings from JSON text
pub fn parse_settings(text: &str) -> Result<Settings, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let sets_undo = value.get("undo_limit").is_some();
    let config = serde_json::from_value(value)?;
    Ok(Settings { config, sets_undo })
}

/// Loads settings from `path`, or defaults when no path is given
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let Some(path) = path else {
        return Ok(Settings {
            config: EditorConfig::default(),
            sets_undo: false,
        });
    };

    let settings_error = |reason: String| CliError::Settings {
        path: path.display().to_string(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
    let settings = parse_settings(&text).map_err(|e| settings_error(e.to_string()))?;
    debug!(path = %path.display(), config = ?settings.config, "settings loaded");
    Ok(settings)
}
