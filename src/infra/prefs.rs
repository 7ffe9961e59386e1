use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::SessionSource;

const PREFS_FILE: &str = "prefs.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewMode {
    Projects,
    Timeline,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Projects => Self::Timeline,
            Self::Timeline => Self::Projects,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::Timeline => "Timeline",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Timeline => "timeline",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "projects" => Some(Self::Projects),
            "timeline" => Some(Self::Timeline),
            _ => None,
        }
    }
}

/// The two preferences that survive restarts: how the home view lists
/// sessions, and which source tag is active.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Preferences {
    pub view_mode: ViewMode,
    pub source: SessionSource,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Projects,
            source: SessionSource::Claude,
        }
    }
}

// On-disk shape; values outside the enumerated sets fall back to defaults on
// load rather than erroring.
#[derive(Serialize, Deserialize)]
struct PrefsFile {
    view_mode: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Error)]
pub enum ResolveStateDirError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn resolve_state_dir() -> Result<PathBuf, ResolveStateDirError> {
    let home = dirs::home_dir().ok_or(ResolveStateDirError::HomeDirNotFound)?;
    Ok(home.join(".ccview"))
}

/// A missing or unreadable prefs file is not an error; it means defaults.
pub fn load_preferences(state_dir: &Path) -> Preferences {
    let path = state_dir.join(PREFS_FILE);
    let Ok(raw) = fs::read_to_string(&path) else {
        return Preferences::default();
    };
    let Ok(file) = serde_json::from_str::<PrefsFile>(&raw) else {
        return Preferences::default();
    };

    let defaults = Preferences::default();
    Preferences {
        view_mode: file
            .view_mode
            .as_deref()
            .and_then(ViewMode::parse)
            .unwrap_or(defaults.view_mode),
        source: file
            .source
            .as_deref()
            .and_then(SessionSource::parse)
            .unwrap_or(defaults.source),
    }
}

#[derive(Debug, Error)]
pub enum SavePreferencesError {
    #[error("failed to create state dir {path}: {source}")]
    CreateDir { path: String, source: io::Error },

    #[error("failed to write preferences {path}: {source}")]
    WriteFile { path: String, source: io::Error },
}

pub fn save_preferences(
    state_dir: &Path,
    prefs: Preferences,
) -> Result<(), SavePreferencesError> {
    fs::create_dir_all(state_dir).map_err(|error| SavePreferencesError::CreateDir {
        path: state_dir.display().to_string(),
        source: error,
    })?;

    let file = PrefsFile {
        view_mode: Some(prefs.view_mode.as_str().to_string()),
        source: Some(prefs.source.as_query().to_string()),
    };
    let json = serde_json::to_string_pretty(&file).unwrap_or_else(|_| "{}".to_string());
    let path = state_dir.join(PREFS_FILE);
    fs::write(&path, json).map_err(|error| SavePreferencesError::WriteFile {
        path: path.display().to_string(),
        source: error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_preferences(dir.path()), Preferences::default());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PREFS_FILE),
            r#"{ "view_mode": "spiral", "source": "hal9000" }"#,
        )
        .unwrap();
        assert_eq!(load_preferences(dir.path()), Preferences::default());
    }

    #[test]
    fn round_trips_saved_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences {
            view_mode: ViewMode::Timeline,
            source: SessionSource::Codex,
        };
        save_preferences(dir.path(), prefs).unwrap();
        assert_eq!(load_preferences(dir.path()), prefs);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PREFS_FILE), "not json").unwrap();
        assert_eq!(load_preferences(dir.path()), Preferences::default());
    }
}
