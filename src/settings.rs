//! Settings persisted between runs
//!
//! Stored as TOML with a single `[Settings]` table:
//!
//! ```toml
//! [Settings]
//! folder_path = "/home/me/docs"
//! file_types = ".docx,.pdf"
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CountError;
use crate::models::ExtensionSelection;

/// Last-used root path and extension selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Root folder of the last run
    pub folder_path: String,
    /// Extensions selected for the last run
    pub file_types: ExtensionSelection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(rename = "Settings", default)]
    settings: SettingsTable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsTable {
    #[serde(default)]
    folder_path: String,
    #[serde(default)]
    file_types: String,
}

/// Reads and writes [`Settings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file is missing or malformed
    pub fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Settings::default();
            }
            Err(e) => {
                warn!("Could not read settings {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        match toml::from_str::<SettingsFile>(&raw) {
            Ok(file) => Settings {
                folder_path: file.settings.folder_path,
                file_types: ExtensionSelection::parse_lenient(&file.settings.file_types),
            },
            Err(e) => {
                warn!(
                    "Ignoring malformed settings {}: {}",
                    self.path.display(),
                    e.message()
                );
                Settings::default()
            }
        }
    }

    /// Overwrite the settings file
    pub fn save(&self, settings: &Settings) -> Result<(), CountError> {
        let file = SettingsFile {
            settings: SettingsTable {
                folder_path: settings.folder_path.clone(),
                file_types: settings.file_types.to_dotted_list(),
            },
        };
        let body = toml::to_string(&file)
            .map_err(|e| CountError::settings_error(self.path.clone(), e.to_string()))?;
        fs::write(&self.path, body)
            .map_err(|e| CountError::settings_error(self.path.clone(), e.to_string()))?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
