//! Configuration for a counting run

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CountError;
use crate::models::ExtensionSelection;

/// Default file-by-file report name
pub const DEFAULT_OUTPUT_FILE: &str = "output.csv";

/// Default per-folder summary report name
pub const DEFAULT_SUMMARY_FILE: &str = "summary.csv";

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "config.toml";

/// Configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfig {
    /// Root directory to walk
    pub root: PathBuf,

    /// Document types to include
    pub selection: ExtensionSelection,

    /// Where the file-by-file report is written
    pub output_path: PathBuf,

    /// Where the per-folder summary is written
    pub summary_path: PathBuf,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            selection: ExtensionSelection::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            summary_path: PathBuf::from(DEFAULT_SUMMARY_FILE),
        }
    }
}

impl CountConfig {
    /// Create a new config for the given root and selection
    pub fn new(root: PathBuf, selection: ExtensionSelection) -> Self {
        Self {
            root,
            selection,
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> CountConfigBuilder {
        CountConfigBuilder::new()
    }

    /// Check the inputs before any work starts.
    ///
    /// The root must be a non-empty path to an existing directory and at
    /// least one document type must be selected.
    pub fn validate(&self) -> Result<(), CountError> {
        if self.root.as_os_str().is_empty() {
            return Err(CountError::invalid_input(
                None,
                "Enter a valid folder path",
            ));
        }
        if !self.root.is_dir() {
            return Err(CountError::invalid_input(
                Some(self.root.clone()),
                format!("Not a directory: {}", self.root.display()),
            ));
        }
        if self.selection.is_empty() {
            return Err(CountError::invalid_input(
                None,
                "Select at least one file type",
            ));
        }
        Ok(())
    }

    /// The root as an absolute path, so every reported path is absolute
    pub fn absolute_root(&self) -> PathBuf {
        absolutize(&self.root)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Builder for CountConfig
#[derive(Debug, Default)]
pub struct CountConfigBuilder {
    config: CountConfig,
}

impl CountConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Set the document types to include
    pub fn selection(mut self, selection: ExtensionSelection) -> Self {
        self.config.selection = selection;
        self
    }

    /// Set the file-by-file report path
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Set the summary report path
    pub fn summary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.summary_path = path.into();
        self
    }

    /// Build the config
    pub fn build(self) -> CountConfig {
        self.config
    }
}
