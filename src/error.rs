//! Error types for the page counter

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur during a counting run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// I/O error during file operations
    IoError,
    /// Caller supplied an unusable root path or extension selection
    InvalidInput,
    /// Settings file could not be written
    SettingsError,
    /// A run is already in progress
    Busy,
    /// Unknown error
    Unknown,
}

/// Represents a run-level error, or a non-fatal traversal issue
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct CountError {
    /// The kind of error
    pub kind: ErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl CountError {
    /// Create a new error
    pub fn new(kind: ErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io_error(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, path, message)
    }

    /// Create an input validation error
    pub fn invalid_input(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, path, message)
    }

    /// Create a settings persistence error
    pub fn settings_error(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SettingsError, Some(path), message)
    }

    /// Create an error for a launch attempted while another run is active
    pub fn busy() -> Self {
        Self::new(ErrorKind::Busy, None, "A counting run is already in progress")
    }

    /// Attach a path to an error that was created without one
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }
}

impl From<std::io::Error> for CountError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::IoError,
        };
        Self::new(kind, None, err.to_string())
    }
}

impl From<csv::Error> for CountError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => io.into(),
            other => Self::io_error(None, format!("{:?}", other)),
        }
    }
}

impl From<walkdir::Error> for CountError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let kind = if err.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied)
        {
            ErrorKind::PermissionDenied
        } else {
            ErrorKind::IoError
        };
        Self::new(kind, path, err.to_string())
    }
}

/// Per-file estimation failures.
///
/// These never abort a run: the estimator registry downgrades every one of
/// them to a zero page count and a logged diagnostic.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Text content was not valid UTF-8.
    #[error("Text not valid UTF-8")]
    InvalidUtf8,
    /// An error occurred while parsing a PDF document.
    #[error("PDF parse error: {0}")]
    Pdf(String),
    /// The PDF is encrypted and no credentials were supplied.
    #[error("PDF is encrypted")]
    Encrypted,
    /// The OOXML/ODF container could not be opened.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// An XML part inside a container was malformed.
    #[error("XML parse error: {0}")]
    Xml(String),
    /// A required part is missing from the container.
    #[error("Missing document part: {0}")]
    MissingPart(&'static str),
    /// The capability this format depends on is not available.
    #[error("{0} is not available on this build or platform")]
    CapabilityMissing(&'static str),
    /// An external automation service returned something unusable.
    #[error("Automation error: {0}")]
    Automation(String),
    /// The parser panicked on this input.
    #[error("Parser panicked: {0}")]
    Panicked(String),
}

impl From<quick_xml::Error> for EstimateError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<lopdf::Error> for EstimateError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err.to_string())
    }
}
