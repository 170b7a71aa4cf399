//! Document page counter
//!
//! Walks a folder tree, estimates the page count of every selected document
//! (PDF, DOCX, DOC, TXT, PPTX, ODT) and writes a file-by-file report and a
//! per-folder summary as CSV.

pub mod config;
pub mod error;
pub mod estimators;
pub mod models;
pub mod progress;
pub mod report;
pub mod session;
pub mod settings;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use config::CountConfig;
pub use error::{CountError, ErrorKind, EstimateError};
pub use estimators::{Capabilities, Capability, Estimator, EstimatorRegistry, CHARS_PER_PAGE};
pub use models::{DocumentType, ExtensionSelection, FileResult, FolderTotals, WalkOutcome};
pub use progress::{
    ChannelObserver, DoneMessage, FailureMessage, NoopObserver, ProgressMessage,
    ProgressReporter, ReportStyle, StartMessage, WalkEvent, WalkObserver,
};
pub use report::{write_file_report, write_summary_report};
pub use session::{RunHandle, RunReport, Session};
pub use settings::{Settings, SettingsStore};
pub use walker::{count_matching, walk, walk_config};
