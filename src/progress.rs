//! Progress reporting for counting runs
//!
//! The walker talks to whatever front end is attached through
//! [`WalkObserver`]. [`ChannelObserver`] forwards those calls as
//! [`WalkEvent`]s to another thread, and [`ProgressReporter`] renders the
//! events on stderr, either as human-readable lines or as JSON messages.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::time::Instant;

use crate::error::CountError;
use crate::models::{FileResult, WalkOutcome};

/// Callbacks the walker invokes while it runs.
///
/// Every method defaults to a no-op, so implementors only override what
/// they render.
pub trait WalkObserver {
    /// One matching file has been processed
    fn on_progress_tick(&mut self) {}

    /// The file now being processed, or `None` once the walk is over
    fn on_current_file(&mut self, _path: Option<&Path>) {}

    /// A file result has been produced, in walk order
    fn on_file_result(&mut self, _result: &FileResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WalkObserver for NoopObserver {}

/// Messages sent from the worker thread to the front end
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// The worker counted the matching files and is about to walk
    Started { total_files: u64 },
    /// File currently being processed; `None` clears the display
    CurrentFile(Option<PathBuf>),
    /// One more file processed
    Tick,
    /// A completed file result
    FileResult(FileResult),
    /// Both reports were written
    ReportsWritten { output: PathBuf, summary: PathBuf },
}

/// Observer that forwards every callback over a channel.
///
/// A disconnected receiver is ignored: the walk still runs to completion.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<WalkEvent>,
}

impl ChannelObserver {
    /// Create an observer sending on `tx`
    pub fn new(tx: Sender<WalkEvent>) -> Self {
        Self { tx }
    }

    /// Send an event that is not one of the walker callbacks
    pub fn send(&self, event: WalkEvent) {
        let _ = self.tx.send(event);
    }
}

impl WalkObserver for ChannelObserver {
    fn on_progress_tick(&mut self) {
        self.send(WalkEvent::Tick);
    }

    fn on_current_file(&mut self, path: Option<&Path>) {
        self.send(WalkEvent::CurrentFile(path.map(Path::to_path_buf)));
    }

    fn on_file_result(&mut self, result: &FileResult) {
        self.send(WalkEvent::FileResult(result.clone()));
    }
}

/// Start message sent when a run begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    /// Message type identifier
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Number of matching files to process
    pub total: u64,
}

impl StartMessage {
    /// Create a new start message
    pub fn new(seq: u64, ts: u64, total: u64) -> Self {
        Self {
            msg_type: "start",
            seq,
            ts,
            total,
        }
    }
}

/// Progress message sent after each processed file
#[derive(Debug, Clone, Serialize)]
pub struct ProgressMessage {
    /// Message type identifier ("p" for progress)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Files processed so far
    #[serde(rename = "n")]
    pub processed: u64,
    /// Files to process in total
    #[serde(rename = "of")]
    pub total: u64,
    /// File most recently started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ProgressMessage {
    /// Create a new progress message
    pub fn new(seq: u64, ts: u64, processed: u64, total: u64, file: Option<String>) -> Self {
        Self {
            msg_type: "p",
            seq,
            ts,
            processed,
            total,
            file,
        }
    }
}

/// Message carrying one file result
#[derive(Debug, Clone, Serialize)]
pub struct FileMessage<'a> {
    /// Message type identifier ("f" for file)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// The result itself
    #[serde(flatten)]
    pub result: &'a FileResult,
}

/// A run-level failure, as sent in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct FailureMessage {
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    /// Failure category, e.g. `InvalidInput` or `Busy`
    pub kind: String,
    pub message: String,
    /// Offending path, when one is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FailureMessage {
    pub fn from_error(seq: u64, ts: u64, error: &CountError) -> Self {
        Self {
            msg_type: "err",
            seq,
            ts,
            kind: format!("{:?}", error.kind),
            message: error.message.clone(),
            path: error.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
        }
    }
}

/// Done message sent when a run completes
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    /// Message type identifier ("done" for completion)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Number of files processed
    #[serde(rename = "tf")]
    pub total_files: usize,
    /// Number of distinct folders
    #[serde(rename = "fd")]
    pub folders: usize,
    /// Sum of all pages
    #[serde(rename = "tp")]
    pub total_pages: u64,
    /// Number of traversal issues
    #[serde(rename = "ec")]
    pub error_count: usize,
    /// Total run duration in milliseconds
    pub ms: u64,
}

impl DoneMessage {
    /// Create a new done message
    pub fn new(seq: u64, ts: u64, outcome: &WalkOutcome) -> Self {
        Self {
            msg_type: "done",
            seq,
            ts,
            total_files: outcome.file_count(),
            folders: outcome.folder_totals.len(),
            total_pages: outcome.run_total,
            error_count: outcome.issue_count(),
            ms: ts,
        }
    }
}

/// Output format of the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Human-readable lines
    Text,
    /// One JSON message per line
    Json,
}

/// Renders [`WalkEvent`]s on the front-end thread.
///
/// Progress lines are throttled to `interval_ms`; file results, errors and
/// completion are always written.
pub struct ProgressReporter {
    style: ReportStyle,
    interval_ms: u64,
    last_report: Option<Instant>,
    seq: AtomicU64,
    start_time: Instant,
    processed: u64,
    total: u64,
    current: Option<PathBuf>,
}

impl ProgressReporter {
    /// Create a new reporter
    ///
    /// # Arguments
    /// * `style` - Text or JSON output
    /// * `interval_ms` - Minimum interval between progress lines in milliseconds
    pub fn new(style: ReportStyle, interval_ms: u64) -> Self {
        Self {
            style,
            interval_ms,
            last_report: None,
            seq: AtomicU64::new(0),
            start_time: Instant::now(),
            processed: 0,
            total: 0,
            current: None,
        }
    }

    /// Get the next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Get the current timestamp in milliseconds since reporter creation
    pub fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Files processed so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Files expected in total
    pub fn total(&self) -> u64 {
        self.total
    }

    /// File currently shown as in progress
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Check if enough time has passed since the last progress line
    fn should_report(&self) -> bool {
        match self.last_report {
            None => true,
            Some(at) => at.elapsed().as_millis() as u64 >= self.interval_ms,
        }
    }

    /// Output a serializable message to stderr as JSON
    pub fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    /// Apply one event and render it
    pub fn handle(&mut self, event: &WalkEvent) {
        match event {
            WalkEvent::Started { total_files } => {
                self.total = *total_files;
                self.processed = 0;
                match self.style {
                    ReportStyle::Json => {
                        let msg =
                            StartMessage::new(self.next_seq(), self.current_timestamp(), self.total);
                        self.output_to_stderr(&msg);
                    }
                    ReportStyle::Text => eprintln!("Processing {} file(s)...", self.total),
                }
            }
            WalkEvent::CurrentFile(path) => self.current = path.clone(),
            WalkEvent::Tick => {
                self.processed += 1;
                let last = self.processed == self.total;
                if last || self.should_report() {
                    self.report_progress();
                }
            }
            WalkEvent::FileResult(result) => self.report_file(result),
            WalkEvent::ReportsWritten { output, summary } => {
                if self.style == ReportStyle::Text {
                    eprintln!(
                        "Reports written to {} and {}",
                        output.display(),
                        summary.display()
                    );
                }
            }
        }
    }

    fn report_progress(&mut self) {
        match self.style {
            ReportStyle::Json => {
                let msg = ProgressMessage::new(
                    self.next_seq(),
                    self.current_timestamp(),
                    self.processed,
                    self.total,
                    self.current
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string()),
                );
                self.output_to_stderr(&msg);
            }
            ReportStyle::Text => {
                let file = self
                    .current
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                eprintln!("[{}/{}] {}", self.processed, self.total, file);
            }
        }
        self.last_report = Some(Instant::now());
    }

    fn report_file(&self, result: &FileResult) {
        match self.style {
            ReportStyle::Json => {
                let msg = FileMessage {
                    msg_type: "f",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    result,
                };
                self.output_to_stderr(&msg);
            }
            ReportStyle::Text => println!(
                "{}, {}, {}, {} pages",
                result.doc_type,
                result.path.display(),
                result.name,
                result.pages
            ),
        }
    }

    /// Report a failure
    ///
    /// Outputs a [`FailureMessage`], or a plain line in text mode.
    pub fn report_error(&self, error: &CountError) {
        match self.style {
            ReportStyle::Json => {
                let msg =
                    FailureMessage::from_error(self.next_seq(), self.current_timestamp(), error);
                self.output_to_stderr(&msg);
            }
            ReportStyle::Text => eprintln!("Error: {}", error.message),
        }
    }

    /// Report run completion
    pub fn report_done(&self, outcome: &WalkOutcome) {
        if self.style == ReportStyle::Json {
            let msg = DoneMessage::new(self.next_seq(), self.current_timestamp(), outcome);
            self.output_to_stderr(&msg);
        }
    }
}
