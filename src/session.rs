//! Background counting runs
//!
//! A [`Session`] runs at most one walk at a time on a worker thread. The
//! front end drains [`WalkEvent`]s from the returned [`RunHandle`] and joins
//! it for the final [`RunReport`].

use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::CountConfig;
use crate::error::{CountError, ErrorKind};
use crate::estimators::EstimatorRegistry;
use crate::models::WalkOutcome;
use crate::progress::{ChannelObserver, WalkEvent};
use crate::report::{write_file_report, write_summary_report};
use crate::walker::{count_matching, walk_config};

/// What a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub outcome: WalkOutcome,
    pub output_path: PathBuf,
    pub summary_path: PathBuf,
    /// `false` when no file matched and no report was written
    pub reports_written: bool,
    pub duration_ms: u64,
}

/// A run in progress
pub struct RunHandle {
    events: Receiver<WalkEvent>,
    worker: JoinHandle<Result<RunReport, CountError>>,
}

impl RunHandle {
    /// Events in the order the worker produced them.
    ///
    /// Iteration ends once the worker has finished.
    pub fn events(&self) -> &Receiver<WalkEvent> {
        &self.events
    }

    /// Wait for the worker and return its report
    pub fn join(self) -> Result<RunReport, CountError> {
        drop(self.events);
        match self.worker.join() {
            Ok(result) => result,
            Err(_) => Err(CountError::new(
                ErrorKind::Unknown,
                None,
                "Counting worker panicked",
            )),
        }
    }
}

/// Clears the busy flag when the worker exits, even on panic
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owner of the single-run guard
#[derive(Debug, Default, Clone)]
pub struct Session {
    busy: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is in progress
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Validate `config` and start a run on a worker thread.
    ///
    /// Fails with [`ErrorKind::Busy`] while another run is in progress and
    /// with [`ErrorKind::InvalidInput`] when the config is rejected. Neither
    /// failure affects a run already in progress.
    pub fn launch(
        &self,
        config: CountConfig,
        registry: Arc<EstimatorRegistry>,
    ) -> Result<RunHandle, CountError> {
        config.validate()?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected run request: a run is already in progress");
            return Err(CountError::busy());
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("page-walker".to_string())
            .spawn(move || {
                let _guard = guard;
                run(&config, &registry, ChannelObserver::new(tx))
            })
            .map_err(|e| CountError::io_error(None, format!("Failed to start worker: {}", e)))?;

        Ok(RunHandle { events: rx, worker })
    }
}

fn run(
    config: &CountConfig,
    registry: &EstimatorRegistry,
    mut observer: ChannelObserver,
) -> Result<RunReport, CountError> {
    let start = Instant::now();
    let root = config.absolute_root();
    info!("Counting pages under {}", root.display());

    let total_files = count_matching(&root, &config.selection);
    observer.send(WalkEvent::Started { total_files });

    let mut report = RunReport {
        outcome: WalkOutcome::new(),
        output_path: config.output_path.clone(),
        summary_path: config.summary_path.clone(),
        reports_written: false,
        duration_ms: 0,
    };

    if total_files == 0 {
        info!("No matching files under {}", root.display());
        report.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(report);
    }

    report.outcome = walk_config(config, registry, &mut observer);

    if !report.outcome.results.is_empty() {
        write_file_report(&report.outcome.results, &config.output_path)?;
        write_summary_report(
            &report.outcome.folder_totals,
            report.outcome.run_total,
            &config.summary_path,
        )?;
        report.reports_written = true;
        observer.send(WalkEvent::ReportsWritten {
            output: config.output_path.clone(),
            summary: config.summary_path.clone(),
        });
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Counted {} page(s) in {} file(s) in {}ms",
        report.outcome.run_total,
        report.outcome.file_count(),
        report.duration_ms
    );
    Ok(report)
}
