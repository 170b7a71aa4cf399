//! Walker module - traverses a folder tree and tallies pages
//!
//! Traversal is depth-first with entries sorted by file name inside each
//! directory, so two walks over an unchanged tree yield the same order.

use log::{debug, warn};
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use crate::config::CountConfig;
use crate::error::CountError;
use crate::estimators::EstimatorRegistry;
use crate::models::{ExtensionSelection, FileResult, WalkOutcome};
use crate::progress::WalkObserver;

fn walker(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

/// Count the files under `root` whose extension is selected.
///
/// Used to size progress displays before the walk starts.
pub fn count_matching(root: &Path, selection: &ExtensionSelection) -> u64 {
    walker(root)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| selection.match_path(entry.path()).is_some())
        .count() as u64
}

/// Walk `root`, estimate every selected file and accumulate totals.
///
/// For each matching file the observer sees `on_current_file`, then
/// `on_file_result`, then `on_progress_tick`. Once traversal ends it sees
/// `on_current_file(None)`. Unreadable entries are logged, recorded in
/// [`WalkOutcome::issues`] and skipped.
pub fn walk(
    root: &Path,
    selection: &ExtensionSelection,
    registry: &EstimatorRegistry,
    observer: &mut dyn WalkObserver,
) -> WalkOutcome {
    let start = Instant::now();
    let mut outcome = WalkOutcome::new();

    for entry in walker(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let issue = CountError::from(e);
                warn!("Skipping unreadable entry: {}", issue);
                outcome.issues.push(issue);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(doc_type) = selection.match_path(path) else {
            continue;
        };

        observer.on_current_file(Some(path));

        let pages = registry.estimate(doc_type, path);
        let result = FileResult::new(doc_type, path.to_path_buf(), pages);
        debug!("{}: {} page(s)", result.path.display(), result.pages);

        outcome.record(result);
        if let Some(result) = outcome.results.last() {
            observer.on_file_result(result);
        }
        observer.on_progress_tick();
    }

    observer.on_current_file(None);

    debug!(
        "Walked {} in {}ms: {} file(s), {} page(s)",
        root.display(),
        start.elapsed().as_millis(),
        outcome.file_count(),
        outcome.run_total
    );

    outcome
}

/// Walk using the root and selection from `config`
pub fn walk_config(
    config: &CountConfig,
    registry: &EstimatorRegistry,
    observer: &mut dyn WalkObserver,
) -> WalkOutcome {
    walk(&config.absolute_root(), &config.selection, registry, observer)
}
