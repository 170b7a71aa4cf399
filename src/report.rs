//! CSV report writers
//!
//! Both reports are UTF-8, comma-delimited, start with a header row and use
//! `\r\n` record terminators. Existing files are overwritten.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CountError;
use crate::models::{FileResult, FolderTotals};

/// Header of the file-by-file report
pub const FILE_REPORT_HEADER: [&str; 4] = ["Type", "Path", "Name", "Pages"];

/// Header of the per-folder summary
pub const SUMMARY_REPORT_HEADER: [&str; 2] = ["Folder", "Total Pages"];

/// First column of the summary's final row
pub const TOTAL_LABEL: &str = "Total";

fn csv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(sink)
}

fn create(path: &Path) -> Result<File, CountError> {
    File::create(path).map_err(|e| CountError::from(e).with_path(path))
}

/// Write one row per result, in the order given
pub fn write_file_rows<W: Write>(results: &[FileResult], sink: W) -> Result<(), CountError> {
    let mut writer = csv_writer(sink);
    writer.write_record(FILE_REPORT_HEADER)?;
    for result in results {
        let path = result.path.to_string_lossy();
        let pages = result.pages.to_string();
        writer.write_record([
            result.doc_type.as_str(),
            &*path,
            result.name.as_str(),
            pages.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row per folder followed by the `Total` row
pub fn write_summary_rows<W: Write>(
    folder_totals: &FolderTotals,
    run_total: u64,
    sink: W,
) -> Result<(), CountError> {
    let mut writer = csv_writer(sink);
    writer.write_record(SUMMARY_REPORT_HEADER)?;
    for (folder, pages) in folder_totals.iter() {
        let folder = folder.to_string_lossy();
        let pages = pages.to_string();
        writer.write_record([&*folder, pages.as_str()])?;
    }
    let total = run_total.to_string();
    writer.write_record([TOTAL_LABEL, total.as_str()])?;
    writer.flush()?;
    Ok(())
}

/// Write the file-by-file report to `path`
pub fn write_file_report(results: &[FileResult], path: &Path) -> Result<(), CountError> {
    write_file_rows(results, create(path)?).map_err(|e| e.with_path(path))
}

/// Write the per-folder summary to `path`
pub fn write_summary_report(
    folder_totals: &FolderTotals,
    run_total: u64,
    path: &Path,
) -> Result<(), CountError> {
    write_summary_rows(folder_totals, run_total, create(path)?).map_err(|e| e.with_path(path))
}
