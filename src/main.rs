//! Page Tally CLI
//!
//! Counts document pages under a folder and writes CSV reports.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use page_tally::config::{DEFAULT_OUTPUT_FILE, DEFAULT_SETTINGS_FILE, DEFAULT_SUMMARY_FILE};
use page_tally::{
    Capabilities, CountConfig, EstimatorRegistry, ExtensionSelection,
    ProgressReporter, ReportStyle, RunReport, Session, Settings, SettingsStore,
};

const ABOUT: &str = r#"
Page Tally - document page counter

Examples:
  page_tally count -r ~/docs                     count with the saved file types
  page_tally count -r ~/docs -t .pdf,.docx       count PDF and DOCX only
  page_tally count --json                        reuse the saved folder, JSON output
  page_tally settings                            show the saved settings
"#;

/// Document page counter
#[derive(Parser)]
#[command(name = "page_tally")]
#[command(author, version, about = ABOUT, long_about = None)]
#[command(help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count pages of the selected documents under a folder
    Count {
        /// Folder to walk (defaults to the saved folder)
        #[arg(short = 'r', long)]
        root: Option<PathBuf>,

        /// Comma-separated extensions, e.g. ".pdf,.docx"
        #[arg(short = 't', long, value_parser = ExtensionSelection::parse_strict)]
        types: Option<ExtensionSelection>,

        /// File-by-file report
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Per-folder summary report
        #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
        summary: PathBuf,

        /// Settings file
        #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
        config: PathBuf,

        /// Emit JSON progress on stderr and the outcome as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Do not persist the folder and file types
        #[arg(long)]
        no_save: bool,
    },
    /// Show the saved settings
    Settings {
        /// Settings file
        #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Count {
            root,
            types,
            output,
            summary,
            config,
            json,
            no_save,
        }) => {
            let store = SettingsStore::new(config);
            let saved = store.load();

            let root = root.unwrap_or_else(|| PathBuf::from(&saved.folder_path));
            let selection = types
                .or_else(|| (!saved.file_types.is_empty()).then(|| saved.file_types.clone()))
                .unwrap_or_else(ExtensionSelection::first_run);

            let config = CountConfig::builder()
                .root(root)
                .selection(selection)
                .output_path(output)
                .summary_path(summary)
                .build();
            debug!("Config: {:?}", config);

            let style = if json { ReportStyle::Json } else { ReportStyle::Text };
            let mut reporter = ProgressReporter::new(style, 200);

            if let Err(e) = config.validate() {
                reporter.report_error(&e);
                return ExitCode::from(2);
            }

            if !no_save {
                let settings = Settings {
                    folder_path: config.absolute_root().to_string_lossy().to_string(),
                    file_types: config.selection.clone(),
                };
                if let Err(e) = store.save(&settings) {
                    reporter.report_error(&e);
                }
            }

            info!(
                "Counting {} under {}",
                config.selection.to_dotted_list(),
                config.root.display()
            );

            let registry = Arc::new(EstimatorRegistry::new(&Capabilities::detect()));
            let session = Session::new();
            let handle = match session.launch(config, registry) {
                Ok(handle) => handle,
                Err(e) => {
                    reporter.report_error(&e);
                    return ExitCode::from(2);
                }
            };

            for event in handle.events().iter() {
                reporter.handle(&event);
            }

            match handle.join() {
                Ok(report) => {
                    reporter.report_done(&report.outcome);
                    print_report(&report, json)
                }
                Err(e) => {
                    reporter.report_error(&e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(Commands::Settings { config }) => {
            let store = SettingsStore::new(config);
            let settings = store.load();
            println!("Settings file: {}", store.path().display());
            println!("  Folder:     {}", settings.folder_path);
            println!("  File types: {}", settings.file_types.to_dotted_list());
            ExitCode::SUCCESS
        }
        None => {
            println!("{}", ABOUT);
            println!("Run 'page_tally count -h' for the count options");
            ExitCode::SUCCESS
        }
    }
}

fn print_report(report: &RunReport, json: bool) -> ExitCode {
    if json {
        return match serde_json::to_string_pretty(&report.outcome) {
            Ok(body) => {
                println!("{}", body);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    if !report.reports_written {
        println!("No files found with the selected extensions");
        return ExitCode::SUCCESS;
    }

    println!();
    println!("Pages per folder:");
    for (folder, pages) in report.outcome.folder_totals.iter() {
        println!("  {}: {}", folder.display(), pages);
    }
    println!("Total pages: {}", report.outcome.run_total);
    if report.outcome.issue_count() > 0 {
        println!("Skipped entries: {}", report.outcome.issue_count());
    }
    println!(
        "Finished in {}ms. See {} and {}",
        report.duration_ms,
        report.output_path.display(),
        report.summary_path.display()
    );
    ExitCode::SUCCESS
}
