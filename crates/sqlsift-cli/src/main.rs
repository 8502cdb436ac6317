//! sqlsift CLI - SQL inventory from JDBC query logs

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlsift_core::report::{events_as_json, inventory_as_json};
use sqlsift_core::{Analysis, LogBlockExtractor, Pipeline, QueryEvent};
use tracing::{info, warn};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let quiet = args.quiet;
    match args.command {
        Command::Analyze {
            files,
            config: config_path,
            format,
            output,
            allow_missing,
            fail_on_unparsed,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(&files, format, &output, allow_missing);

            let log_files = collect_files(&config.files, config.allow_missing)?;
            if log_files.is_empty() {
                miette::bail!(
                    "No log files specified. Use positional arguments or configure in sqlsift.toml"
                );
            }

            let analysis = analyze_files(&log_files)?;
            let report = OutputFormatter::new(config.output_format()).render(&analysis)?;
            emit(&report, config.report_file.as_deref())?;

            if !quiet {
                if analysis.has_failures() {
                    eprintln!(
                        "Analyzed {} file(s); {} statement(s) could not be analyzed",
                        log_files.len(),
                        analysis.failures.len()
                    );
                } else {
                    eprintln!("Analyzed {} file(s)", log_files.len());
                }
            }

            Ok(fail_on_unparsed && analysis.has_failures())
        }

        Command::Events { file } => {
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let events: Vec<QueryEvent> = LogBlockExtractor::new(content.lines()).collect();
            println!("{}", events_as_json(&events).into_diagnostic()?);
            Ok(false)
        }

        Command::Inventory { files } => {
            let patterns: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            let log_files = collect_files(&patterns, false)?;
            let analysis = analyze_files(&log_files)?;
            println!("{}", inventory_as_json(&analysis.inventory).into_diagnostic()?);
            Ok(false)
        }
    }
}

/// Expand glob patterns and check that plain paths exist
fn collect_files(patterns: &[String], allow_missing: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let before = files.len();
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                files.push(path);
            }
            if files.len() == before {
                if !allow_missing {
                    miette::bail!("Pattern '{}' matched no files", pattern);
                }
                warn!(pattern = %pattern, "pattern matched no files");
            }
        } else {
            let path = PathBuf::from(pattern);
            if !path.exists() {
                if !allow_missing {
                    miette::bail!("Log file '{}' does not exist", pattern);
                }
                warn!(path = %pattern, "log file missing, skipped");
                continue;
            }
            files.push(path);
        }
    }

    Ok(files)
}

/// Analyze each file on its own pipeline, then merge
fn analyze_files(files: &[PathBuf]) -> Result<Analysis> {
    let mut total = Analysis::default();
    for file in files {
        let content = fs::read_to_string(file).into_diagnostic()?;
        let analysis = Pipeline::run(content.lines());
        info!(
            file = %file.display(),
            events = analysis.events.len(),
            failed = analysis.failures.len(),
            "file analyzed"
        );
        total.merge(analysis);
    }
    Ok(total)
}

fn emit(report: &str, report_file: Option<&str>) -> Result<()> {
    match report_file {
        Some(path) => {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).into_diagnostic()?;
            }
            fs::write(&path, report).into_diagnostic()?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", report),
    }
    Ok(())
}
