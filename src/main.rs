//! mutflow CLI - mutant-schemata mutation testing for Rust.

use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mutflow::cli::{Cli, OutputFormat};
use mutflow::config::Config;
use mutflow::core::{Error, FileSet, Result, SourceFile};
use mutflow::harness::{ReferenceHarness, ReferenceHarnessConfig};
use mutflow::operators::OperatorCatalogue;
use mutflow::output::Format;
use mutflow::registry::DiscoveredPoint;
use mutflow::transform::TransformPass;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(&cli.path)?,
    };

    let format = match cli.format {
        OutputFormat::Json => Format::Json,
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Text => Format::Text,
    };

    match &cli.test_cmd {
        Some(test_cmd) => run_session(&cli, &config, test_cmd, format),
        None => run_report(&cli, &config, format),
    }
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    points: Vec<DiscoveredPoint>,
    diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    files_scanned: usize,
    total_points: usize,
    files: Vec<FileReport>,
}

/// "Report only" mode (SPEC_FULL.md §0.5): walk marked files and print
/// the dispatch points the transformer would inject, without requiring
/// a live registry session.
fn run_report(cli: &Cli, config: &Config, format: Format) -> Result<()> {
    let file_set = FileSet::from_path(&cli.path, config)?;
    let mut pass = TransformPass::new(OperatorCatalogue::new());

    let mut files = Vec::new();
    let mut total_points = 0;
    for path in file_set.iter() {
        let source = SourceFile::load(path)?;
        let relative = file_set.relative_path(path).display().to_string();
        let transformed = pass.transform(path, &relative, &source.content)?;
        if transformed.points.is_empty() && transformed.diagnostics.is_empty() {
            continue;
        }
        total_points += transformed.points.len();
        files.push(FileReport {
            path: relative,
            points: transformed.points,
            diagnostics: transformed.diagnostics,
        });
    }

    let report = Report {
        files_scanned: file_set.len(),
        total_points,
        files,
    };
    format.format(&report, &mut stdout())?;
    Ok(())
}

/// Drive a full baseline-then-mutation-runs session through
/// [`ReferenceHarness`] against `test_cmd`, then print the closing
/// summary (spec.md §4.4 "Summary").
fn run_session(cli: &Cli, config: &Config, test_cmd: &str, format: Format) -> Result<()> {
    let session_config = cli.apply_overrides(config.to_session_config());
    let harness_config = ReferenceHarnessConfig {
        test_command: test_cmd.to_string(),
        working_dir: Some(cli.path.clone()),
        timeout_ms: session_config.timeout_ms,
    };
    let harness = ReferenceHarness::new(session_config, harness_config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::config(e.to_string()))?;
    let summary = runtime.block_on(harness.run_to_completion())?;

    format.format(&summary, &mut stdout())?;

    if let Some(first_survivor) = summary.survivor_traps.first() {
        return Err(Error::MutationSurvived {
            display_name: first_survivor.clone(),
        });
    }
    if let Some(mutation) = summary.mutations.iter().find(|m| {
        matches!(
            m.outcome,
            mutflow::session::summary::OutcomeSummary::TimedOut { .. }
        )
    }) {
        let hint = match &mutation.outcome {
            mutflow::session::summary::OutcomeSummary::TimedOut { hint } => hint.clone(),
            _ => unreachable!(),
        };
        return Err(Error::MutationTimedOut {
            display_name: mutation.display_name.clone(),
            hint,
        });
    }

    Ok(())
}
