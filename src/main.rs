//! filter-walker - Concurrent Directory Crawler with Ignore Rules
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use filter_walker::config::{CliArgs, WalkConfig};
use filter_walker::progress::{print_summary, ProgressReporter};
use filter_walker::walker::WalkCoordinator;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose);

    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    let rules = config
        .load_rules()
        .context("Failed to load ignore rules")?;

    for rule in rules.iter() {
        info!(rule = %rule, "Rule");
    }

    let progress = config.show_progress.then(ProgressReporter::new);
    if let Some(ref p) = progress {
        p.set_status("Walking...");
    }

    let coordinator = WalkCoordinator::new(config.clone(), rules);
    let (result, _) = coordinator
        .run_with_progress(io::stdout(), |snapshot| {
            if let Some(ref p) = progress {
                p.update(snapshot);
            }
        })
        .context("Walk failed")?;

    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    if config.show_summary {
        print_summary(&result, &config.root);
    }

    if result.errors > 0 {
        info!(errors = result.errors, "Walk completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let default = if verbose {
        "filter_walker=debug,warn"
    } else {
        "filter_walker=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
