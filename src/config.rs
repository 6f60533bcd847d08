//! Configuration types for filter-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Root path normalization and rule source resolution

use crate::error::{ConfigError, RuleError};
use crate::filter::{RuleSet, DEFAULT_IGNORE_FILE};
use crate::walker::queue::{DEFAULT_POLL_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use clap::Parser;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Duration;
use tracing::{debug, warn};

/// Hard cap on worker threads
pub const MAX_WORKERS: usize = 64;

/// Default cap applied to the CPU-derived worker count
const DEFAULT_WORKER_CAP: usize = 16;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Concurrent directory crawler with gitignore-style filtering
#[derive(Parser, Debug, Clone)]
#[command(
    name = "filter-walker",
    version,
    about = "Print every file under a directory that survives gitignore-style rules",
    long_about = "Walks a directory tree with a pool of worker threads and prints the full \
                  path of every file not excluded by the ignore rules.\n\n\
                  Rules come from a pattern file (default: <root>/.filterignore when present) \
                  followed by any --pattern arguments. The last matching rule wins; a leading \
                  '!' re-includes, a leading '/' anchors to the root, a trailing '/' matches \
                  directories only.",
    after_help = "EXAMPLES:\n    \
        filter-walker ./project\n    \
        filter-walker ./project -t 8 -p '*.log' -p '!keep.log'\n    \
        filter-walker /data --pattern-file rules.ignore --summary"
)]
pub struct CliArgs {
    /// Root directory to walk
    #[arg(value_name = "PATH", conflicts_with = "path_flag")]
    pub path: Option<PathBuf>,

    /// Root directory to walk (flag form)
    #[arg(long = "path", value_name = "PATH")]
    pub path_flag: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 't', long, default_value_t = default_workers(), value_name = "NUM")]
    pub threads: usize,

    /// Pattern file (missing file is an error when given explicitly)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub pattern_file: Option<PathBuf>,

    /// Extra ignore rule, applied after the pattern file (can be repeated)
    #[arg(short = 'p', long = "pattern", value_name = "GLOB", action = clap::ArgAction::Append)]
    pub patterns: Vec<String>,

    /// Work queue capacity
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_name = "NUM")]
    pub queue_size: usize,

    /// How often blocked workers re-check for shutdown
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64, value_name = "MS")]
    pub poll_interval_ms: u64,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Print walk statistics to stderr when done
    #[arg(long)]
    pub summary: bool,

    /// Verbose logging (show skipped directories and rules)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    num_cpus::get().clamp(1, DEFAULT_WORKER_CAP)
}

/// Where the file-based rules come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// Named on the command line; must be readable
    Required(PathBuf),

    /// Default file in the walk root; used only if present
    Optional(PathBuf),
}

impl RuleSource {
    /// Path of the rule file
    pub fn path(&self) -> &Path {
        match self {
            RuleSource::Required(path) | RuleSource::Optional(path) => path,
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Normalized absolute root, ending in a path separator
    pub root: String,

    /// Number of worker threads
    pub worker_count: usize,

    /// Work queue capacity
    pub queue_size: usize,

    /// Shutdown re-check interval for blocked workers
    pub poll_interval: Duration,

    /// File-based rule source
    pub rule_source: RuleSource,

    /// Rules from the command line, appended after file rules
    pub extra_patterns: Vec<String>,

    /// Show progress spinner
    pub show_progress: bool,

    /// Print summary after the walk
    pub show_summary: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Configuration for walking `root` with default settings
    ///
    /// `root` must already be normalized (see [`normalize_root`]).
    pub fn for_root(root: impl Into<String>) -> Self {
        let root = root.into();
        let rule_source = RuleSource::Optional(Path::new(&root).join(DEFAULT_IGNORE_FILE));

        Self {
            root,
            worker_count: default_workers(),
            queue_size: DEFAULT_QUEUE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            rule_source,
            extra_patterns: Vec::new(),
            show_progress: false,
            show_summary: false,
            verbose: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let raw_root = args
            .path
            .or(args.path_flag)
            .unwrap_or_else(|| PathBuf::from("."));
        let root = normalize_root(&raw_root)?;

        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval {
                millis: args.poll_interval_ms,
            });
        }

        let rule_source = match args.pattern_file {
            Some(path) => RuleSource::Required(path),
            None => RuleSource::Optional(Path::new(&root).join(DEFAULT_IGNORE_FILE)),
        };

        Ok(Self {
            root,
            worker_count: clamp_workers(args.threads),
            queue_size: args.queue_size,
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            rule_source,
            extra_patterns: args.patterns,
            show_progress: args.progress,
            show_summary: args.summary,
            verbose: args.verbose,
        })
    }

    /// Assemble the rule set: file rules, then command-line rules
    ///
    /// Falls back to a single match-all keep rule when nothing was supplied.
    pub fn load_rules(&self) -> Result<RuleSet, RuleError> {
        let mut rules = match &self.rule_source {
            RuleSource::Required(path) => RuleSet::load_file(path)?,
            RuleSource::Optional(path) if path.is_file() => RuleSet::load_file(path)?,
            RuleSource::Optional(path) => {
                debug!(path = %path.display(), "No default pattern file");
                RuleSet::new()
            }
        };

        rules.extend_lines(&self.extra_patterns);
        Ok(rules.or_match_all())
    }
}

/// Clamp a requested worker count into `1..=MAX_WORKERS`
pub fn clamp_workers(requested: usize) -> usize {
    let count = requested.clamp(1, MAX_WORKERS);
    if count != requested {
        warn!(requested, using = count, max = MAX_WORKERS, "Worker count out of range");
    }
    count
}

/// Resolve `path` to an absolute directory path ending in a separator
pub fn normalize_root(path: &Path) -> Result<String, ConfigError> {
    let absolute = std::fs::canonicalize(path).map_err(|e| ConfigError::InvalidRoot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !absolute.is_dir() {
        return Err(ConfigError::NotADirectory { path: absolute });
    }

    let mut root = absolute
        .to_str()
        .ok_or_else(|| ConfigError::NonUtf8Root {
            path: absolute.clone(),
        })?
        .to_string();

    if !root.ends_with(['/', '\\']) {
        root.push(MAIN_SEPARATOR);
    }

    Ok(root)
}
