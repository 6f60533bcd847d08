//! Error types for filter-walker
//!
//! This module defines the error hierarchy for:
//! - Configuration and root path resolution
//! - Loading ignore rules
//! - Directory listing (recoverable, per directory)
//! - Worker thread lifecycle
//!
//! Startup errors are fatal and surface through [`WalkerError`]. Listing
//! errors never leave the worker that hit them; they are reported as a
//! [`WalkOutcome`] and logged.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the filter-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ignore rule loading errors
    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root path could not be resolved
    #[error("Failed to resolve root '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Root exists but is not a directory
    #[error("Path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Root path is not representable as UTF-8
    #[error("Root path is not valid UTF-8: '{path}'")]
    NonUtf8Root { path: PathBuf },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid poll interval
    #[error("Invalid poll interval {millis}ms: must be at least 1ms")]
    InvalidPollInterval { millis: u64 },
}

/// Errors raised while assembling the rule set
#[derive(Error, Debug)]
pub enum RuleError {
    /// Rule file missing or unreadable
    #[error("Failed to open pattern file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory listing errors
///
/// These are always handled inside the worker: the directory (or the single
/// entry) is skipped and the walk continues.
#[derive(Error, Debug, Clone)]
pub enum ListError {
    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: String },

    /// Path vanished between discovery and listing
    #[error("Path not found: '{path}'")]
    NotFound { path: String },

    /// Entry name is not valid UTF-8
    #[error("Entry name in '{dir}' is not valid UTF-8: {name}")]
    NonUtf8Name { dir: String, name: String },

    /// Directory could not be read
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: String, reason: String },

    /// Entry metadata could not be read
    #[error("Failed to stat '{path}': {reason}")]
    StatFailed { path: String, reason: String },
}

impl ListError {
    /// Build a listing error from an I/O error on `path`
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ListError::PermissionDenied {
                path: path.to_string(),
            },
            std::io::ErrorKind::NotFound => ListError::NotFound {
                path: path.to_string(),
            },
            _ => ListError::ReadDirFailed {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Check if this error is an expected race or access condition
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ListError::PermissionDenied { .. }
                | ListError::NotFound { .. }
                | ListError::NonUtf8Name { .. }
        )
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Output writer thread failed
    #[error("Output writer failed: {0}")]
    WriterFailed(String),

    /// Work queue closed before the root could be seeded
    #[error("Work queue closed")]
    QueueClosed,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for ListError
pub type ListResult<T> = std::result::Result<T, ListError>;

/// Represents the outcome of expanding a single directory
#[derive(Debug)]
pub enum WalkOutcome {
    /// Listed the directory and classified every child
    Success {
        path: String,
        entries: usize,
        subdirs: usize,
    },

    /// Skipped due to recoverable error
    Skipped { path: String, reason: String },

    /// Listing failed; treated as an empty directory
    Failed { path: String, error: ListError },
}

impl WalkOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, WalkOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &str {
        match self {
            WalkOutcome::Success { path, .. } => path,
            WalkOutcome::Skipped { path, .. } => path,
            WalkOutcome::Failed { path, .. } => path,
        }
    }
}
