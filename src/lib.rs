//! filter-walker - Concurrent Directory Crawler with Ignore Rules
//!
//! Walks a directory tree with a pool of worker threads and reports the full
//! path of every file that survives a gitignore-style rule set.
//!
//! # Features
//!
//! - **Parallel Walking**: A fixed pool of worker threads shares a bounded
//!   work queue of directories.
//!
//! - **Subtree Pruning**: Ignored directories are never listed, so nothing
//!   below them is visited.
//!
//! - **Exact Termination**: An in-flight task counter ends the walk the
//!   moment the last directory is finished, with no idle timeouts.
//!
//! - **Deduplication**: Each root-relative path is reported at most once
//!   per walk, compared case-insensitively.
//!
//! # Rule Syntax
//!
//! | Form        | Meaning                                        |
//! |-------------|------------------------------------------------|
//! | `# text`    | comment                                        |
//! | `!pattern`  | re-include what earlier rules ignored          |
//! | `/pattern`  | anchored to the walk root                      |
//! | `pattern/`  | matches directories only                       |
//! | `*`         | one or more characters within a path component |
//! | `**`        | zero or more characters, crossing `/`          |
//!
//! The last matching rule decides.
//!
//! # Example
//!
//! ```bash
//! # Walk the current directory using ./.filterignore if present
//! filter-walker .
//!
//! # Explicit rule file plus extra rules
//! filter-walker ~/src -f rules.ignore -p 'target/' -p '!*.rs'
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, WalkConfig};
pub use error::{Result, WalkerError};
pub use filter::{IgnoreRule, RuleSet};
pub use walker::{WalkCoordinator, WalkResult};
