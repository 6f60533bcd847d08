//! Ignore-rule engine
//!
//! Turns ignore-file lines into [`IgnoreRule`]s and decides, for a
//! root-relative path, whether it is ignored. Everything here is pure and
//! operates on immutable data, so a [`RuleSet`] is shared between worker
//! threads behind an `Arc` without locking.
//!
//! # Example
//!
//! ```
//! use filter_walker::filter::RuleSet;
//!
//! let rules = RuleSet::from_lines(["*.log", "!important.log", "build/"]);
//! assert!(rules.is_ignored("debug.log", false));
//! assert!(!rules.is_ignored("important.log", false));
//! assert!(rules.is_ignored("a/build", true));
//! ```

pub mod glob;
pub mod rule;
pub mod rules;

pub use glob::{contains_dir_segment, match_glob};
pub use rule::{parse_rule, IgnoreRule};
pub use rules::{RuleSet, DEFAULT_IGNORE_FILE};
