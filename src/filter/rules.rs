//! Ordered rule sets and the ignore decision
//!
//! Rules are evaluated in order and the last matching rule wins: a plain rule
//! marks the path ignored, a negated rule marks it kept. A path that no rule
//! matches is kept.

use crate::error::RuleError;
use crate::filter::glob::{contains_dir_segment, match_chars};
use crate::filter::rule::{parse_rule, IgnoreRule};
use std::path::Path;
use tracing::debug;

/// Name of the rule file looked up in the walk root by default
pub const DEFAULT_IGNORE_FILE: &str = ".filterignore";

/// A rule together with its pattern split into characters
#[derive(Debug, Clone)]
struct CompiledRule {
    rule: IgnoreRule,
    chars: Vec<char>,
}

impl CompiledRule {
    fn new(rule: IgnoreRule) -> Self {
        let chars = rule.pattern_chars();
        Self { rule, chars }
    }

    fn matches(&self, relative_path: &str, candidate: &[char]) -> bool {
        if self.rule.anchored {
            return match_chars(candidate, &self.chars, true);
        }

        if self.rule.directory_only {
            return contains_dir_segment(relative_path, &self.rule.pattern);
        }

        (0..candidate.len()).any(|start| match_chars(&candidate[start..], &self.chars, false))
    }
}

/// Ordered, immutable-once-built sequence of ignore rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from raw lines, skipping blanks and comments
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend_lines(lines);
        set
    }

    /// Read and parse a rule file
    ///
    /// A missing or unreadable file is an error: walking with undefined
    /// filtering is refused.
    pub fn load_file(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::from_lines(content.lines());
        debug!(path = %path.display(), rules = set.len(), "Loaded pattern file");
        Ok(set)
    }

    /// Append a parsed rule
    pub fn push(&mut self, rule: IgnoreRule) {
        self.rules.push(CompiledRule::new(rule));
    }

    /// Parse and append raw lines
    pub fn extend_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            if let Some(rule) = parse_rule(line.as_ref()) {
                self.push(rule);
            }
        }
    }

    /// Append every rule of `other`, preserving order
    pub fn append(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Substitute the match-all keep rule if the set is empty
    pub fn or_match_all(mut self) -> Self {
        if self.rules.is_empty() {
            self.push(IgnoreRule::match_all());
        }
        self
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Decide whether a root-relative, forward-slash path is ignored
    pub fn is_ignored(&self, relative_path: &str, is_directory: bool) -> bool {
        let candidate: Vec<char> = relative_path.chars().collect();
        let mut ignored = false;

        for compiled in &self.rules {
            if compiled.rule.directory_only && !is_directory {
                continue;
            }
            if compiled.matches(relative_path, &candidate) {
                ignored = !compiled.rule.negated;
            }
        }

        ignored
    }
}
