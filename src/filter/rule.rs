//! Parsing of single ignore-rule lines
//!
//! Line syntax follows ignore-file conventions:
//! - `#` starts a comment that runs to the end of the line
//! - surrounding whitespace is insignificant
//! - a leading `!` negates the rule
//! - a leading `/` anchors the rule to the walk root
//! - a trailing `/` restricts the rule to directories

use std::fmt;

/// A parsed ignore rule
///
/// `pattern` is never empty and uses forward slashes only. The `!`, leading
/// `/` and trailing `/` markers are stripped from it and recorded as flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// Glob text with markers removed
    pub pattern: String,

    /// Rule re-includes what earlier rules ignored
    pub negated: bool,

    /// Rule is matched against the full root-relative path
    pub anchored: bool,

    /// Rule only applies to directories
    pub directory_only: bool,
}

impl IgnoreRule {
    /// Rule that matches every path and keeps it
    ///
    /// Substituted when no rules were supplied at all, so an unconfigured
    /// walk prints every file.
    pub fn match_all() -> Self {
        Self {
            pattern: "**".to_string(),
            negated: true,
            anchored: true,
            directory_only: false,
        }
    }

    /// Slice of the pattern as characters, for repeated matching
    pub(crate) fn pattern_chars(&self) -> Vec<char> {
        self.pattern.chars().collect()
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        if self.anchored {
            f.write_str("/")?;
        }
        f.write_str(&self.pattern)?;
        if self.directory_only {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Replace every backslash with a forward slash
pub fn to_forward_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

/// Remove a trailing `#` comment and surrounding whitespace
pub fn strip_comment(line: &str) -> &str {
    let line = line.trim();
    match line.find('#') {
        Some(idx) => line[..idx].trim(),
        None => line,
    }
}

/// Parse one raw line into a rule
///
/// Returns `None` for blank lines, comment-only lines, and lines whose
/// pattern is empty once markers are stripped (`!`, `/`, `!/`).
pub fn parse_rule(raw_line: &str) -> Option<IgnoreRule> {
    let line = strip_comment(raw_line);
    if line.is_empty() {
        return None;
    }

    let (text, negated) = match line.strip_prefix('!') {
        Some(rest) => (rest.trim(), true),
        None => (line, false),
    };

    let (text, anchored) = match text.strip_prefix('/') {
        Some(rest) => (rest, true),
        None => (text, false),
    };

    let (text, directory_only) = match text.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (text, false),
    };

    let pattern = to_forward_slashes(text);
    if pattern.is_empty() {
        return None;
    }

    Some(IgnoreRule {
        pattern,
        negated,
        anchored,
        directory_only,
    })
}
