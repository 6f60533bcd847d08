//! Deduplication registry for emitted paths
//!
//! Keys are root-relative, forward-slash paths folded to lower case, so the
//! same logical file reached through differently-cased components is only
//! reported once. The set is owned by whoever builds the walk and shared
//! with the workers; independent walks use independent sets.

use parking_lot::Mutex;
use std::collections::HashSet;

/// Mutex-guarded set of relative paths already emitted
#[derive(Debug, Default)]
pub struct SeenSet {
    paths: Mutex<HashSet<String>>,
}

impl SeenSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    fn key(relative_path: &str) -> String {
        relative_path.to_lowercase()
    }

    /// Record a path, returning `true` if it was not seen before
    ///
    /// Membership test and insertion happen under one lock acquisition, so
    /// exactly one of several racing callers gets `true`.
    pub fn insert(&self, relative_path: &str) -> bool {
        let key = Self::key(relative_path);
        self.paths.lock().insert(key)
    }

    /// Check whether a path was already recorded
    pub fn contains(&self, relative_path: &str) -> bool {
        self.paths.lock().contains(&Self::key(relative_path))
    }

    /// Number of distinct paths recorded
    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    /// Check if no path was recorded
    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }
}
