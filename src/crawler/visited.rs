//! Visited-URI tracking for one crawl run

use std::collections::HashSet;

/// Set of page URIs already fetched in this run
///
/// Comparison is case-insensitive: two URIs differing only in path case
/// count as the same page. On case-sensitive servers this can produce a
/// false "already visited" hit for genuinely distinct resources; that is
/// accepted crawler behavior, not corrected here.
///
/// The set grows monotonically and lives exactly as long as one run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    uris: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URI; returns `true` if it was not present before
    pub fn insert(&mut self, uri: &str) -> bool {
        self.uris.insert(uri.to_lowercase())
    }

    /// Checks whether a URI has been visited
    pub fn contains(&self, uri: &str) -> bool {
        self.uris.contains(&uri.to_lowercase())
    }

    /// Number of distinct URIs visited so far
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Returns `true` if nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}
