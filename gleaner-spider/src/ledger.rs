use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Remembers which URLs a crawl has already queued.
///
/// Injected into the spider so callers can share one ledger across several
/// crawls or back it with something persistent.
pub trait VisitLedger: Send + Sync {
    fn has_visited(&self, url: &str) -> bool;

    /// Marks `url` and returns `true` if it was not marked before.
    fn mark_visited(&self, url: &str) -> bool;

    fn visited_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    visited: Mutex<HashSet<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitLedger for MemoryLedger {
    fn has_visited(&self, url: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    fn mark_visited(&self, url: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    fn visited_count(&self) -> usize {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
