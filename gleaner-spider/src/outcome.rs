use crate::extract::PageRole;
use crate::record::{ContentType, Emitted};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A page that was fetched and extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitedPage {
    pub url: String,
    pub role: PageRole,
    pub depth: usize,
    pub status_code: u16,
    pub response_time: Duration,
    pub items_emitted: usize,
    pub links_followed: usize,
}

/// A queued page that could not be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedVisit {
    pub url: String,
    pub role: PageRole,
    pub error: String,
}

/// Page structure that was expected but missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionGap {
    pub url: String,
    pub role: PageRole,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub seed_url: String,
    pub items: Vec<Emitted>,
    pub visited: Vec<VisitedPage>,
    pub failures: Vec<FailedVisit>,
    pub gaps: Vec<ExtractionGap>,
}

impl CrawlOutcome {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Self::default()
        }
    }

    pub fn count_by_type(&self) -> BTreeMap<ContentType, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn visited_urls(&self) -> Vec<&str> {
        self.visited.iter().map(|v| v.url.as_str()).collect()
    }

    pub fn merge(&mut self, other: CrawlOutcome) {
        self.items.extend(other.items);
        self.visited.extend(other.visited);
        self.failures.extend(other.failures);
        self.gaps.extend(other.gaps);
    }
}
