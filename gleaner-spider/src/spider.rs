use crate::error::{Result, SpiderError};
use crate::extract::{self, Follow, Inherited, PageContext, PageRole};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, Fetcher};
use crate::ledger::{MemoryLedger, VisitLedger};
use crate::outcome::{CrawlOutcome, ExtractionGap, FailedVisit, VisitedPage};
use crate::record::Emitted;
use crate::seed::{AllowList, DEFAULT_FAQ_URL, DEFAULT_SITE_URL, SeedConfig};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type ItemCallback = Arc<dyn Fn(&Emitted) + Send + Sync>;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_PAGES: usize = 200;

/// Which site layout the spider walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiderKind {
    /// Homepage, then the departments listing, then each department.
    Site,
    /// A single FAQ page.
    Faq,
}

impl SpiderKind {
    pub fn seed_role(&self) -> PageRole {
        match self {
            SpiderKind::Site => PageRole::Homepage,
            SpiderKind::Faq => PageRole::FaqPage,
        }
    }

    pub fn default_seed(&self) -> &'static str {
        match self {
            SpiderKind::Site => DEFAULT_SITE_URL,
            SpiderKind::Faq => DEFAULT_FAQ_URL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpiderKind::Site => "site",
            SpiderKind::Faq => "faq",
        }
    }
}

/// A page waiting in the frontier.
#[derive(Debug, Clone)]
pub struct Visit {
    pub url: Url,
    pub role: PageRole,
    pub depth: usize,
    pub inherited: Inherited,
}

#[derive(Default)]
struct Frontier {
    queue: VecDeque<Visit>,
    in_flight: usize,
    started: usize,
}

/// Everything a worker needs, cloned once per worker.
#[derive(Clone)]
struct WorkerShared {
    fetcher: Fetcher,
    allow: AllowList,
    site_name: String,
    ledger: Arc<dyn VisitLedger>,
    frontier: Arc<Mutex<Frontier>>,
    outcome: Arc<Mutex<CrawlOutcome>>,
    progress_callback: Option<ProgressCallback>,
    item_callback: Option<ItemCallback>,
    max_depth: usize,
    max_pages: usize,
}

pub struct Spider {
    fetcher: Fetcher,
    kind: SpiderKind,
    ledger: Arc<dyn VisitLedger>,
    max_depth: usize,
    max_pages: usize,
    extra_domains: Vec<String>,
    progress_callback: Option<ProgressCallback>,
    item_callback: Option<ItemCallback>,
}

impl Spider {
    pub fn new(kind: SpiderKind) -> Result<Self> {
        Self::with_timeout(kind, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(kind: SpiderKind, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::with_timeout(timeout_secs)?,
            kind,
            ledger: Arc::new(MemoryLedger::new()),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            extra_domains: Vec::new(),
            progress_callback: None,
            item_callback: None,
        })
    }

    pub fn kind(&self) -> SpiderKind {
        self.kind
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn VisitLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_allowed_domain(mut self, domain: impl Into<String>) -> Self {
        self.extra_domains.push(domain.into());
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_item_callback(mut self, callback: ItemCallback) -> Self {
        self.item_callback = Some(callback);
        self
    }

    /// Crawl from `start_url` with `workers` concurrent fetchers until the
    /// frontier is empty or the page budget is spent.
    pub async fn crawl(&self, start_url: &str, workers: usize) -> Result<CrawlOutcome> {
        let workers = workers.max(1);
        let seed = self
            .extra_domains
            .iter()
            .fold(SeedConfig::parse(start_url)?, |seed, d| seed.with_allowed_domain(d));

        info!(
            "Starting {} spider at {} with {} workers (allowed: {:?})",
            self.kind.name(),
            seed.start_url,
            workers,
            seed.allow.domains()
        );

        let shared = WorkerShared {
            fetcher: self.fetcher.clone(),
            allow: seed.allow.clone(),
            site_name: seed.site_name.clone(),
            ledger: self.ledger.clone(),
            frontier: Arc::new(Mutex::new(Frontier::default())),
            outcome: Arc::new(Mutex::new(CrawlOutcome::new(seed.start_url.as_str()))),
            progress_callback: self.progress_callback.clone(),
            item_callback: self.item_callback.clone(),
            max_depth: self.max_depth,
            max_pages: self.max_pages,
        };

        if self.max_depth == 0 || self.max_pages == 0 {
            warn!("Crawl budget is zero; nothing will be fetched");
            return Ok(shared.outcome.lock().await.clone());
        }

        self.ledger.mark_visited(seed.start_url.as_str());
        shared.frontier.lock().await.queue.push_back(Visit {
            url: seed.start_url.clone(),
            role: self.kind.seed_role(),
            depth: 0,
            inherited: Inherited::default(),
        });

        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let shared = shared.clone();
                tokio::spawn(async move { Self::run_worker(worker_id, shared).await })
            })
            .collect();

        for joined in futures::future::join_all(handles).await {
            joined?;
        }

        let outcome = shared.outcome.lock().await.clone();
        info!(
            "Crawl complete. {} pages, {} items, {} failures, {} gaps",
            outcome.visited.len(),
            outcome.items.len(),
            outcome.failures.len(),
            outcome.gaps.len()
        );
        Ok(outcome)
    }

    async fn run_worker(worker_id: usize, shared: WorkerShared) {
        debug!("Worker {} started", worker_id);

        loop {
            let next = {
                let mut frontier = shared.frontier.lock().await;
                if frontier.started >= shared.max_pages && !frontier.queue.is_empty() {
                    info!(
                        "Page budget of {} reached; dropping {} queued pages",
                        shared.max_pages,
                        frontier.queue.len()
                    );
                    frontier.queue.clear();
                }
                // Followed pages are claimed in the ledger only once popped, so
                // whatever the page budget drops stays unclaimed for later crawls.
                while let Some(front) = frontier.queue.front()
                    && front.depth > 0
                    && !shared.ledger.mark_visited(front.url.as_str())
                {
                    debug!("  -> {} already visited", front.url);
                    frontier.queue.pop_front();
                }
                match frontier.queue.pop_front() {
                    Some(visit) => {
                        frontier.in_flight += 1;
                        frontier.started += 1;
                        Some(visit)
                    }
                    None if frontier.in_flight == 0 => break,
                    None => None,
                }
            };

            let Some(visit) = next else {
                tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                continue;
            };

            if let Some(ref callback) = shared.progress_callback {
                callback(worker_id, visit.url.to_string());
            }

            let children = Self::process_visit(&shared, &visit).await;

            let mut frontier = shared.frontier.lock().await;
            frontier.queue.extend(children);
            frontier.in_flight -= 1;
        }

        debug!("Worker {} finished", worker_id);
    }

    /// Fetch, extract, record results, and return the visits to queue next.
    async fn process_visit(shared: &WorkerShared, visit: &Visit) -> Vec<Visit> {
        let page = match shared.fetcher.fetch(&visit.url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping {} ({}): {}", visit.url, visit.role.as_str(), e);
                shared.outcome.lock().await.failures.push(FailedVisit {
                    url: visit.url.to_string(),
                    role: visit.role,
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };

        if !shared.allow.permits(&page.final_url) {
            let err = SpiderError::OffSite {
                url: visit.url.to_string(),
                final_url: page.final_url.to_string(),
            };
            warn!("Skipping {} ({}): {}", visit.url, visit.role.as_str(), err);
            shared.outcome.lock().await.failures.push(FailedVisit {
                url: visit.url.to_string(),
                role: visit.role,
                error: err.to_string(),
            });
            return Vec::new();
        }

        let ctx = PageContext::new(page.final_url.clone(), shared.site_name.as_str())
            .with_inherited(visit.inherited.clone());
        let extraction = extract::extract(visit.role, &page.body, &ctx);

        for detail in &extraction.gaps {
            let gap = SpiderError::ExtractionGap {
                url: ctx.url.to_string(),
                detail: detail.clone(),
            };
            warn!("{}", gap);
        }

        let children: Vec<Visit> = extraction
            .follows
            .into_iter()
            .filter_map(|follow| Self::accept_follow(shared, visit, follow))
            .collect();

        if let Some(ref callback) = shared.item_callback {
            for item in &extraction.items {
                callback(item);
            }
        }

        let mut outcome = shared.outcome.lock().await;
        outcome.visited.push(VisitedPage {
            url: ctx.url.to_string(),
            role: visit.role,
            depth: visit.depth,
            status_code: page.status,
            response_time: page.response_time,
            items_emitted: extraction.items.len(),
            links_followed: children.len(),
        });
        outcome.gaps.extend(extraction.gaps.into_iter().map(|detail| ExtractionGap {
            url: ctx.url.to_string(),
            role: visit.role,
            detail,
        }));
        outcome.items.extend(extraction.items);

        children
    }

    fn accept_follow(shared: &WorkerShared, parent: &Visit, follow: Follow) -> Option<Visit> {
        let depth = parent.depth + 1;
        if depth >= shared.max_depth {
            debug!("  -> {} beyond max depth {}, skipping", follow.url, shared.max_depth);
            return None;
        }
        if !shared.allow.permits(&follow.url) {
            debug!("  -> {} outside allowed domains, skipping", follow.url);
            return None;
        }
        if shared.ledger.has_visited(follow.url.as_str()) {
            debug!("  -> {} already visited", follow.url);
            return None;
        }

        debug!("  -> queuing {} as {}", follow.url, follow.role.as_str());
        Some(Visit {
            url: follow.url,
            role: follow.role,
            depth,
            inherited: follow.inherited,
        })
    }
}
