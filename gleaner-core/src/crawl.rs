use crate::error::{LoadError, Result};
use colored::Colorize;
use gleaner_spider::outcome::VisitedPage;
use gleaner_spider::spider::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES};
use gleaner_spider::{CrawlOutcome, ItemCallback, ProgressCallback, Spider, SpiderKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    /// Seed URLs; the spider's default seed is used when empty.
    pub urls: Vec<String>,
    pub kind: SpiderKind,
    pub workers: usize,
    pub max_depth: usize,
    pub max_pages: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
    /// Extra domains permitted besides each seed's own host.
    pub allowed_domains: Vec<String>,
}

impl CrawlOptions {
    pub fn new(kind: SpiderKind) -> Self {
        Self {
            urls: Vec::new(),
            kind,
            workers: 4,
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: 10,
            show_progress_bars: false,
            allowed_domains: Vec::new(),
        }
    }

    pub fn seeds(&self) -> Vec<String> {
        if self.urls.is_empty() {
            vec![self.kind.default_seed().to_string()]
        } else {
            self.urls.clone()
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Run the configured spider over every seed and merge the outcomes.
///
/// Seeds share one visited ledger, so a page reachable from two seeds is
/// fetched once. A seed that cannot be crawled at all is reported through
/// `progress_callback`; the call only fails when every seed does.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    item_callback: Option<ItemCallback>,
) -> Result<CrawlOutcome> {
    let seeds = options.seeds();
    let CrawlOptions {
        kind,
        workers,
        max_depth,
        max_pages,
        timeout_secs,
        show_progress_bars,
        allowed_domains,
        ..
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Starting {} crawl...", kind.name()));
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let worker_progress: ProgressCallback = match progress_bar.clone() {
        Some(pb) => {
            let count = processed_count.clone();
            Arc::new(move |_worker_id: usize, url: String| {
                let n = count.fetch_add(1, Ordering::Relaxed) + 1;
                pb.set_message(format!("Crawling... {} pages ({})", n, extract_url_path(&url)));
            })
        }
        None => {
            let count = processed_count.clone();
            Arc::new(move |_worker_id: usize, _url: String| {
                count.fetch_add(1, Ordering::Relaxed);
            })
        }
    };

    let mut spider = allowed_domains.iter().fold(
        Spider::with_timeout(kind, timeout_secs)?
            .with_max_depth(max_depth)
            .with_max_pages(max_pages)
            .with_progress_callback(worker_progress),
        |spider, domain| spider.with_allowed_domain(domain.as_str()),
    );
    if let Some(cb) = item_callback {
        spider = spider.with_item_callback(cb);
    }

    let mut merged: Option<CrawlOutcome> = None;
    let mut last_error = None;
    for (idx, url) in seeds.iter().enumerate() {
        if let Some(ref callback) = progress_callback
            && seeds.len() > 1
        {
            callback(format!("Crawling seed {}/{}: {}", idx + 1, seeds.len(), url));
        }

        match spider.crawl(url, workers).await {
            Ok(outcome) => match merged.as_mut() {
                Some(all) => all.merge(outcome),
                None => merged = Some(outcome),
            },
            Err(e) => {
                warn!("Failed to crawl {}: {}", url, e);
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to crawl {}: {}", url, e));
                }
                last_error = Some(e);
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} pages processed", total));
    }

    match (merged, last_error) {
        (Some(outcome), _) => Ok(outcome),
        (None, Some(e)) => Err(LoadError::Spider(e)),
        (None, None) => Ok(CrawlOutcome::default()),
    }
}

fn status_label(code: u16) -> String {
    let text = code.to_string();
    match code {
        200..=299 => text.green().to_string(),
        300..=399 => text.cyan().to_string(),
        400..=499 => text.yellow().to_string(),
        500..=599 => text.red().to_string(),
        _ => text,
    }
}

/// Generate a crawl report from an outcome
pub fn generate_crawl_report(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seed: {}\n", outcome.seed_url));
    report.push_str(&format!("  Pages crawled: {}\n", outcome.visited.len()));
    report.push_str(&format!("  Items emitted: {}\n", outcome.items.len()));
    for (content_type, count) in outcome.count_by_type() {
        report.push_str(&format!("    {:<38} {}\n", content_type.as_str(), count));
    }
    report.push_str(&format!("  Fetch failures: {}\n", outcome.failures.len()));
    report.push_str(&format!("  Extraction gaps: {}\n", outcome.gaps.len()));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    let mut by_host: BTreeMap<String, Vec<&VisitedPage>> = BTreeMap::new();
    for page in &outcome.visited {
        if let Ok(url) = Url::parse(&page.url)
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(page);
        }
    }

    for (host, pages) in &by_host {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages visited\n\n", pages.len()));

        for page in pages {
            report.push_str(&format!(
                "  {} {} {} {}\n",
                status_label(page.status_code),
                extract_url_path(&page.url),
                format!("[{}]", page.role.as_str()).dimmed(),
                format!("{} items", page.items_emitted).bright_black()
            ));
        }
        report.push('\n');
    }

    if !outcome.failures.is_empty() {
        report.push_str("## Failures\n");
        for failure in &outcome.failures {
            report.push_str(&format!("  {} {}: {}\n", "✗".red(), failure.url, failure.error));
        }
        report.push('\n');
    }

    if !outcome.gaps.is_empty() {
        report.push_str("## Extraction gaps\n");
        for gap in &outcome.gaps {
            report.push_str(&format!(
                "  {} {} [{}]: {}\n",
                "!".yellow(),
                extract_url_path(&gap.url),
                gap.role.as_str(),
                gap.detail
            ));
        }
        report.push('\n');
    }

    report
}
