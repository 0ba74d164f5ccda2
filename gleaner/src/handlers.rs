use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use gleaner_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_report};
use gleaner_core::emit::JsonlStream;
use gleaner_core::knowledge::load_knowledge;
use gleaner_core::report::{ReportData, ReportFormat, generate_report, save_report};
use gleaner_spider::{CrawlOutcome, SpiderKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

// Helper functions for crawl handlers

/// Load seed URLs from either a file or a single URL argument. An empty list
/// means the spider's built-in seed.
pub fn load_urls_from_source(url: Option<&Url>, seeds_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(seeds_file_path) = seeds_file {
        load_urls_from_file(seeds_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Ok(Vec::new())
    }
}

/// Load and parse URLs from a file, skipping blanks and `#` comments
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seeds file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some_and(|h| h.contains('.') || h == "localhost")
    {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Expand `~` and environment variables in a user supplied path. `-` means stdout.
pub fn resolve_output_path(raw: Option<&String>) -> Option<PathBuf> {
    match raw.map(String::as_str) {
        None | Some("-") => None,
        Some(raw) => {
            let expanded = shellexpand::full(raw)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| shellexpand::tilde(raw).into_owned());
            Some(PathBuf::from(expanded))
        }
    }
}

/// Build crawl options from the `site`/`faq` subcommand arguments.
pub fn crawl_options_from_args(kind: SpiderKind, sub_matches: &ArgMatches) -> Result<CrawlOptions> {
    let url = sub_matches.get_one::<Url>("url");
    let seeds_file = sub_matches.get_one::<PathBuf>("seeds-file");

    let mut options = CrawlOptions::new(kind);
    options.urls = load_urls_from_source(url, seeds_file)?;
    if let Some(&workers) = sub_matches.get_one::<usize>("threads") {
        options.workers = workers;
    }
    if let Some(&depth) = sub_matches.get_one::<usize>("max-depth") {
        options.max_depth = depth;
    }
    if let Some(&pages) = sub_matches.get_one::<usize>("max-pages") {
        options.max_pages = pages;
    }
    if let Some(&secs) = sub_matches.get_one::<u64>("timeout") {
        options.timeout_secs = secs;
    }
    options.allowed_domains = sub_matches
        .get_many::<String>("allow-domain")
        .map(|domains| domains.cloned().collect())
        .unwrap_or_default();

    Ok(options)
}

/// Crawl and stream every emitted item as JSONL to `output` (stdout when `None`).
pub async fn crawl_to_jsonl(options: CrawlOptions, output: Option<&Path>) -> Result<CrawlOutcome> {
    let kind = options.kind;
    let progress_callback = Arc::new(|msg: String| {
        eprintln!("{}", msg);
    });

    let stream = JsonlStream::open(output).context("Failed to open JSONL output")?;
    let outcome = execute_crawl(options, Some(progress_callback), Some(stream.callback()))
        .await
        .with_context(|| format!("{} crawl failed", kind.name()))?;

    let written = stream.finish().context("Failed to write JSONL output")?;
    info!(
        "Wrote {} items to {}",
        written,
        output.map(|p| p.display().to_string()).unwrap_or_else(|| "stdout".to_string())
    );

    Ok(outcome)
}

pub async fn handle_crawl(kind: SpiderKind, sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let mut options = crawl_options_from_args(kind, sub_matches)?;
    let output = resolve_output_path(sub_matches.get_one::<String>("output"));

    // Spinner and summary only when stdout is not carrying the data.
    options.show_progress_bars = output.is_some() && !quiet;

    if !quiet {
        eprintln!("\n{} {} spider", "🕷️".bright_cyan(), kind.name().bright_white().bold());
        for seed in options.seeds() {
            eprintln!("Seed:       {}", seed);
        }
        eprintln!("Workers:    {}", options.workers);
        eprintln!("Max depth:  {}", options.max_depth);
        eprintln!("Max pages:  {}", options.max_pages);
        if !options.allowed_domains.is_empty() {
            eprintln!("Also allow: {}", options.allowed_domains.join(", "));
        }
        eprintln!();
    }

    let outcome = crawl_to_jsonl(options, output.as_deref()).await?;

    if !quiet {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
        eprint!("{}", generate_crawl_report(&outcome));
        if let Some(path) = &output {
            eprintln!(
                "{} {} items written to {}",
                "✓".green().bold(),
                outcome.items.len(),
                path.display()
            );
        }
    }

    Ok(())
}

/// Load JSONL files and render a summary in the requested format.
pub fn summarize_files(files: &[String], format: ReportFormat) -> Result<String> {
    let paths: Vec<PathBuf> = files
        .iter()
        .map(|f| PathBuf::from(shellexpand::tilde(f).into_owned()))
        .collect();

    let knowledge = load_knowledge(&paths)?;
    if knowledge.stats.files_read == 0 {
        bail!("None of the {} input file(s) could be found", files.len());
    }

    let data = ReportData::new(&knowledge, files.to_vec());
    generate_report(format, &data).context("Failed to render report")
}

pub fn handle_load(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let files: Vec<String> = sub_matches
        .get_many::<String>("FILE")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let content = summarize_files(&files, format)?;

    match resolve_output_path(sub_matches.get_one::<String>("output")) {
        Some(path) => {
            save_report(&content, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            if !quiet {
                println!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => print!("{}", content),
    }

    Ok(())
}
