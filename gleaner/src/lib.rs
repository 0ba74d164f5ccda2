// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_options_from_args, crawl_to_jsonl, load_urls_from_file, load_urls_from_source,
    parse_url_line, resolve_output_path, summarize_files,
};

// Re-export crawl functionality from gleaner-core
pub use gleaner_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_report,
};
