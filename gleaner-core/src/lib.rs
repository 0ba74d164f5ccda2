use colored::Colorize;

pub mod crawl;
pub mod emit;
pub mod error;
pub mod knowledge;
pub mod report;

pub use error::LoadError;
pub use knowledge::KnowledgeBase;

const BANNER: &str = r#"
   ____ _
  / ___| | ___  __ _ _ __   ___ _ __
 | |  _| |/ _ \/ _` | '_ \ / _ \ '__|
 | |_| | |  __/ (_| | | | |  __/ |
  \____|_|\___|\__,_|_| |_|\___|_|
"#;

/// Printed to stderr so stdout stays clean for JSONL.
pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan());
    eprintln!(
        "  {} {}\n",
        "site-to-knowledge crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
