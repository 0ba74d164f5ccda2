pub mod classify;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod outcome;
pub mod record;
pub mod seed;
pub mod spider;

pub use error::SpiderError;
pub use extract::PageRole;
pub use ledger::{MemoryLedger, VisitLedger};
pub use outcome::CrawlOutcome;
pub use record::{ContentType, Emitted, FaqItem, FaqPage, NavLink, Record};
pub use seed::SeedConfig;
pub use spider::{ItemCallback, ProgressCallback, Spider, SpiderKind};
