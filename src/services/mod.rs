pub mod extractor;
pub mod harvest_service;
pub mod locator;
pub mod session;

pub use extractor::ArticleExtractor;
pub use harvest_service::{parse_cutoff, HarvestService};
pub use locator::ArticleLocator;
pub use session::{CrawlReport, CrawlSession, StopReason};
