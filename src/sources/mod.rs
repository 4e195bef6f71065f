pub mod traits;
pub mod http;
pub mod naver_search;

pub use traits::{PageFetcher, SummarySource};
pub use http::{build_client, HttpPageFetcher};
pub use naver_search::SummaryEnricher;
