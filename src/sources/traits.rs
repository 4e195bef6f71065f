use crate::domain::{FetchOutcome, SearchItem};

#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher: Send + Sync {
    /// GET a page and classify the result; never panics or returns an error
    fn fetch(&self, url: &str) -> FetchOutcome<String>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SummarySource: Send + Sync {
    /// Most recent search hits for `query`, markup already stripped.
    /// Failures are reported as an empty list.
    fn search(&self, query: &str, display: u32) -> Vec<SearchItem>;
}
