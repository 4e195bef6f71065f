use regex::Regex;

use crate::errors::{HarvestError, HarvestResult};

/// Result of a single fetch attempt, classified once at the transport boundary.
///
/// Crawl control flow keys on the variant: `NotFound` is skipped, `RateLimited`
/// is retried after a pause and `OtherFailure` ends the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Success(T),
    NotFound,
    RateLimited,
    OtherFailure(String),
}

impl<T> FetchOutcome<T> {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, url: &str) -> Self {
        match status {
            404 => FetchOutcome::NotFound,
            429 => FetchOutcome::RateLimited,
            _ => FetchOutcome::OtherFailure(format!(
                "HTTP error fetching URL. Status={}, URL=[{}]",
                status, url
            )),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(f(value)),
            FetchOutcome::NotFound => FetchOutcome::NotFound,
            FetchOutcome::RateLimited => FetchOutcome::RateLimited,
            FetchOutcome::OtherFailure(detail) => FetchOutcome::OtherFailure(detail),
        }
    }

    /// HTTP status behind a failure, recovered from the detail for `OtherFailure`
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::NotFound => Some(404),
            FetchOutcome::RateLimited => Some(429),
            FetchOutcome::OtherFailure(detail) => status_from_detail(detail),
        }
    }

    pub fn into_result(self) -> HarvestResult<T> {
        let status = self.status();
        match self {
            FetchOutcome::Success(value) => Ok(value),
            FetchOutcome::NotFound => Err(HarvestError::Fetch {
                status,
                detail: "page not found".to_string(),
            }),
            FetchOutcome::RateLimited => Err(HarvestError::Fetch {
                status,
                detail: "rate limited by remote host".to_string(),
            }),
            FetchOutcome::OtherFailure(detail) => Err(HarvestError::Fetch { status, detail }),
        }
    }
}

fn status_from_detail(detail: &str) -> Option<u16> {
    let pattern = Regex::new(r"Status=(\d+)").ok()?;
    pattern.captures(detail)?[1].parse().ok()
}
