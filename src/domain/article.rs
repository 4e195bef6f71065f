use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Numeric code of a media outlet on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletCode(pub u16);

impl OutletCode {
    /// Three digit form used in portal URLs, e.g. `001`
    pub fn padded(&self) -> String {
        format!("{:03}", self.0)
    }
}

impl fmt::Display for OutletCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.padded())
    }
}

/// Per-outlet article number. Increases monotonically but with gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u64);

impl ArticleId {
    /// Cold-start default when the newest article cannot be located
    pub const FIRST: ArticleId = ArticleId(1);

    /// Ten digit form used in portal URLs, e.g. `0000000042`
    pub fn padded(&self) -> String {
        format!("{:010}", self.0)
    }

    pub fn next(&self) -> ArticleId {
        ArticleId(self.0.saturating_add(1))
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub outlet_code: OutletCode,
    pub article_id: ArticleId,
    pub title: String,
    pub content: String,
    pub link: String,
    /// Canonical `yyyy-MM-dd HH:mm:ss`, or `None` when no timestamp could be recovered
    pub published_at: Option<String>,
    pub summary: String,
}

impl Article {
    pub fn new(outlet_code: OutletCode, article_id: ArticleId, link: String) -> Self {
        Self {
            outlet_code,
            article_id,
            title: String::new(),
            content: String::new(),
            link,
            published_at: None,
            summary: String::new(),
        }
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<String>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }

    pub fn published_time(&self) -> Option<NaiveDateTime> {
        self.published_at
            .as_deref()
            .and_then(timestamp::parse_canonical)
    }

    /// True only when the timestamp is known and strictly later than `cutoff`
    pub fn is_published_after(&self, cutoff: NaiveDateTime) -> bool {
        self.published_time().is_some_and(|t| t > cutoff)
    }
}
