use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::info;

use crate::domain::{timestamp, Article, ArticleId, OutletCode, OutletCursor};
use crate::errors::{HarvestError, HarvestResult};
use crate::services::extractor::ArticleExtractor;
use crate::services::locator::ArticleLocator;
use crate::services::session::{
    CrawlReport, CrawlSession, DEFAULT_NOT_FOUND_LIMIT, DEFAULT_RETRY_DELAY,
};
use crate::sources::traits::{PageFetcher, SummarySource};
use crate::storage::traits::{ArticleRepository, CursorRepository};

/// Parse a caller-supplied cutoff in `yyyy-MM-dd HH:mm:ss` form
pub fn parse_cutoff(cutoff: &str) -> HarvestResult<NaiveDateTime> {
    timestamp::parse_canonical(cutoff)
        .ok_or_else(|| HarvestError::InvalidTimestamp(cutoff.to_string()))
}

/// Host-facing entry point: locate, crawl, and persist one outlet at a time
pub struct HarvestService<A, C, P, S>
where
    A: ArticleRepository,
    C: CursorRepository,
    P: PageFetcher,
    S: SummarySource,
{
    articles: A,
    cursors: C,
    locator: ArticleLocator<P>,
    extractor: ArticleExtractor<P, S>,
    retry_delay: Duration,
    not_found_limit: u32,
}

impl<A, C, P, S> HarvestService<A, C, P, S>
where
    A: ArticleRepository,
    C: CursorRepository,
    P: PageFetcher,
    S: SummarySource,
{
    pub fn new(
        articles: A,
        cursors: C,
        locator: ArticleLocator<P>,
        extractor: ArticleExtractor<P, S>,
    ) -> Self {
        Self {
            articles,
            cursors,
            locator,
            extractor,
            retry_delay: DEFAULT_RETRY_DELAY,
            not_found_limit: DEFAULT_NOT_FOUND_LIMIT,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_not_found_limit(mut self, not_found_limit: u32) -> Self {
        self.not_found_limit = not_found_limit;
        self
    }

    /// Newest article id of an outlet; `1` when it cannot be found
    pub fn locate_latest(&self, outlet: OutletCode) -> ArticleId {
        self.locator.locate_latest(outlet)
    }

    /// Fetch a single article without touching storage
    pub fn article(&self, outlet: OutletCode, id: ArticleId) -> HarvestResult<Article> {
        self.extractor.extract(outlet, id).into_result()
    }

    /// Run one session from `start`; nothing is persisted
    pub fn crawl(
        &self,
        outlet: OutletCode,
        start: ArticleId,
        cutoff: &str,
    ) -> HarvestResult<CrawlReport> {
        let cutoff = parse_cutoff(cutoff)?;

        Ok(CrawlSession::new(&self.extractor)
            .with_locator(&self.locator)
            .with_retry_delay(self.retry_delay)
            .with_not_found_limit(self.not_found_limit)
            .run(outlet, start, cutoff))
    }

    /// Where a session for `outlet` should begin: `start` if given, else the stored
    /// cursor, else the newest article on the ranking page
    pub fn resume_point(
        &self,
        outlet: OutletCode,
        start: Option<ArticleId>,
    ) -> HarvestResult<ArticleId> {
        if let Some(id) = start {
            return Ok(id);
        }

        match self.cursors.get(outlet)? {
            Some(cursor) => Ok(cursor.last_article_id),
            None => {
                info!(%outlet, "No cursor stored, locating newest article");
                Ok(self.locate_latest(outlet))
            }
        }
    }

    /// Resume an outlet from its stored cursor (or `start`, or the newest article on
    /// a cold start), then store the batch and the advanced cursor
    pub fn harvest(
        &self,
        outlet: OutletCode,
        start: Option<ArticleId>,
        cutoff: &str,
    ) -> HarvestResult<CrawlReport> {
        parse_cutoff(cutoff)?;

        let start = self.resume_point(outlet, start)?;
        let report = self.crawl(outlet, start, cutoff)?;

        let saved = self.articles.save_all(&report.articles)?;
        self.cursors.save(&report.cursor())?;

        info!(%outlet, saved, next = %report.next_article_id, "Harvest stored");
        Ok(report)
    }

    pub fn stored_article(&self, id: i64) -> HarvestResult<Article> {
        self.articles
            .get_by_id(id)?
            .ok_or(HarvestError::ArticleNotFound(id))
    }

    pub fn recent(&self, outlet: OutletCode, limit: u32) -> HarvestResult<Vec<Article>> {
        self.articles.recent(outlet, limit)
    }

    pub fn cursors(&self) -> HarvestResult<Vec<OutletCursor>> {
        self.cursors.get_all()
    }
}
