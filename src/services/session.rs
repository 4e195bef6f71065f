use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::{Article, ArticleId, FetchOutcome, OutletCode, OutletCursor};
use crate::services::extractor::ArticleExtractor;
use crate::services::locator::ArticleLocator;
use crate::sources::traits::{PageFetcher, SummarySource};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_NOT_FOUND_LIMIT: u32 = 100;

/// Why a session stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// An article published after the cutoff was collected
    CutoffReached,
    /// A failure other than 404/429; the article is retried next run
    Aborted { article_id: ArticleId, detail: String },
    /// Too many consecutive missing articles, starting at `first_missing`, with no
    /// newer article known past them
    NotFoundLimit { first_missing: ArticleId },
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub outlet_code: OutletCode,
    pub start_article_id: ArticleId,
    pub articles: Vec<Article>,
    pub next_article_id: ArticleId,
    pub stop: StopReason,
}

impl CrawlReport {
    pub fn cursor(&self) -> OutletCursor {
        OutletCursor::new(self.outlet_code, self.next_article_id)
    }
}

/// Sequential crawl of one outlet over ascending article ids
pub struct CrawlSession<'a, P: PageFetcher, S: SummarySource> {
    extractor: &'a ArticleExtractor<P, S>,
    locator: Option<&'a ArticleLocator<P>>,
    retry_delay: Duration,
    not_found_limit: u32,
}

impl<'a, P: PageFetcher, S: SummarySource> CrawlSession<'a, P, S> {
    pub fn new(extractor: &'a ArticleExtractor<P, S>) -> Self {
        Self {
            extractor,
            locator: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            not_found_limit: DEFAULT_NOT_FOUND_LIMIT,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Consecutive 404s tolerated before giving up; `0` disables the limit
    pub fn with_not_found_limit(mut self, not_found_limit: u32) -> Self {
        self.not_found_limit = not_found_limit;
        self
    }

    /// Ranking-page lookup consulted when the not-found limit trips. A missing run
    /// that ends before the newest known article is a gap and gets skipped.
    pub fn with_locator(mut self, locator: &'a ArticleLocator<P>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Collect articles from `start` until one is published after `cutoff`.
    ///
    /// The article that crosses the cutoff is kept. Blocks the calling thread
    /// for every fetch and every rate-limit pause.
    pub fn run(&self, outlet: OutletCode, start: ArticleId, cutoff: NaiveDateTime) -> CrawlReport {
        let mut articles = Vec::new();
        let mut id = start;
        let mut missing_run = 0u32;

        info!(%outlet, start = %start, %cutoff, "Crawl session started");

        let (next_article_id, stop) = loop {
            match self.extractor.extract(outlet, id) {
                FetchOutcome::Success(article) => {
                    missing_run = 0;
                    let past_cutoff = article.is_published_after(cutoff);
                    debug!(%outlet, article_id = %id, published_at = ?article.published_at, "Collected article");
                    articles.push(article);
                    id = id.next();

                    if past_cutoff {
                        break (id, StopReason::CutoffReached);
                    }
                }
                FetchOutcome::NotFound => {
                    missing_run += 1;
                    debug!(%outlet, article_id = %id, "Article missing, skipping");

                    if self.not_found_limit > 0 && missing_run >= self.not_found_limit {
                        if let Some(newest) = self.newest_beyond(outlet, id) {
                            info!(%outlet, article_id = %id, newest = %newest, missing_run, "Skipping gap of missing articles");
                            missing_run = 0;
                            id = id.next();
                            continue;
                        }

                        let first_missing = ArticleId(id.0 + 1 - u64::from(missing_run));
                        warn!(%outlet, first_missing = %first_missing, missing_run, "Too many missing articles in a row");
                        break (first_missing, StopReason::NotFoundLimit { first_missing });
                    }
                    id = id.next();
                }
                FetchOutcome::RateLimited => {
                    debug!(%outlet, article_id = %id, delay_ms = self.retry_delay.as_millis() as u64, "Rate limited, retrying");
                    thread::sleep(self.retry_delay);
                }
                FetchOutcome::OtherFailure(detail) => {
                    warn!(%outlet, article_id = %id, %detail, "Fetch failed, aborting session");
                    break (
                        id,
                        StopReason::Aborted {
                            article_id: id,
                            detail,
                        },
                    );
                }
            }
        };

        info!(
            %outlet,
            collected = articles.len(),
            next = %next_article_id,
            stop = ?stop,
            "Crawl session finished"
        );

        CrawlReport {
            outlet_code: outlet,
            start_article_id: start,
            articles,
            next_article_id,
            stop,
        }
    }

    /// Newest article on the ranking page, if it lies past `id`
    fn newest_beyond(&self, outlet: OutletCode, id: ArticleId) -> Option<ArticleId> {
        let newest = self.locator?.locate_latest(outlet);
        (newest > id).then_some(newest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::parse_canonical;
    use crate::sources::traits::{MockPageFetcher, MockSummarySource};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    const BASE: &str = "https://n.news.naver.com";

    fn page(title: &str, published_at: &str) -> String {
        format!(
            r#"<html><body>
                <h2 id="title_area">{}</h2>
                <span class="media_end_head_info_datestamp_time" data-date-time="{}"></span>
                <article id="dic_area">본문</article>
            </body></html>"#,
            title, published_at
        )
    }

    /// Fetcher mock answering from a per-id script; ids without a script get a page
    /// published at `fallback_time`.
    struct Script {
        outcomes: HashMap<u64, VecDeque<FetchOutcome<String>>>,
        fallback_time: String,
    }

    fn scripted_fetcher(script: Script) -> (MockPageFetcher, Arc<Mutex<Vec<u64>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let script = Mutex::new(script);

        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(move |url| {
            let id: u64 = url.rsplit('/').next().unwrap().parse().unwrap();
            recorded.lock().unwrap().push(id);

            let mut script = script.lock().unwrap();
            let fallback = script.fallback_time.clone();
            script
                .outcomes
                .get_mut(&id)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| FetchOutcome::Success(page(&format!("article {}", id), &fallback)))
        });

        (fetcher, calls)
    }

    fn silent_summaries() -> MockSummarySource {
        let mut summaries = MockSummarySource::new();
        summaries.expect_search().returning(|_, _| Vec::new());
        summaries
    }

    fn ids(report: &CrawlReport) -> Vec<u64> {
        report.articles.iter().map(|a| a.article_id.0).collect()
    }

    fn cutoff(ts: &str) -> NaiveDateTime {
        parse_canonical(ts).unwrap()
    }

    #[test]
    fn test_not_found_is_skipped() {
        let mut outcomes = HashMap::new();
        outcomes.insert(5, VecDeque::from([FetchOutcome::NotFound]));
        outcomes.insert(
            6,
            VecDeque::from([FetchOutcome::Success(page("six", "2024-01-01 10:00:00"))]),
        );
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(5),
            cutoff("2024-01-01 09:00:00"),
        );

        assert_eq!(ids(&report), vec![6]);
        assert_eq!(*calls.lock().unwrap(), vec![5, 6]);
        assert_eq!(report.next_article_id, ArticleId(7));
        assert_eq!(report.stop, StopReason::CutoffReached);
    }

    #[test]
    fn test_rate_limited_id_is_retried_after_delay() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            5,
            VecDeque::from([
                FetchOutcome::RateLimited,
                FetchOutcome::RateLimited,
                FetchOutcome::Success(page("five", "2024-01-01 10:00:00")),
            ]),
        );
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let started = Instant::now();
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(5),
            cutoff("2024-01-01 09:00:00"),
        );

        assert!(started.elapsed() >= DEFAULT_RETRY_DELAY * 2);
        assert_eq!(ids(&report), vec![5]);
        assert_eq!(*calls.lock().unwrap(), vec![5, 5, 5]);
        assert_eq!(report.next_article_id, ArticleId(6));
    }

    #[test]
    fn test_other_failure_aborts_and_keeps_cursor() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            5,
            VecDeque::from([FetchOutcome::from_status(500, "https://n.news.naver.com")]),
        );
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(3),
            cutoff("2024-01-01 09:00:00"),
        );

        assert_eq!(ids(&report), vec![3, 4]);
        assert_eq!(*calls.lock().unwrap(), vec![3, 4, 5]);
        assert_eq!(report.next_article_id, ArticleId(5));
        assert!(matches!(
            report.stop,
            StopReason::Aborted { article_id: ArticleId(5), .. }
        ));
        assert_eq!(report.cursor(), OutletCursor::new(OutletCode(1), ArticleId(5)));
    }

    #[test]
    fn test_transport_failure_without_status_aborts() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            1,
            VecDeque::from([FetchOutcome::OtherFailure("connection reset".to_string())]),
        );
        let (fetcher, _) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(1),
            cutoff("2024-01-01 09:00:00"),
        );

        assert!(report.articles.is_empty());
        assert_eq!(report.next_article_id, ArticleId(1));
    }

    #[test]
    fn test_cutoff_includes_one_article_past_the_boundary() {
        let mut outcomes = HashMap::new();
        for id in 1..=12u64 {
            let ts = format!("2024-01-01 09:{:02}:00", id);
            outcomes.insert(id, VecDeque::from([FetchOutcome::Success(page("a", &ts))]));
        }
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(1),
            cutoff("2024-01-01 09:09:30"),
        );

        assert_eq!(ids(&report), (1..=10).collect::<Vec<_>>());
        assert!(!calls.lock().unwrap().contains(&11));
        assert_eq!(report.next_article_id, ArticleId(11));
    }

    #[test]
    fn test_article_equal_to_cutoff_does_not_stop() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            1,
            VecDeque::from([FetchOutcome::Success(page("a", "2024-01-01 09:00:00"))]),
        );
        outcomes.insert(
            2,
            VecDeque::from([FetchOutcome::Success(page("b", "2024-01-01 09:00:01"))]),
        );
        let (fetcher, _) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(1),
            cutoff("2024-01-01 09:00:00"),
        );

        assert_eq!(ids(&report), vec![1, 2]);
        assert_eq!(report.next_article_id, ArticleId(3));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            100,
            VecDeque::from([FetchOutcome::Success(page("a", "2024-01-01 09:00:00"))]),
        );
        outcomes.insert(
            101,
            VecDeque::from([FetchOutcome::Success(page("b", "2024-01-01 09:05:00"))]),
        );
        outcomes.insert(
            102,
            VecDeque::from([FetchOutcome::Success(page("c", "2024-01-01 09:10:00"))]),
        );
        let (fetcher, _) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 23:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor).run(
            OutletCode(1),
            ArticleId(100),
            cutoff("2024-01-01 09:07:00"),
        );

        assert_eq!(ids(&report), vec![100, 101, 102]);
        assert_eq!(report.next_article_id, ArticleId(103));
        assert_eq!(
            report.articles[2].link,
            "https://n.news.naver.com/article/001/0000000102"
        );
    }

    #[test]
    fn test_not_found_limit_rewinds_to_first_missing() {
        let mut outcomes = HashMap::new();
        for id in 11..=13u64 {
            outcomes.insert(id, VecDeque::from([FetchOutcome::NotFound]));
        }
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor)
            .with_not_found_limit(3)
            .run(OutletCode(1), ArticleId(10), cutoff("2024-01-01 09:00:00"));

        assert_eq!(ids(&report), vec![10]);
        assert_eq!(*calls.lock().unwrap(), vec![10, 11, 12, 13]);
        assert_eq!(report.next_article_id, ArticleId(11));
        assert_eq!(
            report.stop,
            StopReason::NotFoundLimit {
                first_missing: ArticleId(11)
            }
        );
    }

    fn ranking_locator(newest: u64) -> ArticleLocator<MockPageFetcher> {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(move |_| {
            FetchOutcome::Success(format!(
                r#"<li class="as_thumb"><a href="/article/001/{:010}">x</a></li>"#,
                newest
            ))
        });
        ArticleLocator::new(fetcher, "https://media.naver.com")
    }

    #[test]
    fn test_gap_before_newest_article_is_skipped() {
        let mut outcomes = HashMap::new();
        for id in 10..=14u64 {
            outcomes.insert(id, VecDeque::from([FetchOutcome::NotFound]));
        }
        outcomes.insert(
            16,
            VecDeque::from([FetchOutcome::Success(page("late", "2024-01-01 10:00:00"))]),
        );
        let (fetcher, calls) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let locator = ranking_locator(20);
        let report = CrawlSession::new(&extractor)
            .with_locator(&locator)
            .with_not_found_limit(5)
            .run(OutletCode(1), ArticleId(10), cutoff("2024-01-01 09:00:00"));

        assert_eq!(ids(&report), vec![15, 16]);
        assert_eq!(*calls.lock().unwrap(), (10..=16).collect::<Vec<_>>());
        assert_eq!(report.next_article_id, ArticleId(17));
        assert_eq!(report.stop, StopReason::CutoffReached);
    }

    #[test]
    fn test_missing_run_past_newest_article_still_rewinds() {
        let mut outcomes = HashMap::new();
        for id in 11..=13u64 {
            outcomes.insert(id, VecDeque::from([FetchOutcome::NotFound]));
        }
        let (fetcher, _) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let locator = ranking_locator(10);
        let report = CrawlSession::new(&extractor)
            .with_locator(&locator)
            .with_not_found_limit(3)
            .run(OutletCode(1), ArticleId(10), cutoff("2024-01-01 09:00:00"));

        assert_eq!(ids(&report), vec![10]);
        assert_eq!(report.next_article_id, ArticleId(11));
        assert_eq!(
            report.stop,
            StopReason::NotFoundLimit {
                first_missing: ArticleId(11)
            }
        );
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let mut outcomes = HashMap::new();
        outcomes.insert(50, VecDeque::from([FetchOutcome::NotFound]));
        let (fetcher, _) = scripted_fetcher(Script {
            outcomes,
            fallback_time: "2024-01-01 08:00:00".to_string(),
        });

        let extractor = ArticleExtractor::new(fetcher, silent_summaries(), BASE);
        let report = CrawlSession::new(&extractor)
            .with_not_found_limit(1)
            .run(OutletCode(1), ArticleId(50), cutoff("2024-01-01 09:00:00"));

        assert!(report.articles.is_empty());
        assert_eq!(report.next_article_id, ArticleId(50));
        assert!(report.next_article_id >= report.start_article_id);
    }
}
