use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::domain::{ArticleId, FetchOutcome, OutletCode};
use crate::sources::traits::PageFetcher;

/// Finds the newest article id of an outlet from its popular-ranking page
pub struct ArticleLocator<P: PageFetcher> {
    fetcher: P,
    media_base_url: String,
}

impl<P: PageFetcher> ArticleLocator<P> {
    pub fn new(fetcher: P, media_base_url: &str) -> Self {
        Self {
            fetcher,
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ranking_url(&self, outlet: OutletCode) -> String {
        format!(
            "{}/press/{}/ranking?type=popular",
            self.media_base_url,
            outlet.padded()
        )
    }

    /// Newest known article id, or `ArticleId::FIRST` when it cannot be determined
    pub fn locate_latest(&self, outlet: OutletCode) -> ArticleId {
        let url = self.ranking_url(outlet);

        let html = match self.fetcher.fetch(&url) {
            FetchOutcome::Success(html) => html,
            failure => {
                warn!(%outlet, status = ?failure.status(), "Ranking page unavailable, starting from the first article");
                return ArticleId::FIRST;
            }
        };

        match latest_article_id(&html) {
            Some(id) => {
                info!(%outlet, article_id = %id, "Located newest article");
                id
            }
            None => {
                warn!(%outlet, "No article link on ranking page, starting from the first article");
                ArticleId::FIRST
            }
        }
    }
}

const ARTICLE_HOST: &str = "https://n.news.naver.com/";

/// Article id of the first ranking entry.
///
/// Links look like `https://n.news.naver.com/article/001/0014212345?ntype=RANKING`;
/// the id is the last digit run of the path, after the outlet code.
pub(crate) fn latest_article_id(html: &str) -> Option<ArticleId> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("li.as_thumb a").ok()?;

    let href = document
        .select(&selector)
        .find_map(|element| element.value().attr("href"))?;
    // Relative links resolve against the article host; query and fragment are dropped
    let link = Url::parse(ARTICLE_HOST).ok()?.join(href).ok()?;

    let digits = Regex::new(r"\d+").ok()?;
    let last_run = digits.find_iter(link.path()).last()?;

    last_run.as_str().parse().ok().map(ArticleId)
}
