use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use scraper::Html;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::search::SearchResponse;
use crate::domain::SearchItem;
use crate::errors::HarvestResult;
use crate::sources::traits::SummarySource;

/// Minimum pause before every search request, imposed by the API's rate limit
pub const SEARCH_DELAY: Duration = Duration::from_millis(500);

const SEARCH_PATH: &str = "/v1/search/news.json";

/// News search API client used to attach a short summary to each article
#[derive(Clone)]
pub struct SummaryEnricher {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl SummaryEnricher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.search_base_url.trim_end_matches('/').to_string(),
            client_id: config.naver_client_id.clone(),
            client_secret: config.naver_client_secret.clone(),
        }
    }

    fn request(&self, query: &str, display: u32) -> HarvestResult<Vec<SearchItem>> {
        let display = display.to_string();
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&[
                ("query", query),
                ("display", display.as_str()),
                ("start", "1"),
                ("sort", "date"),
            ])
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()?
            .error_for_status()?;

        let body = response.text()?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchItem {
                title: strip_markup(&item.title),
                description: strip_markup(&item.description),
                ..item
            })
            .collect())
    }
}

impl SummarySource for SummaryEnricher {
    fn search(&self, query: &str, display: u32) -> Vec<SearchItem> {
        thread::sleep(SEARCH_DELAY);

        match self.request(query, display) {
            Ok(items) => {
                debug!(query, count = items.len(), "Search returned");
                items
            }
            Err(e) => {
                warn!(query, error = %e, "Search response could not be mapped");
                Vec::new()
            }
        }
    }
}

/// Drop tags and decode entities, collapsing whitespace
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
