//! Single article extraction.
//!
//! Article pages come in at least three layouts (general news, opinion and
//! entertainment, sports). Instead of classifying the layout up front, each field is
//! resolved by an ordered chain of strategies; the first non-empty result wins and
//! the chains never share state.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::domain::{timestamp, Article, ArticleId, FetchOutcome, OutletCode};
use crate::sources::traits::{PageFetcher, SummarySource};

/// A pure lookup of one field in one page layout
pub type Strategy = fn(&Html) -> Option<String>;

pub const TITLE_CHAIN: &[(&str, Strategy)] = &[
    ("headline", headline_title),
    ("end title", end_title),
    ("sports title", sports_title),
];

pub const CONTENT_CHAIN: &[(&str, Strategy)] = &[
    ("article body", article_body),
    ("content container", general_content),
    ("sports content", sports_content),
];

pub const TIMESTAMP_CHAIN: &[(&str, Strategy)] = &[
    ("datestamp attribute", datestamp_attribute),
    ("byline", byline_time),
    ("sports headline", sports_headline_time),
];

const SUBMITTED_LABEL: &str = "기사입력";

/// Run a chain in order, returning the first non-empty value and the strategy name
pub fn resolve(document: &Html, chain: &[(&'static str, Strategy)]) -> Option<(&'static str, String)> {
    chain.iter().find_map(|(name, strategy)| {
        strategy(document)
            .filter(|value| !value.is_empty())
            .map(|value| (*name, value))
    })
}

pub struct ArticleExtractor<P: PageFetcher, S: SummarySource> {
    fetcher: P,
    summaries: S,
    news_base_url: String,
}

impl<P: PageFetcher, S: SummarySource> ArticleExtractor<P, S> {
    pub fn new(fetcher: P, summaries: S, news_base_url: &str) -> Self {
        Self {
            fetcher,
            summaries,
            news_base_url: news_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn article_url(&self, outlet: OutletCode, id: ArticleId) -> String {
        format!(
            "{}/article/{}/{}",
            self.news_base_url,
            outlet.padded(),
            id.padded()
        )
    }

    /// Fetch and parse one article; transport failures are returned unparsed
    pub fn extract(&self, outlet: OutletCode, id: ArticleId) -> FetchOutcome<Article> {
        let link = self.article_url(outlet, id);
        let outcome = self.fetcher.fetch(&link);

        outcome.map(|html| self.parse_article(outlet, id, link, &html))
    }

    pub fn parse_article(
        &self,
        outlet: OutletCode,
        id: ArticleId,
        link: String,
        html: &str,
    ) -> Article {
        let document = Html::parse_document(html);

        let title = match resolve(&document, TITLE_CHAIN) {
            Some((strategy, title)) => {
                debug!(%outlet, article_id = %id, strategy, "Title resolved");
                title
            }
            None => {
                warn!(%outlet, article_id = %id, "No title found");
                String::new()
            }
        };

        let content = match resolve(&document, CONTENT_CHAIN) {
            Some((strategy, content)) => {
                debug!(%outlet, article_id = %id, strategy, "Content resolved");
                content
            }
            None => {
                warn!(%outlet, article_id = %id, "Article body not found");
                String::new()
            }
        };

        let published_at = match resolve(&document, TIMESTAMP_CHAIN) {
            Some((strategy, published_at)) => {
                debug!(%outlet, article_id = %id, strategy, "Timestamp resolved");
                Some(published_at)
            }
            None => {
                warn!(%outlet, article_id = %id, "Article date not found");
                None
            }
        };

        let summary = self.summary_for(&title);

        Article::new(outlet, id, link)
            .with_title(title)
            .with_content(content)
            .with_published_at(published_at)
            .with_summary(summary)
    }

    fn summary_for(&self, title: &str) -> String {
        if title.is_empty() {
            return String::new();
        }

        self.summaries
            .search(title, 1)
            .into_iter()
            .next()
            .map(|item| item.description)
            .unwrap_or_default()
    }
}

/// Text of every element matching `css`, whitespace collapsed and joined by spaces
fn select_text(document: &Html, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };

    let joined = document
        .select(&selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&joined)
}

fn nth_text(document: &Html, css: &str, index: usize) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let element = document.select(&selector).nth(index)?;
    Some(collapse_whitespace(&element_text(element)))
}

/// Elements whose boundaries separate words in rendered text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

fn is_block(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| BLOCK_TAGS.contains(&element.name()))
}

/// Descendant text with a space wherever a `<br>` or block element starts or ends
fn element_text(element: ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants().skip(1) {
        let breaks_before = is_block(node.value())
            || node.prev_sibling().is_some_and(|prev| is_block(prev.value()));
        if breaks_before && !text.is_empty() && !text.ends_with(char::is_whitespace) {
            text.push(' ');
        }
        if let Node::Text(fragment) = node.value() {
            text.push_str(fragment);
        }
    }

    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn headline_title(document: &Html) -> Option<String> {
    Some(select_text(document, "h2#title_area"))
}

fn end_title(document: &Html) -> Option<String> {
    Some(select_text(document, "h2.end_tit"))
}

fn sports_title(document: &Html) -> Option<String> {
    Some(select_text(document, "h4.title"))
}

fn article_body(document: &Html) -> Option<String> {
    Some(select_text(document, "article#dic_area"))
}

fn general_content(document: &Html) -> Option<String> {
    Some(select_text(document, "div#articeBody"))
}

fn sports_content(document: &Html) -> Option<String> {
    Some(select_text(document, "div#newsEndContents"))
}

fn datestamp_attribute(document: &Html) -> Option<String> {
    let selector = Selector::parse("span.media_end_head_info_datestamp_time").ok()?;
    let raw = document
        .select(&selector)
        .find_map(|element| element.value().attr("data-date-time"))?;

    timestamp::parse_canonical(raw).map(|dt| timestamp::format_canonical(&dt))
}

fn byline_time(document: &Html) -> Option<String> {
    let raw = nth_text(document, "span.author em", 0)?;
    timestamp::normalize(&raw)
}

fn sports_headline_time(document: &Html) -> Option<String> {
    let raw = nth_text(document, "div.news_headline span", 1)?;
    timestamp::normalize(raw.replace(SUBMITTED_LABEL, "").trim())
}
