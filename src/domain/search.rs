use serde::{Deserialize, Serialize};

/// One hit from the news search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    #[serde(rename = "originallink", default)]
    pub original_link: String,
    #[serde(default)]
    pub link: String,
    pub description: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}
