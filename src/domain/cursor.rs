use serde::{Deserialize, Serialize};

use super::{ArticleId, OutletCode};

/// Resume point for an outlet: the article id the next session starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletCursor {
    pub outlet_code: OutletCode,
    pub last_article_id: ArticleId,
}

impl OutletCursor {
    pub fn new(outlet_code: OutletCode, last_article_id: ArticleId) -> Self {
        Self {
            outlet_code,
            last_article_id,
        }
    }
}
