use rusqlite::Row;

use crate::domain::{Article, ArticleId, OutletCode};
use crate::errors::{HarvestError, HarvestResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::ArticleRepository;

const SELECT_COLUMNS: &str =
    "SELECT outlet_code, article_id, title, content, link, published_at, summary FROM articles";

pub struct SqliteArticleRepository {
    storage: SqliteStorage,
}

impl SqliteArticleRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            outlet_code: OutletCode(row.get(0)?),
            article_id: ArticleId(row.get(1)?),
            title: row.get(2)?,
            content: row.get(3)?,
            link: row.get(4)?,
            published_at: row.get(5)?,
            summary: row.get(6)?,
        })
    }
}

impl ArticleRepository for SqliteArticleRepository {
    fn save_all(&self, articles: &[Article]) -> HarvestResult<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (outlet_code, article_id, title, content, link, published_at, summary) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for article in articles {
                stmt.execute((
                    article.outlet_code.0,
                    article.article_id.0,
                    &article.title,
                    &article.content,
                    &article.link,
                    &article.published_at,
                    &article.summary,
                ))?;
            }
        }
        tx.commit()?;

        Ok(articles.len())
    }

    fn get_by_id(&self, id: i64) -> HarvestResult<Option<Article>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;

        match stmt.query_row([id], Self::from_row) {
            Ok(article) => Ok(Some(article)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(HarvestError::from(e)),
        }
    }

    fn recent(&self, outlet: OutletCode, limit: u32) -> HarvestResult<Vec<Article>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE outlet_code = ?1 ORDER BY article_id DESC LIMIT ?2",
            SELECT_COLUMNS
        ))?;

        let articles = stmt.query_map((outlet.0, limit), Self::from_row)?;

        articles.collect::<Result<Vec<_>, _>>().map_err(HarvestError::from)
    }
}
