use crate::domain::{Article, OutletCode, OutletCursor};
use crate::errors::HarvestResult;

#[cfg_attr(test, mockall::automock)]
pub trait ArticleRepository: Send + Sync {
    /// Store a whole session's articles at once; returns how many rows were written
    fn save_all(&self, articles: &[Article]) -> HarvestResult<usize>;
    fn get_by_id(&self, id: i64) -> HarvestResult<Option<Article>>;
    fn recent(&self, outlet: OutletCode, limit: u32) -> HarvestResult<Vec<Article>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait CursorRepository: Send + Sync {
    fn get(&self, outlet: OutletCode) -> HarvestResult<Option<OutletCursor>>;
    fn save(&self, cursor: &OutletCursor) -> HarvestResult<()>;
    fn get_all(&self) -> HarvestResult<Vec<OutletCursor>>;
}
