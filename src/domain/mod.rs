pub mod article;
pub mod cursor;
pub mod fetch;
pub mod search;
pub mod timestamp;

pub use article::{Article, ArticleId, OutletCode};
pub use cursor::OutletCursor;
pub use fetch::FetchOutcome;
pub use search::SearchItem;
