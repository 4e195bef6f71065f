pub mod traits;
pub mod sqlite;

pub use traits::{ArticleRepository, CursorRepository};
pub use sqlite::{SqliteStorage, SqliteArticleRepository, SqliteCursorRepository};
