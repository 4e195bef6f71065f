mod connection;
mod article_repository;
mod cursor_repository;

pub use connection::SqliteStorage;
pub use article_repository::SqliteArticleRepository;
pub use cursor_repository::SqliteCursorRepository;
