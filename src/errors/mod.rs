use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Caller errors
    #[error("Invalid timestamp (expected yyyy-MM-dd HH:mm:ss): {0}")]
    InvalidTimestamp(String),

    // Network errors
    #[error("Fetch failed: {detail}")]
    Fetch { status: Option<u16>, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Article not found: {0}")]
    ArticleNotFound(i64),
}

impl HarvestError {
    /// HTTP status carried by a fetch failure, if the transport produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            HarvestError::Fetch { status, .. } => *status,
            HarvestError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type HarvestResult<T> = Result<T, HarvestError>;
