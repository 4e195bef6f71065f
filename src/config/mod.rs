use std::str::FromStr;
use std::time::Duration;

use crate::errors::{HarvestError, HarvestResult};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";
pub const DEFAULT_NEWS_BASE_URL: &str = "https://n.news.naver.com";
pub const DEFAULT_MEDIA_BASE_URL: &str = "https://media.naver.com";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://openapi.naver.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub naver_client_id: String,
    pub naver_client_secret: String,
    pub db_path: String,
    pub user_agent: String,
    pub news_base_url: String,
    pub media_base_url: String,
    pub search_base_url: String,
    pub http_timeout: Duration,
    pub retry_delay: Duration,
    pub not_found_limit: u32,
}

impl Config {
    /// Configuration with portal defaults and the given search API credentials
    pub fn new(naver_client_id: impl Into<String>, naver_client_secret: impl Into<String>) -> Self {
        Self {
            naver_client_id: naver_client_id.into(),
            naver_client_secret: naver_client_secret.into(),
            db_path: "./harvester.db".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            news_base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(500),
            not_found_limit: 100,
        }
    }

    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> HarvestResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let naver_client_id = std::env::var("NAVER_CLIENT_ID")
            .map_err(|_| HarvestError::MissingEnvVar("NAVER_CLIENT_ID".to_string()))?;

        let naver_client_secret = std::env::var("NAVER_CLIENT_SECRET")
            .map_err(|_| HarvestError::MissingEnvVar("NAVER_CLIENT_SECRET".to_string()))?;

        let mut config = Self::new(naver_client_id, naver_client_secret);

        // Default db_path is relative to executable directory
        config.db_path = std::env::var("HARVESTER_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("harvester.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./harvester.db".to_string())
        });

        if let Ok(user_agent) = std::env::var("HARVESTER_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Ok(url) = std::env::var("HARVESTER_NEWS_BASE_URL") {
            config.news_base_url = url;
        }
        if let Ok(url) = std::env::var("HARVESTER_MEDIA_BASE_URL") {
            config.media_base_url = url;
        }
        if let Ok(url) = std::env::var("HARVESTER_SEARCH_BASE_URL") {
            config.search_base_url = url;
        }
        if let Some(secs) = env_number::<u64>("HARVESTER_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = env_number::<u64>("HARVESTER_RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(millis);
        }
        if let Some(limit) = env_number::<u32>("HARVESTER_NOT_FOUND_LIMIT")? {
            config.not_found_limit = limit;
        }

        Ok(config)
    }
}

fn env_number<T: FromStr>(name: &str) -> HarvestResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HarvestError::Config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
