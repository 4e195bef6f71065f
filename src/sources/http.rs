use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::FetchOutcome;
use crate::errors::HarvestResult;
use crate::sources::traits::PageFetcher;

/// Build the blocking client shared by every component of a run
pub fn build_client(config: &Config) -> HarvestResult<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.http_timeout)
        .build()?;
    Ok(client)
}

/// Page fetcher over a shared blocking client
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome<String> {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Request failed before a response arrived");
                return FetchOutcome::OtherFailure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "Non-success response");
            return FetchOutcome::from_status(status.as_u16(), url);
        }

        match response.text() {
            Ok(body) => FetchOutcome::Success(body),
            Err(e) => FetchOutcome::OtherFailure(format!("Failed reading body of {}: {}", url, e)),
        }
    }
}
