// src/fetch.rs

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::ScraperConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-success status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("reading body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Anything that can turn a URL into page markup.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher that presents itself as a desktop browser.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching text from {}", url);
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.text().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
