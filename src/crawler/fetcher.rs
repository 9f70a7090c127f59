//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with request and connect timeouts
//! - Picking a random user agent for every request
//! - Classifying transport and status failures
//!
//! There is no retry. Callers decide whether a failed fetch skips an item or
//! a whole listing page.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use rand::seq::IndexedRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// Fetches pages with a rotating user agent
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agents: Vec<String>,
}

impl Fetcher {
    /// Builds a fetcher from the crawler and user-agent configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Ready to fetch
    /// * `Err(FetchError::Client)` - Empty user-agent pool or client build failure
    ///
    /// # Example
    ///
    /// ```no_run
    /// use news_harvest::config::{CrawlerConfig, UserAgentConfig};
    /// use news_harvest::crawler::Fetcher;
    ///
    /// let fetcher = Fetcher::new(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
    /// ```
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, FetchError> {
        if user_agent.pool.is_empty() {
            return Err(FetchError::Client("user-agent pool is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(crawler.request_timeout_secs))
            .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            user_agents: user_agent.pool.clone(),
        })
    }

    /// Picks a user agent uniformly at random from the pool
    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Fetches `url` and returns the response body
    ///
    /// # Errors
    ///
    /// * `FetchError::Transport` - Connection, timeout or body decode failure
    /// * `FetchError::Status` - Any non-2xx response
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let user_agent = self.pick_user_agent();
        tracing::trace!(url, user_agent, "GET");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
