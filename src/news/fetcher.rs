//! Upstream news fetching with redundant paths.
//!
//! # Responsibilities
//! - Request the news collection directly from the API
//! - Race configured relay endpoints alongside the direct request
//! - Enforce a hard deadline over the whole race
//!
//! # Design Decisions
//! - First strategy that answers 2xx *and* parses as JSON wins
//! - Losing attempts are dropped (cancelled) as soon as a winner exists
//! - Per-attempt failures are logged, never surfaced individually

use std::time::{Duration, Instant};

use futures_util::stream::{FuturesUnordered, StreamExt};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::observability::metrics;

/// Errors from a complete fetch race.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The race did not produce a winner within the deadline.
    #[error("upstream fetch timed out after {0} ms")]
    Timeout(u64),

    /// Every strategy failed.
    #[error("all {attempts} upstream fetch strategies failed")]
    AllFailed { attempts: usize },

    /// The HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why a single attempt lost.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(StatusCode),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One way of reaching the news collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Plain request to the API.
    Direct,
    /// Request through a relay; `{url}` in the template is replaced by the
    /// percent-encoded collection URL.
    Relay { index: usize, template: String },
}

impl FetchStrategy {
    /// Build the strategy list for a configuration: direct first, then relays.
    pub fn from_config(upstream: &UpstreamConfig) -> Vec<Self> {
        std::iter::once(FetchStrategy::Direct)
            .chain(
                upstream
                    .relays
                    .iter()
                    .enumerate()
                    .map(|(index, template)| FetchStrategy::Relay {
                        index,
                        template: template.clone(),
                    }),
            )
            .collect()
    }

    /// URL requested by this strategy.
    pub fn target(&self, news_url: &str) -> String {
        match self {
            FetchStrategy::Direct => news_url.to_string(),
            FetchStrategy::Relay { template, .. } => {
                template.replace("{url}", &urlencoding::encode(news_url))
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> String {
        match self {
            FetchStrategy::Direct => "direct".to_string(),
            FetchStrategy::Relay { index, .. } => format!("relay{}", index),
        }
    }
}

/// Fetches the news collection for each SSR request.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    client: reqwest::Client,
    news_url: String,
    strategies: Vec<FetchStrategy>,
    timeout: Duration,
}

impl NewsFetcher {
    /// Create a fetcher from configuration.
    pub fn new(upstream: &UpstreamConfig, connect_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(upstream.user_agent.as_str())
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            news_url: upstream.news_url(),
            strategies: FetchStrategy::from_config(upstream),
            timeout: Duration::from_millis(upstream.fetch_timeout_ms),
        })
    }

    pub fn news_url(&self) -> &str {
        &self.news_url
    }

    pub fn strategies(&self) -> &[FetchStrategy] {
        &self.strategies
    }

    /// Run all strategies concurrently and return the first JSON payload.
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        let start = Instant::now();

        let result = match tokio::time::timeout(self.timeout, self.race()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_millis() as u64)),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(FetchError::Timeout(_)) => "timeout",
            Err(_) => "failed",
        };
        metrics::record_upstream_fetch(outcome, start);

        if let Err(e) = &result {
            tracing::warn!(url = %self.news_url, error = %e, "Upstream news fetch failed");
        }
        result
    }

    async fn race(&self) -> Result<Value, FetchError> {
        let mut attempts: FuturesUnordered<_> = self
            .strategies
            .iter()
            .map(|strategy| self.attempt(strategy))
            .collect();

        let mut failed = 0;
        while let Some((strategy, result)) = attempts.next().await {
            match result {
                Ok(payload) => {
                    metrics::record_upstream_attempt(&strategy.label(), "won");
                    tracing::debug!(strategy = %strategy.label(), "Upstream fetch succeeded");
                    return Ok(payload);
                }
                Err(e) => {
                    failed += 1;
                    metrics::record_upstream_attempt(&strategy.label(), "failed");
                    tracing::debug!(strategy = %strategy.label(), error = %e, "Upstream attempt failed");
                }
            }
        }

        Err(FetchError::AllFailed { attempts: failed })
    }

    async fn attempt<'a>(
        &self,
        strategy: &'a FetchStrategy,
    ) -> (&'a FetchStrategy, Result<Value, AttemptError>) {
        let result = self.get_json(strategy.target(&self.news_url)).await;
        (strategy, result)
    }

    async fn get_json(&self, url: String) -> Result<Value, AttemptError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
