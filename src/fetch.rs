//! Snapshot fetching.
//!
//! The three snapshot resources are fetched concurrently and each failure is
//! isolated: a resource that cannot be reached or parsed is downgraded to
//! `Value::Null`, which normalizes to an empty collection downstream. The
//! caller never sees an `Err` from a refresh.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Errors internal to a single resource fetch. These never cross the module
/// boundary; they are logged and downgraded to an empty payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(StatusCode),
}

/// Raw (pre-normalization) payloads for one refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct RawSnapshots {
    pub prices: Value,
    pub news: Value,
    pub leaderboard: Value,
}

/// Result of one refresh: the raw payloads plus the names of resources that
/// failed, for the status line.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOutcome {
    pub raw: RawSnapshots,
    pub failures: Vec<&'static str>,
}

impl SnapshotOutcome {
    /// True when every resource failed and nothing fresh was fetched.
    pub fn is_total_failure(&self) -> bool {
        self.failures.len() == 3
    }
}

/// Polls the three snapshot resources.
pub struct SnapshotFetcher {
    client: reqwest::Client,
    prices_url: String,
    news_url: String,
    leaderboard_url: String,
}

impl SnapshotFetcher {
    pub fn new(config: &Config) -> Self {
        // Snapshots change every cycle; never serve a cached copy.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            prices_url: config.prices_url.clone(),
            news_url: config.news_url.clone(),
            leaderboard_url: config.leaderboard_url.clone(),
        }
    }

    /// Fetch all three resources concurrently. Failures are per-resource and
    /// never abort the sibling fetches.
    pub async fn fetch_all(&self) -> SnapshotOutcome {
        let (prices, news, leaderboard) = futures::future::join3(
            self.fetch_resource("prices", &self.prices_url),
            self.fetch_resource("news", &self.news_url),
            self.fetch_resource("leaderboard", &self.leaderboard_url),
        )
        .await;

        let mut outcome = SnapshotOutcome::default();
        outcome.raw.prices = unwrap_or_report(prices, "prices", &mut outcome.failures);
        outcome.raw.news = unwrap_or_report(news, "news", &mut outcome.failures);
        outcome.raw.leaderboard =
            unwrap_or_report(leaderboard, "leaderboard", &mut outcome.failures);
        outcome
    }

    async fn fetch_resource(&self, name: &str, url: &str) -> Result<Value, FetchError> {
        debug!(resource = name, url, "fetching snapshot");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.json::<Value>().await?)
    }
}

fn unwrap_or_report(
    result: Result<Value, FetchError>,
    name: &'static str,
    failures: &mut Vec<&'static str>,
) -> Value {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(resource = name, %error, "snapshot fetch failed, treating as empty");
            failures.push(name);
            Value::Null
        }
    }
}
