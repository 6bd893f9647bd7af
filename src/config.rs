//! Runtime configuration.
//!
//! Everything is environment-driven with sensible defaults so the dashboard
//! runs against a local snapshot directory out of the box. Resource URLs can
//! be set individually or derived from a single base URL.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/snapshots";
const DEFAULT_ISSUE_REPO: &str = "https://github.com/example/market-sim";
const DEFAULT_ISSUE_LABELS: &str = "order";
const DEFAULT_ISSUE_TEMPLATE: &str = "order.yml";
const DEFAULT_REFRESH_SECS: u64 = 30;

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prices snapshot resource.
    pub prices_url: String,
    /// News snapshot resource.
    pub news_url: String,
    /// Leaderboard snapshot resource.
    pub leaderboard_url: String,
    /// Repository the trade-intent issues are filed against.
    pub issue_repo: String,
    /// Label applied to composed issues.
    pub issue_labels: String,
    /// Issue form template name.
    pub issue_template: String,
    /// Interval between automatic refreshes.
    pub refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Read configuration from the process environment. Missing or invalid
    /// variables fall back to defaults; this never fails.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = lookup("TAPEDESK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base = base.trim_end_matches('/').to_string();

        let resource = |key: &str, file: &str| {
            lookup(key).unwrap_or_else(|| format!("{base}/{file}"))
        };

        let refresh_secs = lookup("TAPEDESK_REFRESH_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_REFRESH_SECS);

        Self {
            prices_url: resource("TAPEDESK_PRICES_URL", "latest_prices.json"),
            news_url: resource("TAPEDESK_NEWS_URL", "latest_news.json"),
            leaderboard_url: resource("TAPEDESK_LEADERBOARD_URL", "leaderboard.json"),
            issue_repo: lookup("TAPEDESK_ISSUE_REPO")
                .unwrap_or_else(|| DEFAULT_ISSUE_REPO.to_string())
                .trim_end_matches('/')
                .to_string(),
            issue_labels: lookup("TAPEDESK_ISSUE_LABELS")
                .unwrap_or_else(|| DEFAULT_ISSUE_LABELS.to_string()),
            issue_template: lookup("TAPEDESK_ISSUE_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_ISSUE_TEMPLATE.to_string()),
            refresh_interval: Duration::from_secs(refresh_secs),
        }
    }
}
