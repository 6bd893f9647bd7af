//! Single source of truth for rendering.
//!
//! `ViewState` owns the last-normalized collections plus the interactive UI
//! state and exposes named transitions. Renderers are pure functions over a
//! borrow of this struct; every transition is followed by a full re-render,
//! so no partial-update bookkeeping lives here.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::normalize::{LeaderboardRow, NewsItem, PriceRow};

/// News items beyond this count are not projected.
pub const NEWS_FEED_LIMIT: usize = 50;

#[derive(Debug, Default)]
pub struct ViewState {
    pub prices: Vec<PriceRow>,
    pub news: Vec<NewsItem>,
    pub leaderboard: Vec<LeaderboardRow>,
    /// Distinct non-empty sector labels, derived on every replace.
    pub sectors: BTreeSet<String>,
    pub selected_ticker: Option<String>,
    pub search_text: String,
    pub sector_filter: Option<String>,
    /// Producer-stamped snapshot time, for the status line.
    pub as_of: Option<String>,
    /// Wall-clock time of the last applied refresh.
    pub last_update: Option<DateTime<Utc>>,
    applied_seq: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap in a freshly normalized snapshot set.
    ///
    /// Refreshes carry a monotonic sequence number taken when the fetch was
    /// issued; a slow refresh that completes after a newer one has been
    /// applied is rejected (returns `false`) so stale data can never
    /// overwrite fresh data.
    pub fn replace(
        &mut self,
        seq: u64,
        prices: Vec<PriceRow>,
        mut news: Vec<NewsItem>,
        leaderboard: Vec<LeaderboardRow>,
        as_of: Option<String>,
    ) -> bool {
        if seq < self.applied_seq {
            tracing::debug!(seq, applied = self.applied_seq, "discarding stale refresh");
            return false;
        }
        self.applied_seq = seq;

        // Newest first; assumes the producer uses sortable timestamps.
        news.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        self.sectors = prices
            .iter()
            .filter(|row| !row.sector.is_empty())
            .map(|row| row.sector.clone())
            .collect();

        self.prices = prices;
        self.news = news;
        self.leaderboard = leaderboard;
        self.as_of = as_of;
        self.last_update = Some(Utc::now());

        // Retain the selection when the ticker survived the swap; otherwise
        // fall to the first row in watchlist order, or clear.
        let retained = self
            .selected_ticker
            .as_deref()
            .is_some_and(|ticker| self.prices.iter().any(|row| row.ticker == ticker));
        if !retained {
            self.selected_ticker = self
                .prices
                .iter()
                .map(|row| row.ticker.as_str())
                .min()
                .map(str::to_owned);
        }
        true
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// `None` clears the filter. An active filter must match a row's sector
    /// exactly; there is no hierarchy.
    pub fn set_sector_filter(&mut self, sector: Option<String>) {
        self.sector_filter = sector;
    }

    /// Select a ticker. Selecting one absent from the current price set has
    /// no effect; returns whether the selection changed.
    pub fn select(&mut self, ticker: &str) -> bool {
        if self.selected_ticker.as_deref() == Some(ticker) {
            return false;
        }
        if self.prices.iter().any(|row| row.ticker == ticker) {
            self.selected_ticker = Some(ticker.to_owned());
            return true;
        }
        false
    }

    pub fn selected_row(&self) -> Option<&PriceRow> {
        let ticker = self.selected_ticker.as_deref()?;
        self.prices.iter().find(|row| row.ticker == ticker)
    }

    /// Filtered, ticker-ascending watchlist projection.
    ///
    /// Predicate order: sector filter (exact match), then case-insensitive
    /// substring search over ticker and company. Rows without a ticker never
    /// reach this point; normalization drops them.
    pub fn watchlist(&self) -> Vec<&PriceRow> {
        let needle = self.search_text.trim().to_lowercase();
        let mut rows: Vec<&PriceRow> = self
            .prices
            .iter()
            .filter(|row| {
                self.sector_filter
                    .as_deref()
                    .is_none_or(|sector| row.sector == sector)
            })
            .filter(|row| {
                needle.is_empty()
                    || row.ticker.to_lowercase().contains(&needle)
                    || row.company.to_lowercase().contains(&needle)
            })
            .collect();
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        rows
    }

    /// Leaderboard rows, NAV descending. Rows whose NAV is absent or
    /// non-finite sort last; ties break by team ascending so the order is
    /// total and deterministic.
    pub fn leaderboard_rows(&self) -> Vec<&LeaderboardRow> {
        let mut rows: Vec<&LeaderboardRow> = self.leaderboard.iter().collect();
        rows.sort_by(|a, b| {
            let nav_a = a.nav.filter(|v| v.is_finite());
            let nav_b = b.nav.filter(|v| v.is_finite());
            let by_nav = match (nav_a, nav_b) {
                (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_nav.then_with(|| a.team.cmp(&b.team))
        });
        rows
    }

    /// First 50 items of the already newest-first news collection.
    pub fn news_feed(&self) -> &[NewsItem] {
        &self.news[..self.news.len().min(NEWS_FEED_LIMIT)]
    }

    /// Cycle the sector filter through: none -> each known sector -> none.
    pub fn cycle_sector_filter(&mut self) {
        let next = match self.sector_filter.as_deref() {
            None => self.sectors.iter().next().cloned(),
            Some(current) => self
                .sectors
                .range::<str, _>((
                    std::ops::Bound::Excluded(current),
                    std::ops::Bound::Unbounded,
                ))
                .next()
                .cloned(),
        };
        self.sector_filter = next;
    }

    /// Move the selection within the current watchlist projection.
    pub fn select_offset(&mut self, delta: isize) {
        let tickers: Vec<String> = self
            .watchlist()
            .iter()
            .map(|row| row.ticker.clone())
            .collect();
        if tickers.is_empty() {
            return;
        }
        let current = self
            .selected_ticker
            .as_deref()
            .and_then(|ticker| tickers.iter().position(|t| t == ticker));
        let next = match current {
            Some(idx) => idx
                .saturating_add_signed(delta)
                .min(tickers.len() - 1),
            None => 0,
        };
        self.selected_ticker = Some(tickers[next].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(ticker: &str, sector: &str, last: f64) -> PriceRow {
        PriceRow {
            ticker: ticker.to_string(),
            company: format!("{ticker} Corp"),
            sector: sector.to_string(),
            last: Some(last),
            ..Default::default()
        }
    }

    fn team(name: &str, nav: Option<f64>) -> LeaderboardRow {
        LeaderboardRow {
            team: name.to_string(),
            nav,
            ..Default::default()
        }
    }

    fn news(ticker: &str, timestamp: &str) -> NewsItem {
        NewsItem {
            ticker: ticker.to_string(),
            timestamp: timestamp.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_derives_sectors_and_selects_first() {
        let mut state = ViewState::new();
        let applied = state.replace(
            1,
            vec![
                price("ZZZ", "Tech", 10.0),
                price("AAA", "Energy", 20.0),
                price("MMM", "", 30.0),
            ],
            vec![],
            vec![],
            None,
        );
        assert!(applied);
        assert_eq!(
            state.sectors.iter().cloned().collect::<Vec<_>>(),
            vec!["Energy", "Tech"]
        );
        // Empty sector labels never become filter options.
        assert_eq!(state.selected_ticker.as_deref(), Some("AAA"));
    }

    #[test]
    fn test_replace_retains_surviving_selection() {
        let mut state = ViewState::new();
        state.replace(1, vec![price("AAA", "", 1.0), price("BBB", "", 2.0)], vec![], vec![], None);
        state.select("BBB");

        state.replace(2, vec![price("BBB", "", 3.0), price("CCC", "", 4.0)], vec![], vec![], None);
        assert_eq!(state.selected_ticker.as_deref(), Some("BBB"));

        // Selection disappears: falls to first in ticker order.
        state.replace(3, vec![price("DDD", "", 5.0), price("CCC", "", 6.0)], vec![], vec![], None);
        assert_eq!(state.selected_ticker.as_deref(), Some("CCC"));

        // No rows at all: selection cleared.
        state.replace(4, vec![], vec![], vec![], None);
        assert_eq!(state.selected_ticker, None);
    }

    #[test]
    fn test_stale_refresh_rejected() {
        let mut state = ViewState::new();
        assert!(state.replace(5, vec![price("NEW", "", 1.0)], vec![], vec![], None));
        // An older fetch finishing late must not overwrite newer data.
        assert!(!state.replace(3, vec![price("OLD", "", 1.0)], vec![], vec![], None));
        assert_eq!(state.prices[0].ticker, "NEW");
        // Equal seq (a retry of the same refresh) is allowed.
        assert!(state.replace(5, vec![price("NEW2", "", 1.0)], vec![], vec![], None));
    }

    #[test]
    fn test_select_absent_ticker_is_noop() {
        let mut state = ViewState::new();
        state.replace(1, vec![price("AAA", "", 1.0)], vec![], vec![], None);
        assert!(!state.select("GHOST"));
        assert_eq!(state.selected_ticker.as_deref(), Some("AAA"));
    }

    #[test]
    fn test_watchlist_filtering_and_order() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![
                price("DEF", "Tech", 1.0),
                price("ABC", "Tech", 2.0),
                price("XYZ", "Energy", 3.0),
            ],
            vec![],
            vec![],
            None,
        );

        let tickers: Vec<&str> = state.watchlist().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["ABC", "DEF", "XYZ"]);

        state.set_sector_filter(Some("Tech".to_string()));
        let tickers: Vec<&str> = state.watchlist().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["ABC", "DEF"]);

        state.set_search_text("def c");
        assert!(state.watchlist().is_empty());

        // Case-insensitive substring over ticker or company.
        state.set_search_text("ef");
        let tickers: Vec<&str> = state.watchlist().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["DEF"]);

        state.set_sector_filter(None);
        state.set_search_text("corp");
        assert_eq!(state.watchlist().len(), 3);
    }

    #[test]
    fn test_watchlist_sort_idempotent() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![price("B", "", 1.0), price("A", "", 2.0), price("C", "", 3.0)],
            vec![],
            vec![],
            None,
        );
        let first: Vec<String> = state.watchlist().iter().map(|r| r.ticker.clone()).collect();
        let second: Vec<String> = state.watchlist().iter().map(|r| r.ticker.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_leaderboard_order_with_non_finite_nav() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![],
            vec![],
            vec![
                team("A", Some(120.0)),
                team("B", Some(150.0)),
                team("C", None),
                team("D", Some(f64::NAN)),
            ],
            None,
        );
        let teams: Vec<&str> = state
            .leaderboard_rows()
            .iter()
            .map(|r| r.team.as_str())
            .collect();
        assert_eq!(teams, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_news_sorted_and_truncated() {
        let mut state = ViewState::new();
        let mut items: Vec<NewsItem> = (0..60)
            .map(|i| news("ABC", &format!("2026-03-02T10:{i:02}:00")))
            .collect();
        items.reverse();
        state.replace(1, vec![], items, vec![], None);

        let feed = state.news_feed();
        assert_eq!(feed.len(), NEWS_FEED_LIMIT);
        assert_eq!(feed[0].timestamp, "2026-03-02T10:59:00");
        assert!(feed[0].timestamp > feed[1].timestamp);
    }

    #[test]
    fn test_cycle_sector_filter() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![price("A", "Energy", 1.0), price("B", "Tech", 1.0)],
            vec![],
            vec![],
            None,
        );
        assert_eq!(state.sector_filter, None);
        state.cycle_sector_filter();
        assert_eq!(state.sector_filter.as_deref(), Some("Energy"));
        state.cycle_sector_filter();
        assert_eq!(state.sector_filter.as_deref(), Some("Tech"));
        state.cycle_sector_filter();
        assert_eq!(state.sector_filter, None);
    }

    #[test]
    fn test_select_offset_clamps() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![price("A", "", 1.0), price("B", "", 1.0), price("C", "", 1.0)],
            vec![],
            vec![],
            None,
        );
        state.select_offset(1);
        assert_eq!(state.selected_ticker.as_deref(), Some("B"));
        state.select_offset(10);
        assert_eq!(state.selected_ticker.as_deref(), Some("C"));
        state.select_offset(-10);
        assert_eq!(state.selected_ticker.as_deref(), Some("A"));
    }
}
