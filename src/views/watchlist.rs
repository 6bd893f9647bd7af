//! Watchlist projection: filtered, ticker-ascending instrument table.

use crate::state::ViewState;
use crate::views::{escape_text, fmt_percent, fmt_price, fmt_signed, fmt_volume, Polarity};

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistRowView {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub last: String,
    pub change: String,
    pub change_polarity: Polarity,
    pub percent_change: String,
    pub percent_polarity: Polarity,
    pub volume: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistView {
    pub rows: Vec<WatchlistRowView>,
    /// Set when there is nothing to show; distinguishes "no data" from
    /// "filters matched nothing".
    pub placeholder: Option<String>,
}

pub fn project_watchlist(state: &ViewState) -> WatchlistView {
    let rows: Vec<WatchlistRowView> = state
        .watchlist()
        .into_iter()
        .map(|row| WatchlistRowView {
            ticker: escape_text(&row.ticker),
            company: escape_text(&row.company),
            sector: escape_text(&row.sector),
            last: fmt_price(row.last),
            change: fmt_signed(row.change),
            change_polarity: Polarity::of(row.change),
            percent_change: fmt_percent(row.percent_change),
            percent_polarity: Polarity::of(row.percent_change),
            volume: fmt_volume(row.volume),
            selected: state.selected_ticker.as_deref() == Some(row.ticker.as_str()),
        })
        .collect();

    let placeholder = if rows.is_empty() {
        Some(if state.prices.is_empty() {
            "no tickers yet".to_string()
        } else {
            "no matches".to_string()
        })
    } else {
        None
    };

    WatchlistView { rows, placeholder }
}
