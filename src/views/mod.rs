//! Pure view projections.
//!
//! Each submodule turns a `ViewState` borrow into a display-ready view
//! description: plain strings, already formatted and escaped, plus polarity
//! tags for styling. Materializing those descriptions (terminal widgets,
//! markup, ...) is the binary's job; everything here runs headless.

pub mod detail;
pub mod leaderboard;
pub mod news;
pub mod watchlist;

pub use detail::{project_detail, DetailPanel, DetailView};
pub use leaderboard::{project_leaderboard, LeaderboardRowView, LeaderboardView};
pub use news::{project_news, NewsLineView, NewsView};
pub use watchlist::{project_watchlist, WatchlistRowView, WatchlistView};

use crate::state::ViewState;

/// Placeholder for a missing numeric value. Never "0" and never "NaN":
/// absence of data must stay visually distinct from a zero.
pub const DASH: &str = "—";

/// Styling tag for signed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Polarity {
    /// Non-negative reads positive; unknown stays neutral.
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v < 0.0 => Polarity::Negative,
            Some(_) => Polarity::Positive,
            None => Polarity::Neutral,
        }
    }
}

/// Two-decimal fixed formatting for prices.
pub fn fmt_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => DASH.to_string(),
    }
}

/// Two-decimal fixed formatting with an explicit sign, for changes.
pub fn fmt_signed(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}"),
        None => DASH.to_string(),
    }
}

pub fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}%"),
        None => DASH.to_string(),
    }
}

/// Thousands-grouped integer formatting for volumes.
pub fn fmt_volume(value: Option<f64>) -> String {
    let Some(v) = value else {
        return DASH.to_string();
    };
    let rounded = v.round() as i64;
    group_thousands(rounded)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Escape user-supplied text for markup embedding. View descriptions double
/// as the exportable representation, so headlines, company names, and notes
/// are sanitized here rather than at materialization time.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// One-line refresh status: failures first (they matter most), then the
/// producer's as-of stamp.
pub fn status_line(state: &ViewState, failures: &[&str]) -> String {
    let mut parts = Vec::new();
    if !failures.is_empty() {
        parts.push(format!("fetch failed: {}", failures.join(", ")));
    }
    match &state.as_of {
        Some(as_of) => parts.push(format!("as of {as_of}")),
        None if failures.is_empty() && state.prices.is_empty() => {
            parts.push("no data yet".to_string())
        }
        None => {}
    }
    if let Some(updated) = state.last_update {
        parts.push(format!("refreshed {}", updated.format("%H:%M:%S")));
    }
    parts.join(" | ")
}
