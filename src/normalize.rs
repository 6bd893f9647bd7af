//! Schema normalization for snapshot records.
//!
//! The snapshot pipeline has gone through several producers and the field
//! names drifted between them. Each canonical field therefore resolves
//! through an ordered alias list: the first alias present on the raw record
//! wins, matched case-sensitively. Normalization never fails; a field that
//! is absent or does not parse to a finite number stays `None` so that
//! "no data" remains distinguishable from a real zero.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aliases for the instrument identifier. Rows without any of these are
/// dropped entirely; everything else renders with gaps.
pub const TICKER_ALIASES: &[&str] = &["ticker", "symbol", "sym", "Ticker", "Symbol"];
pub const COMPANY_ALIASES: &[&str] = &["company_name", "company", "name"];
pub const SECTOR_ALIASES: &[&str] = &["sector", "Sector"];
pub const LAST_ALIASES: &[&str] = &["close", "last", "price", "Close", "Last"];
pub const PREV_ALIASES: &[&str] = &["prev_close", "previous_close", "prev", "PrevClose"];
pub const VOLUME_ALIASES: &[&str] = &["volume", "vol", "Volume"];
pub const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time", "bar_time", "date"];

// Fallbacks consulted only when the derived value cannot be computed.
// `chg`/`chg_pct` are the current producer's spellings.
pub const CHANGE_ALIASES: &[&str] = &["chg", "change"];
pub const PCT_CHANGE_ALIASES: &[&str] = &["chg_pct", "pct_change"];

pub const HEADLINE_ALIASES: &[&str] = &["headline", "title", "text"];
pub const EVENT_TYPE_ALIASES: &[&str] = &["event_type", "type", "event"];
pub const SENTIMENT_ALIASES: &[&str] = &["sentiment"];
pub const REGIME_ALIASES: &[&str] = &["regime", "macro_context"];
pub const MACRO_HEADLINE_ALIASES: &[&str] = &["macro_headline", "macroHeadline"];

pub const TEAM_ALIASES: &[&str] = &["team", "team_name", "name"];
pub const NAV_ALIASES: &[&str] = &["nav", "NAV", "equity"];
pub const CASH_ALIASES: &[&str] = &["cash", "Cash"];
pub const REALIZED_PNL_ALIASES: &[&str] = &["realized_pnl", "realizedPnl", "pnl"];

/// Canonical instrument snapshot row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PriceRow {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub last: Option<f64>,
    pub prev: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
    pub timestamp: String,
    pub regime: String,
    pub macro_headline: String,
    /// Intraday closes for the sparkline, when the producer supplies them.
    pub series: Option<Vec<f64>>,
}

/// Canonical news item. No field is required; items without a ticker still
/// render but cannot drive instrument selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsItem {
    pub ticker: String,
    pub company: String,
    pub headline: String,
    pub timestamp: String,
    pub event_type: String,
    pub sentiment: String,
    pub regime: String,
}

/// Canonical leaderboard row. Rows without a team identifier are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LeaderboardRow {
    pub team: String,
    pub nav: Option<f64>,
    pub cash: Option<f64>,
    pub realized_pnl: Option<f64>,
}

/// Extract the record array from a snapshot payload.
///
/// Payloads arrive either as a bare array or wrapped under `data`, `rows`,
/// or `items` (checked in that priority order, first key present wins).
/// Any other shape yields an empty slice rather than an error.
pub fn payload_rows(payload: &Value) -> &[Value] {
    if let Some(rows) = payload.as_array() {
        return rows;
    }
    if let Some(obj) = payload.as_object() {
        for key in ["data", "rows", "items"] {
            if let Some(wrapped) = obj.get(key) {
                return wrapped.as_array().map(Vec::as_slice).unwrap_or(&[]);
            }
        }
    }
    &[]
}

/// The producer stamps wrapped payloads with a top-level `timestamp`.
pub fn payload_as_of(payload: &Value) -> Option<String> {
    payload
        .as_object()
        .and_then(|obj| obj.get("timestamp"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Normalize one raw price record. `None` when the record is not an object
/// or carries no ticker under any alias.
pub fn normalize_price(raw: &Value) -> Option<PriceRow> {
    let obj = raw.as_object()?;
    let ticker = string_field(obj, TICKER_ALIASES);
    if ticker.is_empty() {
        return None;
    }

    let last = numeric_field(obj, LAST_ALIASES);
    let prev = numeric_field(obj, PREV_ALIASES);
    let change = match (last, prev) {
        (Some(last), Some(prev)) => Some(last - prev),
        _ => numeric_field(obj, CHANGE_ALIASES),
    };
    let percent_change = match (change, prev) {
        (Some(change), Some(prev)) if prev != 0.0 => Some(change / prev * 100.0),
        _ => numeric_field(obj, PCT_CHANGE_ALIASES),
    };

    Some(PriceRow {
        ticker,
        company: string_field(obj, COMPANY_ALIASES),
        sector: string_field(obj, SECTOR_ALIASES),
        last,
        prev,
        change,
        percent_change,
        volume: numeric_field(obj, VOLUME_ALIASES),
        timestamp: string_field(obj, TIMESTAMP_ALIASES),
        regime: string_field(obj, REGIME_ALIASES),
        macro_headline: string_field(obj, MACRO_HEADLINE_ALIASES),
        series: series_field(obj),
    })
}

/// Normalize one raw news record. Only non-objects are rejected.
pub fn normalize_news(raw: &Value) -> Option<NewsItem> {
    let obj = raw.as_object()?;
    Some(NewsItem {
        ticker: string_field(obj, TICKER_ALIASES),
        company: string_field(obj, COMPANY_ALIASES),
        headline: string_field(obj, HEADLINE_ALIASES),
        timestamp: string_field(obj, TIMESTAMP_ALIASES),
        event_type: string_field(obj, EVENT_TYPE_ALIASES),
        sentiment: string_field(obj, SENTIMENT_ALIASES),
        regime: string_field(obj, REGIME_ALIASES),
    })
}

/// Normalize one raw leaderboard record. `None` without a team identifier.
pub fn normalize_leaderboard(raw: &Value) -> Option<LeaderboardRow> {
    let obj = raw.as_object()?;
    let team = string_field(obj, TEAM_ALIASES);
    if team.is_empty() {
        return None;
    }
    Some(LeaderboardRow {
        team,
        nav: numeric_field(obj, NAV_ALIASES),
        cash: numeric_field(obj, CASH_ALIASES),
        realized_pnl: numeric_field(obj, REALIZED_PNL_ALIASES),
    })
}

/// Normalize a whole prices payload. Rows lacking a ticker are dropped;
/// duplicate tickers are kept as-is (last-wins is the consumer's concern).
pub fn normalize_prices(payload: &Value) -> Vec<PriceRow> {
    payload_rows(payload)
        .iter()
        .filter_map(normalize_price)
        .collect()
}

pub fn normalize_news_items(payload: &Value) -> Vec<NewsItem> {
    payload_rows(payload)
        .iter()
        .filter_map(normalize_news)
        .collect()
}

pub fn normalize_leaderboard_rows(payload: &Value) -> Vec<LeaderboardRow> {
    payload_rows(payload)
        .iter()
        .filter_map(normalize_leaderboard)
        .collect()
}

/// First alias present on the record, regardless of its value.
fn first_alias<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| obj.get(*alias))
}

/// A numeric value is "present" only if it parses to a finite f64. JSON
/// numbers and numeric strings qualify; null, booleans, and free text do not.
fn numeric_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    first_alias(obj, aliases).and_then(finite_f64)
}

fn finite_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Text fields take strings verbatim; numbers are stringified so numeric
/// timestamps stay sortable. Everything else is treated as absent.
fn string_field(obj: &Map<String, Value>, aliases: &[&str]) -> String {
    match first_alias(obj, aliases) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Raw chart series. Entries that are not numeric at all are skipped here;
/// the sparkline builder applies the finite filter.
fn series_field(obj: &Map<String, Value>) -> Option<Vec<f64>> {
    let raw = obj.get("series")?.as_array()?;
    Some(
        raw.iter()
            .filter_map(|entry| match entry {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .collect(),
    )
}
