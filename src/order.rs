//! Trade-intent composition.
//!
//! The composer captures an order the user intends to place and hands it to
//! the external issue tracker that actually processes it. Two delivery
//! paths share one serialized body: an issue-creation URL opened in a
//! browser, or the body verbatim for manual pasting. Nothing here validates
//! against a live order book.

use url::Url;

use crate::config::Config;

/// Team identifier used when the form leaves it blank.
pub const DEFAULT_TEAM: &str = "team1";

/// Raw trade-intent form fields, exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub team: String,
    pub side: String,
    pub ticker: String,
    pub qty: String,
    pub order_type: String,
    pub limit_price: String,
    pub notes: String,
}

impl OrderForm {
    /// Pre-filled form for the currently selected instrument.
    pub fn for_ticker(ticker: &str) -> Self {
        Self {
            side: "BUY".to_string(),
            ticker: ticker.to_string(),
            order_type: "MARKET".to_string(),
            ..Default::default()
        }
    }

    fn team(&self) -> &str {
        let team = self.team.trim();
        if team.is_empty() {
            DEFAULT_TEAM
        } else {
            team
        }
    }

    fn ticker(&self) -> String {
        self.ticker.trim().to_uppercase()
    }

    fn qty(&self) -> i64 {
        self.qty.trim().parse().unwrap_or(0)
    }

    fn is_limit(&self) -> bool {
        self.order_type.trim().eq_ignore_ascii_case("limit")
    }
}

/// Serialize the form to the canonical line-oriented body.
///
/// Field order is fixed; `limit_price` appears only for limit orders that
/// actually carry one (a market order ignores a typed limit), and `notes`
/// only when non-empty.
pub fn serialize_body(form: &OrderForm) -> String {
    let mut lines = vec![
        format!("team: {}", form.team()),
        format!("side: {}", form.side.trim()),
        format!("ticker: {}", form.ticker()),
        format!("qty: {}", form.qty()),
        format!("order_type: {}", form.order_type.trim()),
    ];
    let limit = form.limit_price.trim();
    if form.is_limit() && !limit.is_empty() {
        lines.push(format!("limit_price: {limit}"));
    }
    let notes = form.notes.trim();
    if !notes.is_empty() {
        lines.push(format!("notes: {notes}"));
    }
    lines.join("\n")
}

/// Derived issue title: `Order: <side> <qty> <ticker>`.
pub fn issue_title(form: &OrderForm) -> String {
    format!("Order: {} {} {}", form.side.trim(), form.qty(), form.ticker())
}

/// Issue-creation URL with title and body percent-encoded as query
/// parameters, to be opened in a new browsing context.
pub fn issue_url(form: &OrderForm, config: &Config) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{}/issues/new", config.issue_repo))?;
    url.query_pairs_mut()
        .append_pair("labels", &config.issue_labels)
        .append_pair("template", &config.issue_template)
        .append_pair("title", &issue_title(form))
        .append_pair("body", &serialize_body(form));
    Ok(url)
}

/// Clipboard fallback: the serialized body, verbatim.
pub fn clipboard_payload(form: &OrderForm) -> String {
    serialize_body(form)
}
