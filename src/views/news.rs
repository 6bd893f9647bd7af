//! News feed projection: newest first, capped at 50 lines.

use crate::state::ViewState;
use crate::views::{escape_text, Polarity};

#[derive(Debug, Clone, PartialEq)]
pub struct NewsLineView {
    pub timestamp: String,
    /// Empty when the item carries no ticker; such lines still render but
    /// cannot drive instrument selection.
    pub ticker: String,
    pub headline: String,
    pub event_type: String,
    pub sentiment: Polarity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsView {
    pub lines: Vec<NewsLineView>,
    pub placeholder: Option<String>,
}

pub fn project_news(state: &ViewState) -> NewsView {
    let lines: Vec<NewsLineView> = state
        .news_feed()
        .iter()
        .map(|item| NewsLineView {
            timestamp: escape_text(&item.timestamp),
            ticker: escape_text(&item.ticker),
            headline: escape_text(&item.headline),
            event_type: escape_text(&item.event_type),
            sentiment: sentiment_polarity(&item.sentiment),
        })
        .collect();

    let placeholder = lines.is_empty().then(|| "no news yet".to_string());
    NewsView { lines, placeholder }
}

fn sentiment_polarity(sentiment: &str) -> Polarity {
    match sentiment {
        "positive" => Polarity::Positive,
        "negative" => Polarity::Negative,
        _ => Polarity::Neutral,
    }
}
