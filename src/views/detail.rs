//! Detail panel projection for the selected instrument.
//!
//! Carries the sparkline geometry and the ticker the order composer should
//! be pre-filled with, so a selection change updates panel, chart, and
//! composer together.

use crate::sparkline::{self, Sparkline};
use crate::state::ViewState;
use crate::views::{escape_text, fmt_percent, fmt_price, fmt_signed, fmt_volume, Polarity};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub last: String,
    pub prev: String,
    pub change: String,
    pub change_polarity: Polarity,
    pub percent_change: String,
    pub volume: String,
    pub timestamp: String,
    pub regime: String,
    pub macro_headline: String,
    pub spark: Sparkline,
    /// Pre-fill for the order composer's ticker field.
    pub composer_ticker: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub panel: Option<DetailPanel>,
    pub placeholder: Option<String>,
}

pub fn project_detail(state: &ViewState) -> DetailView {
    match state.selected_row() {
        Some(row) => DetailView {
            panel: Some(DetailPanel {
                ticker: escape_text(&row.ticker),
                company: escape_text(&row.company),
                sector: escape_text(&row.sector),
                last: fmt_price(row.last),
                prev: fmt_price(row.prev),
                change: fmt_signed(row.change),
                change_polarity: Polarity::of(row.change),
                percent_change: fmt_percent(row.percent_change),
                volume: fmt_volume(row.volume),
                timestamp: escape_text(&row.timestamp),
                regime: escape_text(&row.regime),
                macro_headline: escape_text(&row.macro_headline),
                spark: sparkline::build(row),
                composer_ticker: row.ticker.clone(),
            }),
            placeholder: None,
        },
        None => DetailView {
            panel: None,
            placeholder: Some("select a ticker".to_string()),
        },
    }
}
