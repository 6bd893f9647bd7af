//! End-to-end scenarios over the normalize -> state -> views pipeline,
//! exercised exactly the way the binary wires them together.

use serde_json::{json, Value};

use tapedesk::config::Config;
use tapedesk::normalize::{
    normalize_leaderboard_rows, normalize_news_items, normalize_prices, payload_as_of,
};
use tapedesk::order::{self, OrderForm};
use tapedesk::state::ViewState;
use tapedesk::views::{
    project_leaderboard, project_news, project_watchlist, status_line, Polarity,
};

fn apply(state: &mut ViewState, seq: u64, prices: &Value, news: &Value, leaderboard: &Value) {
    state.replace(
        seq,
        normalize_prices(prices),
        normalize_news_items(news),
        normalize_leaderboard_rows(leaderboard),
        payload_as_of(prices),
    );
}

#[test]
fn scenario_price_row_normalizes_and_derives() {
    let prices = json!([{"ticker": "ABC", "close": 101, "prev_close": 100, "volume": 500}]);
    let rows = normalize_prices(&prices);
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.last, Some(101.0));
    assert_eq!(row.prev, Some(100.0));
    assert_eq!(row.change, Some(1.0));
    assert_eq!(row.percent_change, Some(1.0));
    assert_eq!(row.volume, Some(500.0));

    let mut state = ViewState::new();
    apply(&mut state, 1, &prices, &json!(null), &json!(null));

    let view = project_watchlist(&state);
    let cell = &view.rows[0];
    assert_eq!(cell.last, "101.00");
    assert_eq!(cell.change, "+1.00");
    assert_eq!(cell.percent_change, "+1.00%");
    assert_eq!(cell.volume, "500");
    assert_eq!(cell.change_polarity, Polarity::Positive);
}

#[test]
fn scenario_prices_unreachable_degrades_gracefully() {
    // The fetcher downgrades an unreachable resource to Null; news and
    // leaderboard still came through.
    let prices = json!(null);
    let news = json!({"timestamp": "2026-03-02T10:00:00", "items": [
        {"ticker": "ABC", "headline": "ABC rallies", "timestamp": "2026-03-02T10:00:00"}
    ]});
    let leaderboard = json!([{"team": "team1", "nav": 100_000.0}]);

    let mut state = ViewState::new();
    apply(&mut state, 1, &prices, &news, &leaderboard);

    let watchlist = project_watchlist(&state);
    assert!(watchlist.rows.is_empty());
    assert_eq!(watchlist.placeholder.as_deref(), Some("no tickers yet"));

    assert_eq!(project_news(&state).lines.len(), 1);
    assert_eq!(project_leaderboard(&state).rows.len(), 1);

    let status = status_line(&state, &["prices"]);
    assert!(status.contains("fetch failed: prices"));
}

#[test]
fn scenario_leaderboard_ordering_with_missing_nav() {
    let leaderboard = json!([
        {"team": "A", "nav": 120},
        {"team": "B", "nav": 150},
        {"team": "C"}
    ]);
    let mut state = ViewState::new();
    apply(&mut state, 1, &json!(null), &json!(null), &leaderboard);

    let view = project_leaderboard(&state);
    let teams: Vec<&str> = view.rows.iter().map(|r| r.team.as_str()).collect();
    // Non-finite nav sorts last, per the documented tie-break policy.
    assert_eq!(teams, vec!["B", "A", "C"]);
    assert_eq!(view.rows[2].nav, "—");
}

#[test]
fn scenario_composer_serialization() {
    let form = OrderForm {
        team: String::new(),
        side: "BUY".to_string(),
        ticker: "xyz".to_string(),
        qty: "10".to_string(),
        order_type: "LIMIT".to_string(),
        limit_price: "42.5".to_string(),
        notes: String::new(),
    };

    let body = order::serialize_body(&form);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines,
        vec![
            "team: team1",
            "side: BUY",
            "ticker: XYZ",
            "qty: 10",
            "order_type: LIMIT",
            "limit_price: 42.5",
        ]
    );

    let url = order::issue_url(&form, &Config::default()).unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs[0], ("labels".to_string(), "order".to_string()));
    assert_eq!(pairs[1], ("template".to_string(), "order.yml".to_string()));
    assert_eq!(pairs[2], ("title".to_string(), "Order: BUY 10 XYZ".to_string()));
    assert_eq!(pairs[3].0, "body");
    assert_eq!(pairs[3].1, body);
}

#[test]
fn scenario_stale_refresh_never_overwrites_fresh_data() {
    let fresh = json!({"rows": [{"ticker": "NEW", "close": 10}]});
    let stale = json!({"rows": [{"ticker": "OLD", "close": 9}]});

    let mut state = ViewState::new();
    // Refresh 2 completes before refresh 1.
    apply(&mut state, 2, &fresh, &json!(null), &json!(null));
    apply(&mut state, 1, &stale, &json!(null), &json!(null));

    let view = project_watchlist(&state);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].ticker, "NEW");
}

#[test]
fn scenario_selection_follows_watchlist_across_refreshes() {
    let mut state = ViewState::new();
    apply(
        &mut state,
        1,
        &json!([{"ticker": "BBB", "close": 1}, {"ticker": "AAA", "close": 2}]),
        &json!(null),
        &json!(null),
    );
    assert_eq!(state.selected_ticker.as_deref(), Some("AAA"));

    assert!(state.select("BBB"));
    apply(
        &mut state,
        2,
        &json!([{"ticker": "CCC", "close": 3}]),
        &json!(null),
        &json!(null),
    );
    // BBB vanished; selection falls to the first remaining row.
    assert_eq!(state.selected_ticker.as_deref(), Some("CCC"));
}
