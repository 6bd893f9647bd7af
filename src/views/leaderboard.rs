//! Leaderboard projection: teams ranked by NAV.

use crate::state::ViewState;
use crate::views::{escape_text, fmt_price, Polarity, DASH};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRowView {
    pub rank: String,
    pub team: String,
    pub nav: String,
    pub cash: String,
    pub realized_pnl: String,
    pub pnl_polarity: Polarity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub rows: Vec<LeaderboardRowView>,
    pub placeholder: Option<String>,
}

pub fn project_leaderboard(state: &ViewState) -> LeaderboardView {
    let rows: Vec<LeaderboardRowView> = state
        .leaderboard_rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardRowView {
            rank: (i + 1).to_string(),
            team: escape_text(&row.team),
            nav: fmt_price(row.nav.filter(|v| v.is_finite())),
            cash: fmt_price(row.cash.filter(|v| v.is_finite())),
            realized_pnl: match row.realized_pnl.filter(|v| v.is_finite()) {
                Some(v) => format!("{v:+.2}"),
                None => DASH.to_string(),
            },
            pnl_polarity: Polarity::of(row.realized_pnl.filter(|v| v.is_finite())),
        })
        .collect();

    let placeholder = rows.is_empty().then(|| "no teams yet".to_string());
    LeaderboardView { rows, placeholder }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::LeaderboardRow;

    #[test]
    fn test_ranked_by_nav_descending() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![],
            vec![],
            vec![
                LeaderboardRow {
                    team: "A".to_string(),
                    nav: Some(120.0),
                    cash: Some(20.0),
                    realized_pnl: Some(-5.0),
                },
                LeaderboardRow {
                    team: "B".to_string(),
                    nav: Some(150.0),
                    ..Default::default()
                },
            ],
            None,
        );

        let view = project_leaderboard(&state);
        assert_eq!(view.rows[0].team, "B");
        assert_eq!(view.rows[0].rank, "1");
        assert_eq!(view.rows[1].nav, "120.00");
        assert_eq!(view.rows[1].realized_pnl, "-5.00");
        assert_eq!(view.rows[1].pnl_polarity, Polarity::Negative);
    }

    #[test]
    fn test_non_finite_nav_renders_dash_last() {
        let mut state = ViewState::new();
        state.replace(
            1,
            vec![],
            vec![],
            vec![
                LeaderboardRow {
                    team: "C".to_string(),
                    nav: Some(f64::NAN),
                    ..Default::default()
                },
                LeaderboardRow {
                    team: "A".to_string(),
                    nav: Some(100.0),
                    ..Default::default()
                },
            ],
            None,
        );

        let view = project_leaderboard(&state);
        assert_eq!(view.rows[1].team, "C");
        assert_eq!(view.rows[1].nav, DASH);
        assert_eq!(view.rows[1].pnl_polarity, Polarity::Neutral);
    }

    #[test]
    fn test_empty_leaderboard_placeholder() {
        let state = ViewState::new();
        assert_eq!(
            project_leaderboard(&state).placeholder.as_deref(),
            Some("no teams yet")
        );
    }
}
