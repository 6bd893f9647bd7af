//! Sparkline path geometry.
//!
//! Maps a price series onto a fixed 600x220 canvas with uniform padding and
//! emits the scaled points, an open line path, a closed fill-area path, and
//! a marker at the final point. A row with no usable history gets a flat
//! synthesized series so "no data" reads as a flat line instead of an empty
//! chart.

use crate::normalize::PriceRow;

pub const CANVAS_WIDTH: f64 = 600.0;
pub const CANVAS_HEIGHT: f64 = 220.0;
pub const PADDING: f64 = 14.0;

/// Length of the synthesized flat series.
pub const FLAT_SERIES_LEN: usize = 24;
/// Level of the flat series when even the last price is unknown.
pub const NEUTRAL_PRICE: f64 = 100.0;

/// Scaled 2-D geometry for one sparkline.
#[derive(Debug, Clone, PartialEq)]
pub struct Sparkline {
    /// Mapped (x, y) points, one per series entry.
    pub points: Vec<(f64, f64)>,
    /// SVG-style polyline through all points.
    pub line_path: String,
    /// Line path closed down to the baseline, for the fill area.
    pub area_path: String,
    /// Final point, highlighted as the latest value.
    pub marker: (f64, f64),
}

/// Build sparkline geometry for a price row. Never fails: degenerate input
/// (no series, a single point, all-equal values) produces a valid flat line.
pub fn build(row: &PriceRow) -> Sparkline {
    build_series(&effective_series(row))
}

/// Build geometry from a concrete series. Callers are expected to pass at
/// least two points; anything shorter is padded out flat.
pub fn build_series(series: &[f64]) -> Sparkline {
    let series: Vec<f64> = if series.len() >= 2 {
        series.to_vec()
    } else {
        let level = series.first().copied().unwrap_or(NEUTRAL_PRICE);
        vec![level; FLAT_SERIES_LEN]
    };

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Floor the span at 1 so a perfectly flat series does not divide by zero.
    let span = (max - min).max(1.0);

    let inner_w = CANVAS_WIDTH - 2.0 * PADDING;
    let inner_h = CANVAS_HEIGHT - 2.0 * PADDING;
    let step = inner_w / (series.len() - 1) as f64;

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = PADDING + i as f64 * step;
            // Higher value, smaller y.
            let y = PADDING + (1.0 - (v - min) / span) * inner_h;
            (x, y)
        })
        .collect();

    let mut line_path = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let op = if i == 0 { 'M' } else { 'L' };
        line_path.push_str(&format!("{op} {x:.2} {y:.2} "));
    }
    let line_path = line_path.trim_end().to_string();

    let baseline = CANVAS_HEIGHT - PADDING;
    let first_x = points[0].0;
    let last_x = points[points.len() - 1].0;
    let area_path = format!(
        "{line_path} L {last_x:.2} {baseline:.2} L {first_x:.2} {baseline:.2} Z"
    );

    let marker = points[points.len() - 1];

    Sparkline {
        points,
        line_path,
        area_path,
        marker,
    }
}

/// Pick the series to chart: the row's own history when it has at least two
/// finite points, otherwise a flat line at the last known price.
fn effective_series(row: &PriceRow) -> Vec<f64> {
    if let Some(series) = &row.series {
        let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() >= 2 {
            return finite;
        }
    }
    let level = row.last.filter(|v| v.is_finite()).unwrap_or(NEUTRAL_PRICE);
    vec![level; FLAT_SERIES_LEN]
}
