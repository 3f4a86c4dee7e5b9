// =============================================================================
// Display-Mode Transformer
// =============================================================================
//
//   None         y'[i] = y[i]
//   ROC          y'[0] = 0,  y'[i] = (y[i] - y[i-1]) / y[i-1] * 100
//   GrowthOf100  y'[i] = y[i] / y[0] * 100
//   Scale0To100  y'[i] = (y[i] - min) / (max - min) * 100
//
// Timestamps and length are preserved.  Division by zero is NOT guarded: a
// zero previous value, a zero first value or a flat series yields Infinity or
// NaN exactly as IEEE-754 dictates, and downstream stages see those values.
// =============================================================================

use crate::types::{DisplayMode, Point};

/// Apply `mode` to a validated series.  Empty input yields empty output.
pub fn apply(mode: DisplayMode, points: &[Point]) -> Vec<Point> {
    match mode {
        DisplayMode::None => points.to_vec(),
        DisplayMode::Roc => rate_of_change(points),
        DisplayMode::GrowthOf100 => growth_of_100(points),
        DisplayMode::Scale0To100 => scale_0_to_100(points),
    }
}

/// Percentage change from the previous observation of the input series.
pub fn rate_of_change(points: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len());
    if let Some(first) = points.first() {
        out.push(Point { x: first.x, y: 0.0 });
    }
    out.extend(points.windows(2).map(|w| Point {
        x: w[1].x,
        y: (w[1].y - w[0].y) / w[0].y * 100.0,
    }));
    out
}

/// Rebase the series so that the first observation equals 100.
pub fn growth_of_100(points: &[Point]) -> Vec<Point> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let base = first.y;
    points
        .iter()
        .map(|p| Point {
            x: p.x,
            y: p.y / base * 100.0,
        })
        .collect()
}

/// Min-max normalise the series into `[0, 100]`.
pub fn scale_0_to_100(points: &[Point]) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let range = max - min;

    points
        .iter()
        .map(|p| Point {
            x: p.x,
            y: (p.y - min) / range * 100.0,
        })
        .collect()
}
