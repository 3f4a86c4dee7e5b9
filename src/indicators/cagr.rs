// =============================================================================
// Compound Annual Growth Rate (CAGR)
// =============================================================================
//
//   years = (t_last - t_first) / (365 days in ms)
//   CAGR  = ((v_last / v_first) ^ (1 / years) - 1) * 100
//
// One constant applied to every point of the series.  Zero elapsed time or a
// zero first value is not guarded and yields IEEE-754 Infinity / NaN.  A unit
// ratio raised to an infinite or NaN exponent is NaN here, not the `1.0` that
// `f64::powf` returns, so a single point never reports a finite 0%.
// =============================================================================

use crate::types::Point;

/// Milliseconds in a 365-day year.
pub const YEAR_MS: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Compound annual growth rate between the first and last point, in percent.
///
/// Returns `None` for an empty series.
pub fn cagr(points: &[Point]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    let years = (last.x - first.x) as f64 / YEAR_MS;
    Some((pow(last.y / first.y, 1.0 / years) - 1.0) * 100.0)
}

/// `base ^ exp` where `(±1) ^ (±inf)` and `x ^ NaN` are NaN.
fn pow(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (exp.is_infinite() && base.abs() == 1.0) {
        return f64::NAN;
    }
    base.powf(exp)
}

/// The CAGR value repeated for every input point.
pub fn calculate_cagr(points: &[Point]) -> Vec<Option<f64>> {
    match cagr(points) {
        Some(rate) => vec![Some(rate); points.len()],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i64 = YEAR_MS as i64;

    #[test]
    fn cagr_empty_input() {
        assert!(cagr(&[]).is_none());
        assert!(calculate_cagr(&[]).is_empty());
    }

    #[test]
    fn cagr_doubling_over_one_year_is_100_pct() {
        let points = [Point { x: 0, y: 50.0 }, Point { x: YEAR, y: 100.0 }];
        assert!((cagr(&points).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cagr_is_annualised() {
        // 1.21x over two years => 10% a year.
        let points = [
            Point { x: 0, y: 100.0 },
            Point { x: YEAR, y: 300.0 },
            Point { x: 2 * YEAR, y: 121.0 },
        ];
        let rate = cagr(&points).unwrap();
        assert!((rate - 10.0).abs() < 1e-9, "got {rate}");
    }

    #[test]
    fn cagr_is_repeated_for_every_point() {
        let points = [
            Point { x: 0, y: 100.0 },
            Point { x: YEAR / 2, y: 90.0 },
            Point { x: YEAR, y: 110.0 },
        ];
        let series = calculate_cagr(&points);
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|v| *v == series[0]));
        assert!((series[0].unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cagr_zero_years_is_infinite() {
        let points = [Point { x: 5, y: 100.0 }, Point { x: 5, y: 120.0 }];
        assert_eq!(cagr(&points), Some(f64::INFINITY));
    }

    #[test]
    fn cagr_single_point_is_not_finite() {
        let rate = cagr(&[Point { x: 0, y: 100.0 }]).unwrap();
        assert!(rate.is_nan(), "got {rate}");

        let rate = cagr(&[Point { x: 5, y: 100.0 }, Point { x: 5, y: 100.0 }]).unwrap();
        assert!(rate.is_nan(), "got {rate}");

        let series = calculate_cagr(&[Point { x: 0, y: 42.0 }]);
        assert_eq!(series.len(), 1);
        assert!(!series[0].unwrap().is_finite());
    }

    #[test]
    fn cagr_flat_series_over_time_is_zero() {
        let points = [Point { x: 0, y: 100.0 }, Point { x: YEAR, y: 100.0 }];
        assert_eq!(cagr(&points), Some(0.0));
    }

    #[test]
    fn cagr_zero_first_value_is_not_guarded() {
        let points = [Point { x: 0, y: 0.0 }, Point { x: YEAR, y: 120.0 }];
        assert_eq!(cagr(&points), Some(f64::INFINITY));
    }
}
