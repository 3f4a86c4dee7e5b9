// =============================================================================
// Point Validator / Normalizer
// =============================================================================
//
// Turns untrusted raw observations into a clean `(timestamp, value)` series:
//
//   1. Reject points with a missing or unparsable date.
//   2. Reject points with a missing, non-numeric or non-finite value.
//   3. Map survivors to `Point { x: epoch millis, y }`.
//   4. Stable-sort ascending by `x` (ties keep input order).
//
// A rejected point is logged and recorded, never fatal.  An empty result is a
// valid zero-length series.
// =============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use crate::error::RejectReason;
use crate::types::{Point, RawDate, RawPoint, RawValue};

/// Date-time layouts without an offset, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, interpreted as UTC midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A raw point the validator dropped, identified by its position in the
/// dataset's slice of the raw pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedPoint {
    pub index: usize,
    pub reason: RejectReason,
}

/// Result of normalising one dataset's raw points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub points: Vec<Point>,
    pub rejected: Vec<RejectedPoint>,
}

/// Validate, convert and sort the raw points of a single dataset.
///
/// The caller is expected to have filtered the pool by dataset id already;
/// `dataset_id` is only used for log context.
pub fn normalize<'a, I>(dataset_id: &str, raw: I) -> Normalized
where
    I: IntoIterator<Item = &'a RawPoint>,
{
    let mut out = Normalized::default();

    for (index, point) in raw.into_iter().enumerate() {
        match validate_point(point) {
            Ok(p) => out.points.push(p),
            Err(reason) => {
                warn!(dataset = %dataset_id, index, %reason, "filtering out invalid data point");
                out.rejected.push(RejectedPoint { index, reason });
            }
        }
    }

    // `sort_by_key` is stable, so equal timestamps keep input order.
    out.points.sort_by_key(|p| p.x);
    out
}

/// Validate a single raw observation.
pub fn validate_point(raw: &RawPoint) -> Result<Point, RejectReason> {
    let x = match &raw.date {
        None => return Err(RejectReason::MissingDate),
        Some(date) => parse_date(date)?,
    };
    let y = match &raw.value {
        None => return Err(RejectReason::MissingValue),
        Some(value) => parse_value(value)?,
    };
    Ok(Point { x, y })
}

/// Convert a raw date to epoch milliseconds.
pub fn parse_date(date: &RawDate) -> Result<i64, RejectReason> {
    match date {
        RawDate::Millis(ms) => {
            if ms.is_finite() {
                Ok(ms.trunc() as i64)
            } else {
                Err(RejectReason::UnparsableDate(ms.to_string()))
            }
        }
        RawDate::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(RejectReason::MissingDate);
            }
            parse_date_str(text).ok_or_else(|| RejectReason::UnparsableDate(text.to_string()))
        }
        RawDate::Other(v) => Err(RejectReason::UnparsableDate(v.to_string())),
    }
}

fn parse_date_str(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
    }
    None
}

/// Convert a raw value to a finite float.
pub fn parse_value(value: &RawValue) -> Result<f64, RejectReason> {
    let v = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(RejectReason::MissingValue);
            }
            text.parse::<f64>()
                .map_err(|_| RejectReason::NonNumericValue(text.to_string()))?
        }
        RawValue::Other(v) => return Err(RejectReason::NonNumericValue(v.to_string())),
    };

    if v.is_finite() {
        Ok(v)
    } else {
        Err(RejectReason::NonFiniteValue(v))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    const JAN_1_2020: i64 = 1_577_836_800_000;

    fn raw(date: Option<RawDate>, value: Option<RawValue>) -> RawPoint {
        RawPoint {
            dataset_id: "a".into(),
            date,
            value,
        }
    }

    fn text_date(s: &str) -> Option<RawDate> {
        Some(RawDate::Text(s.into()))
    }

    // ---- parse_date ------------------------------------------------------

    #[test]
    fn date_only_is_utc_midnight() {
        assert_eq!(parse_date(&RawDate::Text("2020-01-01".into())), Ok(JAN_1_2020));
        assert_eq!(parse_date(&RawDate::Text("2020/01/02".into())), Ok(JAN_1_2020 + DAY_MS));
    }

    #[test]
    fn rfc3339_respects_offset() {
        let ms = parse_date(&RawDate::Text("2020-01-01T02:00:00+02:00".into())).unwrap();
        assert_eq!(ms, JAN_1_2020);
    }

    #[test]
    fn naive_datetime_is_utc() {
        let ms = parse_date(&RawDate::Text("2020-01-01 00:00:01".into())).unwrap();
        assert_eq!(ms, JAN_1_2020 + 1_000);
        let ms = parse_date(&RawDate::Text("2020-01-01T00:00:00.250".into())).unwrap();
        assert_eq!(ms, JAN_1_2020 + 250);
    }

    #[test]
    fn numeric_date_is_epoch_millis() {
        assert_eq!(parse_date(&RawDate::Millis(JAN_1_2020 as f64)), Ok(JAN_1_2020));
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert_eq!(
            parse_date(&RawDate::Text("not a date".into())),
            Err(RejectReason::UnparsableDate("not a date".into()))
        );
        assert_eq!(
            parse_date(&RawDate::Text("2020-13-45".into())),
            Err(RejectReason::UnparsableDate("2020-13-45".into()))
        );
        assert_eq!(parse_date(&RawDate::Text("  ".into())), Err(RejectReason::MissingDate));
        assert!(parse_date(&RawDate::Other(serde_json::json!(true))).is_err());
    }

    // ---- parse_value -----------------------------------------------------

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(parse_value(&RawValue::Text(" 12.5 ".into())), Ok(12.5));
        assert_eq!(parse_value(&RawValue::Text("-3e2".into())), Ok(-300.0));
        assert_eq!(parse_value(&RawValue::Number(0.0)), Ok(0.0));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert_eq!(
            parse_value(&RawValue::Text("12abc".into())),
            Err(RejectReason::NonNumericValue("12abc".into()))
        );
        assert_eq!(parse_value(&RawValue::Text("".into())), Err(RejectReason::MissingValue));
        assert!(matches!(
            parse_value(&RawValue::Text("NaN".into())),
            Err(RejectReason::NonFiniteValue(_))
        ));
        assert!(matches!(
            parse_value(&RawValue::Text("inf".into())),
            Err(RejectReason::NonFiniteValue(_))
        ));
        assert!(parse_value(&RawValue::Other(serde_json::json!({ "v": 1 }))).is_err());
    }

    // ---- normalize -------------------------------------------------------

    #[test]
    fn normalize_sorts_and_drops_invalid() {
        let input = vec![
            RawPoint::new("a", "2020-01-03", 3.0),
            raw(None, Some(RawValue::Number(9.0))),
            RawPoint::new("a", "2020-01-01", 1.0),
            raw(text_date("2020-01-02"), Some(RawValue::Text("x".into()))),
            RawPoint::new("a", "2020-01-02", 2.0),
            raw(text_date("2020-01-04"), None),
        ];
        let out = normalize("a", &input);

        let ys: Vec<f64> = out.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 2.0, 3.0]);
        assert!(out.points.windows(2).all(|w| w[0].x <= w[1].x));

        let rejected: Vec<usize> = out.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![1, 3, 5]);
        assert_eq!(out.rejected[0].reason, RejectReason::MissingDate);
        assert_eq!(out.rejected[2].reason, RejectReason::MissingValue);
    }

    #[test]
    fn normalize_ties_keep_input_order() {
        let input = vec![
            RawPoint::new("a", "2020-01-01", 5.0),
            RawPoint::new("a", "2020-01-01", 6.0),
            RawPoint::new("a", "2019-12-31", 4.0),
        ];
        let out = normalize("a", &input);
        let ys: Vec<f64> = out.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn normalize_empty_input_is_empty_series() {
        let input: Vec<RawPoint> = Vec::new();
        let out = normalize("a", &input);
        assert!(out.points.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn normalize_never_emits_nan() {
        let input = vec![
            raw(text_date("2020-01-01"), Some(RawValue::Number(f64::NAN))),
            raw(text_date("2020-01-02"), Some(RawValue::Number(f64::INFINITY))),
            RawPoint::new("a", "2020-01-03", 7.0),
        ];
        let out = normalize("a", &input);
        assert_eq!(out.points.len(), 1);
        assert!(out.points.iter().all(|p| p.y.is_finite()));
    }
}
