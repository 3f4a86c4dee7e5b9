// =============================================================================
// Shared types used across the series pipeline
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// =============================================================================
// Raw input
// =============================================================================

/// Date field of a raw observation as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Epoch milliseconds.
    Millis(f64),
    Text(String),
    /// Anything else (bool, object, array); always rejected.
    Other(serde_json::Value),
}

/// Value field of a raw observation as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// A single untrusted observation from the raw point pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default, alias = "datasetId")]
    pub dataset_id: String,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default)]
    pub value: Option<RawValue>,
}

impl RawPoint {
    pub fn new(dataset_id: impl Into<String>, date: &str, value: f64) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            date: Some(RawDate::Text(date.to_string())),
            value: Some(RawValue::Number(value)),
        }
    }
}

// =============================================================================
// Points
// =============================================================================

/// A validated observation: epoch-millis timestamp and a finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: f64,
}

/// A point of an emitted series.  `y` is `None` during an indicator's
/// warm-up window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: i64,
    pub y: Option<f64>,
}

impl From<Point> for SeriesPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: Some(p.y) }
    }
}

// =============================================================================
// Display modes
// =============================================================================

/// Whole-series rescaling applied before any study is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayMode {
    None,
    #[serde(rename = "ROC")]
    Roc,
    GrowthOf100,
    Scale0To100,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Roc => write!(f, "ROC"),
            Self::GrowthOf100 => write!(f, "GrowthOf100"),
            Self::Scale0To100 => write!(f, "Scale0To100"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = PipelineError;

    /// Accepts the canonical names as well as the labels the chart-config
    /// layer sends (`"normal"`, `"Growth of $100"`, `"0-100 Scale"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "normal" => Ok(Self::None),
            "roc" => Ok(Self::Roc),
            "growthof100" | "growth of $100" => Ok(Self::GrowthOf100),
            "scale0to100" | "0-100 scale" => Ok(Self::Scale0To100),
            _ => Err(PipelineError::UnknownDisplayMode(s.to_string())),
        }
    }
}

// =============================================================================
// Studies
// =============================================================================

/// A technical indicator requested for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Study {
    Sma,
    Ema,
    Cagr,
    Rsi,
}

impl std::fmt::Display for Study {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma => write!(f, "SMA"),
            Self::Ema => write!(f, "EMA"),
            Self::Cagr => write!(f, "CAGR"),
            Self::Rsi => write!(f, "RSI"),
        }
    }
}

impl FromStr for Study {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(Self::Sma),
            "EMA" => Ok(Self::Ema),
            "CAGR" => Ok(Self::Cagr),
            "RSI" => Ok(Self::Rsi),
            _ => Err(PipelineError::UnknownIndicator(s.to_string())),
        }
    }
}

// =============================================================================
// Dataset descriptors
// =============================================================================

/// Dataset descriptor as sent by the chart-config layer.  Mode and study
/// names are kept as strings so that a bad name fails only its own dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "displayMode")]
    pub display_mode: Option<String>,
    #[serde(default)]
    pub studies: Vec<String>,
    #[serde(default, alias = "lineWidth", alias = "width")]
    pub line_width: Option<f64>,
}

impl DatasetConfig {
    /// Resolve mode and study names into their closed enums.
    pub fn resolve(&self) -> Result<DatasetDescriptor, PipelineError> {
        let display_mode = match &self.display_mode {
            Some(raw) => raw.parse::<DisplayMode>()?,
            None => DisplayMode::None,
        };
        let studies = self
            .studies
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Study>, _>>()?;

        Ok(DatasetDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            display_mode,
            studies,
            line_width: self.line_width,
        })
    }
}

/// A dataset descriptor with every name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub display_mode: DisplayMode,
    /// Declaration order is preserved in the output.
    pub studies: Vec<Study>,
    pub line_width: Option<f64>,
}

/// Global display options shared by every dataset of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default, alias = "isLogarithmic")]
    pub is_logarithmic: bool,
}

// =============================================================================
// Output
// =============================================================================

/// One line handed to the rendering layer: a dataset's main line or one of
/// its studies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub dataset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    pub display_mode: DisplayMode,
    /// `None` for the main line.
    pub study: Option<Study>,
    pub data: Vec<SeriesPoint>,
}

impl Series {
    /// Earliest and latest timestamp of the series, `None` when empty.
    pub fn date_range(&self) -> Option<(i64, i64)> {
        let min = self.data.iter().map(|p| p.x).min()?;
        let max = self.data.iter().map(|p| p.x).max()?;
        Some((min, max))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mode_accepts_legacy_labels() {
        assert_eq!("normal".parse::<DisplayMode>().unwrap(), DisplayMode::None);
        assert_eq!("ROC".parse::<DisplayMode>().unwrap(), DisplayMode::Roc);
        assert_eq!(
            "Growth of $100".parse::<DisplayMode>().unwrap(),
            DisplayMode::GrowthOf100
        );
        assert_eq!(
            "0-100 Scale".parse::<DisplayMode>().unwrap(),
            DisplayMode::Scale0To100
        );
        assert_eq!(
            "scale0To100".parse::<DisplayMode>().unwrap(),
            DisplayMode::Scale0To100
        );
    }

    #[test]
    fn display_mode_rejects_unknown_names() {
        let err = "log returns".parse::<DisplayMode>().unwrap_err();
        assert_eq!(err, PipelineError::UnknownDisplayMode("log returns".into()));
    }

    #[test]
    fn study_parse_is_case_insensitive() {
        assert_eq!("sma".parse::<Study>().unwrap(), Study::Sma);
        assert_eq!("Rsi".parse::<Study>().unwrap(), Study::Rsi);
        assert_eq!(
            "MACD".parse::<Study>().unwrap_err(),
            PipelineError::UnknownIndicator("MACD".into())
        );
    }

    #[test]
    fn dataset_config_resolves_in_declaration_order() {
        let cfg = DatasetConfig {
            id: "gdp".into(),
            name: "GDP".into(),
            display_mode: Some("ROC".into()),
            studies: vec!["RSI".into(), "SMA".into()],
            ..Default::default()
        };
        let desc = cfg.resolve().unwrap();
        assert_eq!(desc.display_mode, DisplayMode::Roc);
        assert_eq!(desc.studies, vec![Study::Rsi, Study::Sma]);
    }

    #[test]
    fn dataset_config_missing_mode_defaults_to_none() {
        let cfg: DatasetConfig = serde_json::from_str(r#"{ "id": "cpi" }"#).unwrap();
        assert_eq!(cfg.resolve().unwrap().display_mode, DisplayMode::None);
    }

    #[test]
    fn dataset_config_accepts_camel_case_aliases() {
        let json = r#"{ "id": "a", "name": "A", "displayMode": "Growth of $100", "lineWidth": 3 }"#;
        let cfg: DatasetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.display_mode.as_deref(), Some("Growth of $100"));
        assert_eq!(cfg.line_width, Some(3.0));
    }

    #[test]
    fn raw_point_tolerates_odd_field_types() {
        let json = r#"[
            { "dataset_id": "a", "date": "2020-01-01", "value": "12.5" },
            { "dataset_id": "a", "date": 1577836800000, "value": 3 },
            { "dataset_id": "a", "date": true, "value": null },
            { "dataset_id": "a" }
        ]"#;
        let points: Vec<RawPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0].value, Some(RawValue::Text("12.5".into())));
        assert_eq!(points[1].date, Some(RawDate::Millis(1_577_836_800_000.0)));
        assert!(matches!(points[2].date, Some(RawDate::Other(_))));
        assert_eq!(points[2].value, None);
        assert_eq!(points[3].date, None);
    }

    #[test]
    fn series_date_range() {
        let series = Series {
            name: "x".into(),
            dataset_id: "x".into(),
            color: None,
            line_width: None,
            display_mode: DisplayMode::None,
            study: None,
            data: vec![
                SeriesPoint { x: 30, y: Some(1.0) },
                SeriesPoint { x: 10, y: None },
                SeriesPoint { x: 20, y: Some(2.0) },
            ],
        };
        assert_eq!(series.date_range(), Some((10, 30)));

        let empty = Series { data: Vec::new(), ..series };
        assert_eq!(empty.date_range(), None);
        assert!(empty.is_empty());
    }
}
