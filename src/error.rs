// =============================================================================
// Pipeline errors
// =============================================================================
//
// Two tiers:
//   - `PipelineError` aborts either one dataset (unknown display mode or study
//     name) or the whole batch (no datasets at all).
//   - `RejectReason` describes a single raw observation dropped by the
//     validator.  It is diagnostic only and never aborts anything.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Configuration errors raised by the series pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The orchestrator was called without any dataset descriptors.
    #[error("no datasets provided in configuration")]
    MissingDatasetList,

    /// A dataset requested a study the indicator engine does not implement.
    #[error("unknown indicator: {0:?}")]
    UnknownIndicator(String),

    /// A dataset requested a display mode the transformer does not implement.
    #[error("unknown display mode: {0:?}")]
    UnknownDisplayMode(String),
}

/// Why the validator dropped a raw observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    MissingDate,
    UnparsableDate(String),
    MissingValue,
    NonNumericValue(String),
    NonFiniteValue(f64),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "missing date"),
            Self::UnparsableDate(raw) => write!(f, "unparsable date {raw:?}"),
            Self::MissingValue => write!(f, "missing value"),
            Self::NonNumericValue(raw) => write!(f, "non-numeric value {raw:?}"),
            Self::NonFiniteValue(v) => write!(f, "non-finite value {v}"),
        }
    }
}
