// =============================================================================
// Series Pipeline: renderer-agnostic chart data preparation
// =============================================================================
//
// raw observations → validated points → display-mode transform → studies
//
// The output `Series` list is what every chart-library adapter consumes; the
// adapters themselves live outside this crate.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod runtime_config;
pub mod transform;
pub mod types;
pub mod validate;

pub use error::{PipelineError, RejectReason};
pub use indicators::StudyPeriods;
pub use pipeline::{run, DatasetReport, PipelineOutput, SeriesPipeline};
pub use types::{
    DatasetConfig, DatasetDescriptor, DisplayMode, DisplaySettings, Point, RawPoint, Series,
    SeriesPoint, Study,
};
