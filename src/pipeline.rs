// =============================================================================
// Series Pipeline Orchestrator
// =============================================================================
//
// Per dataset descriptor, in input order:
//
//   raw pool ──filter by id──► validate ──► display mode ──► base series
//                                                              │
//                                       ┌──────────────────────┤
//                                       ▼                      ▼
//                                 main series        one series per study
//                                       │                      │
//                                       └──── log-scale filter ┘
//
// Studies always run on the display-mode-transformed base series and never
// on each other's output.  The log-scale filter is the last step, so studies
// are computed from the unfiltered base.
//
// A bad display mode or study name aborts only its own dataset; the error
// lands in that dataset's report and the batch continues.
// =============================================================================

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::indicators::{self, StudyPeriods};
use crate::transform;
use crate::types::{
    DatasetConfig, DatasetDescriptor, DisplaySettings, Point, RawPoint, Series, SeriesPoint,
};
use crate::validate::{self, RejectedPoint};

/// Per-dataset diagnostics: how many raw points survived validation, which
/// ones were dropped and why, and whether the dataset was aborted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub dataset_id: String,
    pub accepted: usize,
    pub rejected: Vec<RejectedPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything produced for one render request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Main series first, then its studies, then the next dataset's series.
    pub series: Vec<Series>,
    /// One report per input descriptor, in input order.
    pub datasets: Vec<DatasetReport>,
}

impl PipelineOutput {
    pub fn accepted_points(&self) -> usize {
        self.datasets.iter().map(|d| d.accepted).sum()
    }

    pub fn rejected_points(&self) -> usize {
        self.datasets.iter().map(|d| d.rejected.len()).sum()
    }

    pub fn failed_datasets(&self) -> usize {
        self.datasets.iter().filter(|d| d.error.is_some()).count()
    }
}

/// The series pipeline, parameterised by the study look-back periods.
#[derive(Debug, Clone, Default)]
pub struct SeriesPipeline {
    periods: StudyPeriods,
}

impl SeriesPipeline {
    pub fn new(periods: StudyPeriods) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &StudyPeriods {
        &self.periods
    }

    /// Run every dataset through the pipeline.
    ///
    /// Fails only when `datasets` is empty.
    pub fn run(
        &self,
        raw_points: &[RawPoint],
        datasets: &[DatasetConfig],
        settings: &DisplaySettings,
    ) -> Result<PipelineOutput, PipelineError> {
        if datasets.is_empty() {
            return Err(PipelineError::MissingDatasetList);
        }

        let mut output = PipelineOutput::default();

        for config in datasets {
            let raw = raw_points.iter().filter(|p| p.dataset_id == config.id);
            let normalized = validate::normalize(&config.id, raw);

            let mut report = DatasetReport {
                dataset_id: config.id.clone(),
                accepted: normalized.points.len(),
                rejected: normalized.rejected,
                error: None,
            };

            match config.resolve() {
                Ok(descriptor) => {
                    let series = self.process(&descriptor, &normalized.points, settings);
                    debug!(
                        dataset = %descriptor.id,
                        accepted = report.accepted,
                        rejected = report.rejected.len(),
                        series = series.len(),
                        "dataset processed"
                    );
                    output.series.extend(series);
                }
                Err(e) => {
                    warn!(dataset = %config.id, error = %e, "dataset aborted");
                    report.error = Some(e.to_string());
                }
            }

            output.datasets.push(report);
        }

        Ok(output)
    }

    /// Build the main series and one series per study for a single resolved
    /// dataset whose points are already validated and sorted.
    pub fn process(
        &self,
        descriptor: &DatasetDescriptor,
        points: &[Point],
        settings: &DisplaySettings,
    ) -> Vec<Series> {
        let base = transform::apply(descriptor.display_mode, points);

        let mut out = Vec::with_capacity(1 + descriptor.studies.len());
        out.push(Series {
            name: descriptor.name.clone(),
            dataset_id: descriptor.id.clone(),
            color: descriptor.color.clone(),
            line_width: descriptor.line_width,
            display_mode: descriptor.display_mode,
            study: None,
            data: base.iter().copied().map(SeriesPoint::from).collect(),
        });

        for &study in &descriptor.studies {
            out.push(Series {
                name: format!("{} - {}", descriptor.name, study),
                dataset_id: descriptor.id.clone(),
                color: descriptor.color.clone(),
                line_width: descriptor.line_width,
                display_mode: descriptor.display_mode,
                study: Some(study),
                data: indicators::compute(study, &base, &self.periods),
            });
        }

        if settings.is_logarithmic {
            for series in &mut out {
                retain_log_scale(&mut series.data);
            }
        }

        out
    }
}

/// Run with the default study periods.
pub fn run(
    raw_points: &[RawPoint],
    datasets: &[DatasetConfig],
    settings: &DisplaySettings,
) -> Result<PipelineOutput, PipelineError> {
    SeriesPipeline::default().run(raw_points, datasets, settings)
}

/// Keep only points a logarithmic axis can plot: strictly positive values.
/// Missing and NaN values are dropped as well.
pub fn retain_log_scale(data: &mut Vec<SeriesPoint>) {
    data.retain(|p| matches!(p.y, Some(y) if y > 0.0));
}
