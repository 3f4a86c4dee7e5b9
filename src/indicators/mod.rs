// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator implementations.  Every calculation
// returns one entry per input point; `None` marks the warm-up window.
// Degenerate arithmetic (zero divisors) is propagated as IEEE-754 values and
// never clamped.
//
// Dispatch is a closed match over `Study`, so adding a study is a compile
// error until it is wired in here.

pub mod cagr;
pub mod ema;
pub mod rsi;
pub mod sma;

use serde::{Deserialize, Serialize};

use crate::types::{Point, SeriesPoint, Study};

fn default_sma_period() -> usize {
    20
}

fn default_ema_period() -> usize {
    20
}

fn default_rsi_period() -> usize {
    14
}

/// Look-back periods for the windowed studies.  CAGR has no period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPeriods {
    #[serde(default = "default_sma_period")]
    pub sma: usize,
    #[serde(default = "default_ema_period")]
    pub ema: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi: usize,
}

impl Default for StudyPeriods {
    fn default() -> Self {
        Self {
            sma: default_sma_period(),
            ema: default_ema_period(),
            rsi: default_rsi_period(),
        }
    }
}

/// Compute `study` over `points`, keeping each point's timestamp.
pub fn compute(study: Study, points: &[Point], periods: &StudyPeriods) -> Vec<SeriesPoint> {
    let values: Vec<f64> = points.iter().map(|p| p.y).collect();
    let ys = match study {
        Study::Sma => sma::calculate_sma(&values, periods.sma),
        Study::Ema => ema::calculate_ema(&values, periods.ema),
        Study::Cagr => cagr::calculate_cagr(points),
        Study::Rsi => rsi::calculate_rsi(&values, periods.rsi),
    };

    points
        .iter()
        .zip(ys)
        .map(|(p, y)| SeriesPoint { x: p.x, y })
        .collect()
}
