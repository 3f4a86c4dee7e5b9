// =============================================================================
// Runtime Configuration: service settings loaded from JSON
// =============================================================================
//
// Every field carries `#[serde(default)]` so that adding new fields never
// breaks loading an older config file.  A missing file is not fatal: the
// service falls back to defaults with a warning.  A file that exists but does
// not parse or validate is a startup error.
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::StudyPeriods;

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_max_request_points() -> usize {
    1_000_000
}

/// Top-level runtime configuration for the series service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Look-back periods for SMA / EMA / RSI.
    #[serde(default)]
    pub study_periods: StudyPeriods,

    /// Upper bound on raw points accepted in a single request.
    #[serde(default = "default_max_request_points")]
    pub max_request_points: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            study_periods: StudyPeriods::default(),
            max_request_points: default_max_request_points(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            periods = ?config.study_periods,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Like [`RuntimeConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "runtime config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let p = &self.study_periods;
        if p.sma == 0 || p.ema == 0 || p.rsi == 0 {
            bail!("study periods must be positive, got {p:?}");
        }
        if self.max_request_points == 0 {
            bail!("max_request_points must be positive");
        }
        Ok(())
    }
}
