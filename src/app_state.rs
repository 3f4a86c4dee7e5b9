// =============================================================================
// Central Application State: Series Service
// =============================================================================
//
// Shared across all request handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counters for lock-free request statistics.
//   - parking_lot::RwLock for the runtime config and the error ring.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::pipeline::{PipelineOutput, SeriesPipeline};
use crate::runtime_config::RuntimeConfig;

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// A recorded error event, exposed on the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// Request the error belongs to, when known.
    pub request_id: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Counters exposed on `GET /api/v1/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub requests_served: u64,
    pub requests_failed: u64,
    pub points_accepted: u64,
    pub points_rejected: u64,
    pub datasets_failed: u64,
    pub uptime_secs: u64,
    pub recent_errors: Vec<ErrorRecord>,
}

pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Statistics ──────────────────────────────────────────────────────
    requests_served: AtomicU64,
    requests_failed: AtomicU64,
    points_accepted: AtomicU64,
    points_rejected: AtomicU64,
    datasets_failed: AtomicU64,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            requests_served: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            points_accepted: AtomicU64::new(0),
            points_rejected: AtomicU64::new(0),
            datasets_failed: AtomicU64::new(0),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    /// A pipeline configured from the current runtime config.
    pub fn pipeline(&self) -> SeriesPipeline {
        SeriesPipeline::new(self.runtime_config.read().study_periods)
    }

    pub fn max_request_points(&self) -> usize {
        self.runtime_config.read().max_request_points
    }

    // ── Statistics ──────────────────────────────────────────────────────

    /// Fold one successful pipeline run into the counters.
    pub fn record_output(&self, output: &PipelineOutput) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.points_accepted
            .fetch_add(output.accepted_points() as u64, Ordering::Relaxed);
        self.points_rejected
            .fetch_add(output.rejected_points() as u64, Ordering::Relaxed);
        self.datasets_failed
            .fetch_add(output.failed_datasets() as u64, Ordering::Relaxed);
    }

    /// Count a request that produced no output and log why.
    pub fn record_failure(&self, msg: String, request_id: Option<String>) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        self.push_error(msg, request_id);
    }

    /// Record an error message.  The ring is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted first.
    pub fn push_error(&self, msg: String, request_id: Option<String>) {
        let mut errors = self.recent_errors.write();
        if errors.len() >= MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        errors.push(ErrorRecord {
            message: msg,
            request_id,
            at: Utc::now().to_rfc3339(),
        });
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            points_accepted: self.points_accepted.load(Ordering::Relaxed),
            points_rejected: self.points_rejected.load(Ordering::Relaxed),
            datasets_failed: self.datasets_failed.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}
