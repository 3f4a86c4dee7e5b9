// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Renderer adapters running in the
// browser call the series endpoint directly, so CORS is permissive.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::pipeline::PipelineOutput;
use crate::types::{DatasetConfig, DisplaySettings, RawPoint};

// =============================================================================
// Router construction
// =============================================================================

/// Body bytes allowed per raw point when sizing the request body limit.
const MAX_BYTES_PER_POINT: usize = 256;

/// Fixed allowance for dataset configs and display settings.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the REST API router with CORS middleware and shared state.
///
/// The body limit scales with `max_request_points`, so the point count check
/// in the series handler is the one that rejects large requests.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state
        .max_request_points()
        .saturating_mul(MAX_BYTES_PER_POINT)
        .saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/series", post(series))
        .route("/api/v1/stats", get(stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Series
// =============================================================================

/// A render request from the chart-config layer.
#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    #[serde(default, alias = "rawData")]
    pub raw_points: Vec<RawPoint>,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(default, alias = "displaySettings")]
    pub display_settings: DisplaySettings,
}

#[derive(Serialize)]
struct SeriesResponse {
    request_id: String,
    #[serde(flatten)]
    output: PipelineOutput,
}

fn error_response(status: StatusCode, request_id: &str, message: String) -> Response {
    let body = serde_json::json!({ "request_id": request_id, "error": message });
    (status, Json(body)).into_response()
}

async fn series(State(state): State<Arc<AppState>>, Json(req): Json<SeriesRequest>) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let limit = state.max_request_points();
    if req.raw_points.len() > limit {
        let msg = format!(
            "request carries {} raw points, limit is {limit}",
            req.raw_points.len()
        );
        warn!(request_id = %request_id, "{msg}");
        state.record_failure(msg.clone(), Some(request_id.clone()));
        return error_response(StatusCode::PAYLOAD_TOO_LARGE, &request_id, msg);
    }

    // CPU-bound; keep it off the async workers.
    let pipeline = state.pipeline();
    let result = tokio::task::spawn_blocking(move || {
        pipeline.run(&req.raw_points, &req.datasets, &req.display_settings)
    })
    .await;

    match result {
        Ok(Ok(output)) => {
            state.record_output(&output);
            info!(
                request_id = %request_id,
                series = output.series.len(),
                accepted = output.accepted_points(),
                rejected = output.rejected_points(),
                failed_datasets = output.failed_datasets(),
                "series request served"
            );
            Json(SeriesResponse { request_id, output }).into_response()
        }
        Ok(Err(e)) => {
            warn!(request_id = %request_id, error = %e, "series request rejected");
            state.record_failure(e.to_string(), Some(request_id.clone()));
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &request_id, e.to_string())
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "series pipeline task failed");
            state.record_failure(e.to_string(), Some(request_id.clone()));
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &request_id,
                "pipeline task failed".to_string(),
            )
        }
    }
}

// =============================================================================
// Stats
// =============================================================================

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.stats())
}
