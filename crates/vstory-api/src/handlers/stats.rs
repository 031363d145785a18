//! Operational counters.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

/// Stats response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_jobs: usize,
    pub dispatch_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<u64>,
}

/// `GET /api/stats` — job count plus queue depth where applicable.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let total_jobs = state.store.job_count().await;

    let queue_depth = match &state.queue {
        Some(queue) => {
            let depth = queue.len().await?;
            metrics::set_queue_length(depth);
            Some(depth)
        }
        None => None,
    };

    Ok(Json(StatsResponse {
        total_jobs,
        dispatch_mode: state.config.dispatch_mode.to_string(),
        queue_depth,
    }))
}
