//! Job and video polling endpoints.

use axum::extract::{Path, State};
use axum::Json;

use vstory_models::{JobId, JobRecord, VideoId, VideoRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/job/:job_id` — full job record.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    let job_id = JobId::from_string(job_id);
    state
        .store
        .get_job(&job_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Job not found: {job_id}")))
}

/// `GET /api/job/:job_id/video/:video_id` — one video record.
pub async fn get_video(
    State(state): State<AppState>,
    Path((job_id, video_id)): Path<(String, String)>,
) -> ApiResult<Json<VideoRecord>> {
    let job_id = JobId::from_string(job_id);
    let video_id = VideoId::from_string(video_id);
    state
        .store
        .get_video(&job_id, &video_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Video not found: {video_id}")))
}
