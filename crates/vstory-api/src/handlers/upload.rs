//! Upload endpoint.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use vstory_models::{is_allowed_mime, JobRecord, VideoRecord, VideoStatus};
use vstory_queue::GenerateStoryJob;
use vstory_storage::StorageClient;

use crate::config::{DispatchMode, MAX_VIDEOS_PER_UPLOAD};
use crate::dispatch::{spawn_background, PendingVideo};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Response body for an accepted upload batch.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: String,
    pub message: String,
    pub videos: Vec<UploadedVideo>,
}

/// Per-file acknowledgement in the upload response.
#[derive(Serialize)]
pub struct UploadedVideo {
    pub id: String,
    pub name: String,
    pub status: VideoStatus,
}

/// `POST /api/upload` — accept 1-10 video files and start processing.
///
/// Validation happens synchronously: a batch with no files, too many files,
/// a disallowed mime type, or an oversized file is rejected with 400 and no
/// job is created. The response returns immediately with every video still
/// `pending`; clients poll the job endpoint for progress.
pub async fn upload_videos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut accepted: Vec<(VideoRecord, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("videos") {
            continue;
        }

        if accepted.len() == MAX_VIDEOS_PER_UPLOAD {
            return Err(ApiError::bad_request(format!(
                "Too many files: at most {MAX_VIDEOS_PER_UPLOAD} videos per upload"
            )));
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload.bin".to_string());
        // The declared content type decides acceptance, never the extension.
        let mime_type = field.content_type().unwrap_or_default().to_string();

        if !is_allowed_mime(&mime_type) {
            return Err(ApiError::bad_request(format!(
                "Invalid file type: {}",
                if mime_type.is_empty() { "unknown" } else { mime_type.as_str() }
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file {original_name}: {e}")))?;

        if bytes.len() > state.config.max_file_size {
            return Err(ApiError::bad_request(format!(
                "File too large: {} exceeds the {} byte limit",
                original_name, state.config.max_file_size
            )));
        }

        accepted.push((VideoRecord::new(original_name, mime_type), bytes.to_vec()));
    }

    if accepted.is_empty() {
        return Err(ApiError::bad_request("No video files uploaded"));
    }

    let count = accepted.len();
    let total_bytes: usize = accepted.iter().map(|(_, b)| b.len()).sum();
    metrics::record_videos_uploaded(count as u64, total_bytes as u64);

    let response = match state.config.dispatch_mode {
        DispatchMode::Queued => dispatch_queued(&state, accepted).await?,
        _ => dispatch_in_process(&state, accepted).await,
    };

    info!(
        "Accepted upload batch {} with {} video(s) ({} mode)",
        response.job_id, count, state.config.dispatch_mode
    );

    Ok((StatusCode::OK, Json(response)))
}

/// Inline and staged modes: create the job, hand the bytes to a background
/// task, respond immediately.
async fn dispatch_in_process(
    state: &AppState,
    accepted: Vec<(VideoRecord, Vec<u8>)>,
) -> UploadResponse {
    let mut records = Vec::with_capacity(accepted.len());
    let mut pending = Vec::with_capacity(accepted.len());
    for (record, bytes) in accepted {
        pending.push(PendingVideo {
            id: record.id.clone(),
            original_name: record.original_name.clone(),
            mime_type: record.mime_type.clone(),
            bytes,
        });
        records.push(record);
    }

    let job = state.store.create_job(records).await;
    spawn_background(state.clone(), job.id.clone(), pending);

    upload_response(&job)
}

/// Queued mode: stage every file, then make the job visible, then enqueue
/// one generation task per video.
///
/// Staging runs before the job is stored so a storage outage surfaces as a
/// 500 with no half-created job, and so workers can never pull a task whose
/// job is not yet visible in the store.
async fn dispatch_queued(
    state: &AppState,
    accepted: Vec<(VideoRecord, Vec<u8>)>,
) -> ApiResult<UploadResponse> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| ApiError::internal("Storage not configured"))?;
    let queue = state
        .queue
        .as_ref()
        .ok_or_else(|| ApiError::internal("Queue not configured"))?;

    let (records, payloads): (Vec<_>, Vec<_>) = accepted.into_iter().unzip();
    let mut job = JobRecord::new(records);

    let mut tasks = Vec::with_capacity(job.videos.len());
    for (video, bytes) in job.videos.iter_mut().zip(payloads) {
        let key =
            StorageClient::staging_key(job.id.as_str(), video.id.as_str(), &video.original_name);
        storage.upload_bytes(bytes, &key, &video.mime_type).await?;
        let url = storage.presigned_get_url(&key).await?;
        video.staged_uri = Some(url.clone());
        tasks.push(GenerateStoryJob::new(
            job.id.clone(),
            video.id.clone(),
            url,
            video.mime_type.clone(),
        ));
    }

    let response = upload_response(&job);
    state.store.insert_job(job).await;

    for task in &tasks {
        queue.enqueue(task).await?;
        metrics::record_job_enqueued();
    }

    Ok(response)
}

fn upload_response(job: &JobRecord) -> UploadResponse {
    UploadResponse {
        job_id: job.id.to_string(),
        message: format!("{} video(s) queued for processing", job.videos.len()),
        videos: job
            .videos
            .iter()
            .map(|v| UploadedVideo {
                id: v.id.to_string(),
                name: v.original_name.clone(),
                status: v.status,
            })
            .collect(),
    }
}
