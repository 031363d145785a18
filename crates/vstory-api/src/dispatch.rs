//! Background dispatch for the in-process modes.
//!
//! Inline and staged modes process an upload batch on a spawned task, one
//! video at a time in upload order, while the HTTP response has already
//! returned. Every transition goes through the job store; a failed video
//! never aborts its siblings.

use metrics::counter;
use tracing::{error, info, warn};

use vstory_gemini::VideoSource;
use vstory_models::{JobId, VideoId};
use vstory_storage::StorageClient;

use crate::config::DispatchMode;
use crate::state::AppState;

/// An accepted file waiting for background processing.
pub struct PendingVideo {
    pub id: VideoId,
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Spawn the sequential background task for one upload batch.
pub fn spawn_background(state: AppState, job_id: JobId, videos: Vec<PendingVideo>) {
    tokio::spawn(async move {
        for video in videos {
            if let Err(e) = process_one(&state, &job_id, video).await {
                // Store lookup failures only; the record-level outcome is
                // already written for everything else.
                error!("Dispatch error in job {}: {}", job_id, e);
            }
        }
        info!("Background dispatch finished for job {}", job_id);
    });
}

/// Drive one video through its lifecycle.
async fn process_one(
    state: &AppState,
    job_id: &JobId,
    video: PendingVideo,
) -> Result<(), vstory_store::StoreError> {
    let video_id = video.id.clone();

    let source = match state.config.dispatch_mode {
        DispatchMode::Staged => {
            state.store.mark_uploading(job_id, &video_id).await?;
            match stage_bytes(state, job_id, &video).await {
                Ok(url) => {
                    state
                        .store
                        .mark_processing(job_id, &video_id, Some(url.clone()))
                        .await?;
                    VideoSource::Uri(url)
                }
                Err(e) => {
                    warn!("Staging failed for video {}: {}", video_id, e);
                    state.store.fail_video(job_id, &video_id, e.to_string()).await?;
                    counter!("vstory_jobs_failed_total").increment(1);
                    return Ok(());
                }
            }
        }
        _ => {
            state.store.mark_processing(job_id, &video_id, None).await?;
            VideoSource::Inline(video.bytes)
        }
    };

    match state.gemini.generate_story(&source, &video.mime_type).await {
        Ok(story) => {
            state.store.complete_video(job_id, &video_id, story).await?;
            counter!("vstory_jobs_completed_total").increment(1);
            info!("Story generated for video {}", video_id);
        }
        Err(e) => {
            warn!("Generation failed for video {}: {}", video_id, e);
            state.store.fail_video(job_id, &video_id, e.to_string()).await?;
            counter!("vstory_jobs_failed_total").increment(1);
        }
    }

    Ok(())
}

/// Upload one video's bytes to object storage and presign a GET URL.
async fn stage_bytes(
    state: &AppState,
    job_id: &JobId,
    video: &PendingVideo,
) -> Result<String, vstory_storage::StorageError> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| vstory_storage::StorageError::config_error("Storage not configured"))?;

    let key = StorageClient::staging_key(job_id.as_str(), video.id.as_str(), &video.original_name);
    storage
        .upload_bytes(video.bytes.clone(), &key, &video.mime_type)
        .await?;
    storage.presigned_get_url(&key).await
}
