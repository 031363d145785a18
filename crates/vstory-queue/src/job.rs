//! Queued job payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vstory_models::{JobId, VideoId};

/// One per-video generation task.
///
/// The payload carries only a lookup key into the job store plus the staged
/// object reference; the worker mutates the corresponding video record in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateStoryJob {
    /// Owning job ID
    pub job_id: JobId,
    /// Video record to process
    pub video_id: VideoId,
    /// Staged bytes reference (fetchable URL)
    pub staged_uri: String,
    /// Declared mime type
    pub mime_type: String,
    /// When the job was enqueued
    pub created_at: DateTime<Utc>,
}

impl GenerateStoryJob {
    /// Create a new generation task.
    pub fn new(
        job_id: JobId,
        video_id: VideoId,
        staged_uri: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            job_id,
            video_id,
            staged_uri: staged_uri.into(),
            mime_type: mime_type.into(),
            created_at: Utc::now(),
        }
    }
}
