//! Store error types.

use thiserror::Error;
use vstory_models::{JobId, VideoId};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Video not found: {0}")]
    VideoNotFound(VideoId),
}
