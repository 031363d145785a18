//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Queue error: {0}")]
    Queue(#[from] vstory_queue::QueueError),

    #[error("Store error: {0}")]
    Store(#[from] vstory_store::StoreError),

    #[error("Job failed: {0}")]
    JobFailed(String),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }
}
