//! Queued-mode worker pool.
//!
//! This crate provides:
//! - A bounded-concurrency executor consuming the Redis Streams queue
//! - Per-video processing that drives job-store transitions
//!
//! The workers run inside the API process and share its `JobStore`; every
//! consumed job is acked whether generation succeeded or failed, since a
//! failed video is terminal and never retried.

pub mod config;
pub mod error;
pub mod executor;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use processor::{process_story_job, ProcessingContext};
