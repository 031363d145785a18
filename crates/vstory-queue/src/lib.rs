//! Redis Streams work queue.
//!
//! This crate provides:
//! - Per-video job enqueueing via Redis Streams
//! - Consumer-group consumption for the worker pool
//!
//! Delivery is at-least-once with no retry, dedup, or ordering guarantees;
//! a job that fails during processing is acked and surfaces only as the
//! video record's `failed` status.

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::GenerateStoryJob;
pub use queue::{JobQueue, QueueConfig};
