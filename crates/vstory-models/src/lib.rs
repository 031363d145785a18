//! Shared data models for the Video Storyteller backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs (one upload batch) and their aggregate status
//! - Per-video records and their lifecycle status
//! - The video mime-type allow-list

pub mod job;
pub mod video;

// Re-export common types
pub use job::{JobId, JobRecord, JobStatus};
pub use video::{is_allowed_mime, VideoId, VideoRecord, VideoStatus, ALLOWED_MIME_TYPES};
