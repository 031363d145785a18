//! Job record: one upload batch and its aggregate status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::video::{VideoId, VideoRecord};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Aggregate job status, derived from the contained video records.
///
/// A job is `Completed` once every video is terminal, even when every one
/// of them failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// At least one video has not reached a terminal state
    #[default]
    Processing,
    /// Every video is terminal
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One upload batch of 1-10 videos.
///
/// The video list is ordered by upload position and append-only after
/// creation; individual records are mutated in place as they complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Unique job ID
    pub id: JobId,

    /// Aggregate status
    #[serde(default)]
    pub status: JobStatus,

    /// Per-video records, in upload order
    pub videos: Vec<VideoRecord>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Set when the last video reaches a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create a job over the accepted videos.
    pub fn new(videos: Vec<VideoRecord>) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Processing,
            videos,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Find a contained video by ID.
    pub fn video(&self, video_id: &VideoId) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| &v.id == video_id)
    }

    /// True when every contained video is terminal.
    pub fn all_terminal(&self) -> bool {
        self.videos.iter().all(|v| v.status.is_terminal())
    }

    /// Recompute the aggregate status from the video fold.
    ///
    /// Called after every individual video transition so the denormalized
    /// status is consistent on every read.
    pub fn refresh_status(&mut self) {
        if self.all_terminal() {
            if self.status != JobStatus::Completed {
                self.status = JobStatus::Completed;
                self.completed_at = Some(Utc::now());
            }
        } else {
            self.status = JobStatus::Processing;
        }
    }
}
