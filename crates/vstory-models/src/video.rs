//! Per-video record and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Mime types accepted for upload. Checked against the multipart part's
/// declared content type, never the filename extension.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/quicktime"];

/// Check a mime type against the allow-list.
pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Unique identifier for one uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
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

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of one video.
///
/// Transitions only move forward; `Completed` and `Failed` are terminal.
/// The `Uploading` step only occurs when bytes are staged to object storage
/// first; the inline dispatch mode goes straight to `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Accepted, waiting for dispatch
    #[default]
    Pending,
    /// Bytes being staged to object storage
    Uploading,
    /// Story generation in flight
    Processing,
    /// Story generated successfully
    Completed,
    /// Generation failed; never retried
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Uploading => "uploading",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of work: an uploaded file and its generation result.
///
/// `story` and `error` are mutually exclusive and both absent until the
/// record reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Unique video ID
    pub id: VideoId,

    /// Client-supplied filename (display only, not a security boundary)
    pub original_name: String,

    /// Declared mime type, one of the allow-list
    pub mime_type: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: VideoStatus,

    /// Generated story (present only when completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,

    /// Failure message (present only when failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Object storage reference for staged bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_uri: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Terminal transition timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Create a pending record for an accepted file.
    pub fn new(original_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: VideoId::new(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            status: VideoStatus::Pending,
            story: None,
            error: None,
            staged_uri: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark the record completed with its generated story.
    pub fn complete(&mut self, story: impl Into<String>) {
        self.status = VideoStatus::Completed;
        self.story = Some(story.into());
        self.error = None;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the record failed with the upstream error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = VideoStatus::Failed;
        self.error = Some(error.into());
        self.story = None;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_mime_allow_list() {
        assert!(is_allowed_mime("video/mp4"));
        assert!(is_allowed_mime("video/webm"));
        assert!(is_allowed_mime("video/quicktime"));
        assert!(!is_allowed_mime("text/plain"));
        assert!(!is_allowed_mime("video/x-matroska"));
    }

    #[test]
    fn test_story_and_error_exclusive() {
        let mut record = VideoRecord::new("clip.mp4", "video/mp4");
        assert!(record.story.is_none());
        assert!(record.error.is_none());

        record.complete("a story");
        assert_eq!(record.status, VideoStatus::Completed);
        assert!(record.story.is_some());
        assert!(record.error.is_none());
        assert!(record.completed_at.is_some());

        let mut failed = VideoRecord::new("clip.webm", "video/webm");
        failed.fail("quota exceeded");
        assert_eq!(failed.status, VideoStatus::Failed);
        assert!(failed.story.is_none());
        assert_eq!(failed.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!VideoStatus::Pending.is_terminal());
        assert!(!VideoStatus::Uploading.is_terminal());
        assert!(!VideoStatus::Processing.is_terminal());
        assert!(VideoStatus::Completed.is_terminal());
        assert!(VideoStatus::Failed.is_terminal());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let record = VideoRecord::new("clip.mp4", "video/mp4");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("originalName").is_some());
        assert!(json.get("mimeType").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json.get("status").unwrap(), "pending");
        // Absent until terminal
        assert!(json.get("story").is_none());
        assert!(json.get("error").is_none());
    }
}
