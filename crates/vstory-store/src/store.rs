//! Process-wide job store.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use vstory_models::{JobId, JobRecord, VideoId, VideoRecord, VideoStatus};

use crate::error::{StoreError, StoreResult};

/// In-memory mapping from job ID to job record.
///
/// The store exclusively owns all job records; handlers and workers hold an
/// `Arc<JobStore>` and mutate records only through these methods. Updates
/// are scoped to a single record under the map lock, and the aggregate job
/// status is recomputed after every video transition. Records live for the
/// process lifetime and are never deleted.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job over the accepted videos and return a snapshot of it.
    pub async fn create_job(&self, videos: Vec<VideoRecord>) -> JobRecord {
        let job = JobRecord::new(videos);
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job.clone());
        debug!("Created job {} with {} video(s)", job.id, job.videos.len());
        job
    }

    /// Insert a fully prepared job record.
    ///
    /// Used when staging has to happen under the job's ID before the job
    /// becomes visible to pollers and workers.
    pub async fn insert_job(&self, job: JobRecord) {
        let mut jobs = self.jobs.write().await;
        debug!("Inserted job {} with {} video(s)", job.id, job.videos.len());
        jobs.insert(job.id.clone(), job);
    }

    /// Snapshot a job by ID.
    pub async fn get_job(&self, job_id: &JobId) -> Option<JobRecord> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id).cloned()
    }

    /// Snapshot one video within a job.
    pub async fn get_video(&self, job_id: &JobId, video_id: &VideoId) -> Option<VideoRecord> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id).and_then(|j| j.video(video_id).cloned())
    }

    /// Number of jobs held.
    pub async fn job_count(&self) -> usize {
        let jobs = self.jobs.read().await;
        jobs.len()
    }

    /// Apply a closure to one video record, then refresh the job aggregate.
    ///
    /// This is the single mutation point for the lifecycle tracker: a
    /// `(job_id, video_id)` lookup followed by an in-place field update.
    pub async fn update_video<F>(
        &self,
        job_id: &JobId,
        video_id: &VideoId,
        update: F,
    ) -> StoreResult<VideoRecord>
    where
        F: FnOnce(&mut VideoRecord),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::JobNotFound(job_id.clone()))?;
        let video = job
            .videos
            .iter_mut()
            .find(|v| &v.id == video_id)
            .ok_or_else(|| StoreError::VideoNotFound(video_id.clone()))?;

        // Terminal records admit no further transitions.
        if video.status.is_terminal() {
            debug!("Ignoring update to terminal video {}", video_id);
            return Ok(video.clone());
        }

        update(video);
        let snapshot = video.clone();
        job.refresh_status();
        Ok(snapshot)
    }

    /// Transition a video to `uploading` (staging in progress).
    pub async fn mark_uploading(&self, job_id: &JobId, video_id: &VideoId) -> StoreResult<()> {
        self.update_video(job_id, video_id, |v| v.status = VideoStatus::Uploading)
            .await?;
        Ok(())
    }

    /// Transition a video to `processing`, optionally recording where its
    /// bytes were staged.
    pub async fn mark_processing(
        &self,
        job_id: &JobId,
        video_id: &VideoId,
        staged_uri: Option<String>,
    ) -> StoreResult<()> {
        self.update_video(job_id, video_id, |v| {
            v.status = VideoStatus::Processing;
            if staged_uri.is_some() {
                v.staged_uri = staged_uri;
            }
        })
        .await?;
        Ok(())
    }

    /// Terminal transition: story generated.
    pub async fn complete_video(
        &self,
        job_id: &JobId,
        video_id: &VideoId,
        story: impl Into<String>,
    ) -> StoreResult<()> {
        let story = story.into();
        self.update_video(job_id, video_id, |v| v.complete(story))
            .await?;
        Ok(())
    }

    /// Terminal transition: generation failed. The failure is isolated to
    /// this record; siblings in the same job are untouched.
    pub async fn fail_video(
        &self,
        job_id: &JobId,
        video_id: &VideoId,
        error: impl Into<String>,
    ) -> StoreResult<()> {
        let error = error.into();
        self.update_video(job_id, video_id, |v| v.fail(error))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use vstory_models::JobStatus;

    fn videos(n: usize) -> Vec<VideoRecord> {
        (0..n)
            .map(|i| VideoRecord::new(format!("clip-{i}.mp4"), "video/mp4"))
            .collect()
    }

    #[tokio::test]
    async fn test_create_and_get_job() {
        let store = JobStore::new();
        let job = store.create_job(videos(3)).await;

        let fetched = store.get_job(&job.id).await.unwrap();
        assert_eq!(fetched.videos.len(), 3);
        assert_eq!(fetched.status, JobStatus::Processing);
        assert_eq!(store.job_count().await, 1);

        assert!(store.get_job(&JobId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_video_order_preserved() {
        let store = JobStore::new();
        let job = store.create_job(videos(5)).await;
        let fetched = store.get_job(&job.id).await.unwrap();
        for (i, v) in fetched.videos.iter().enumerate() {
            assert_eq!(v.original_name, format!("clip-{i}.mp4"));
        }
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let store = JobStore::new();
        let job = store.create_job(videos(1)).await;
        let vid = job.videos[0].id.clone();

        store.mark_uploading(&job.id, &vid).await.unwrap();
        assert_eq!(
            store.get_video(&job.id, &vid).await.unwrap().status,
            VideoStatus::Uploading
        );

        store
            .mark_processing(&job.id, &vid, Some("s3://bucket/key".into()))
            .await
            .unwrap();
        let v = store.get_video(&job.id, &vid).await.unwrap();
        assert_eq!(v.status, VideoStatus::Processing);
        assert_eq!(v.staged_uri.as_deref(), Some("s3://bucket/key"));

        store.complete_video(&job.id, &vid, "a story").await.unwrap();
        let v = store.get_video(&job.id, &vid).await.unwrap();
        assert_eq!(v.status, VideoStatus::Completed);
        assert_eq!(v.story.as_deref(), Some("a story"));
        assert!(v.error.is_none());

        // Job aggregate followed the fold.
        let j = store.get_job(&job.id).await.unwrap();
        assert_eq!(j.status, JobStatus::Completed);
        assert!(j.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_records_are_frozen() {
        let store = JobStore::new();
        let job = store.create_job(videos(1)).await;
        let vid = job.videos[0].id.clone();

        store.fail_video(&job.id, &vid, "quota exceeded").await.unwrap();

        // A late completion must not overwrite the terminal failure.
        store.complete_video(&job.id, &vid, "too late").await.unwrap();
        let v = store.get_video(&job.id, &vid).await.unwrap();
        assert_eq!(v.status, VideoStatus::Failed);
        assert_eq!(v.error.as_deref(), Some("quota exceeded"));
        assert!(v.story.is_none());
    }

    #[tokio::test]
    async fn test_failure_isolated_from_siblings() {
        let store = JobStore::new();
        let job = store.create_job(videos(2)).await;
        let failed = job.videos[0].id.clone();
        let sibling = job.videos[1].id.clone();

        store.fail_video(&job.id, &failed, "quota exceeded").await.unwrap();

        let j = store.get_job(&job.id).await.unwrap();
        assert_eq!(j.status, JobStatus::Processing);
        assert_eq!(
            j.video(&sibling).unwrap().status,
            VideoStatus::Pending
        );

        store.complete_video(&job.id, &sibling, "story").await.unwrap();
        let j = store.get_job(&job.id).await.unwrap();
        assert_eq!(j.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_errors() {
        let store = JobStore::new();
        let job = store.create_job(videos(1)).await;

        let err = store
            .complete_video(&JobId::new(), &job.videos[0].id, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(_)));

        let err = store
            .complete_video(&job.id, &VideoId::new(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_workers_do_not_conflict() {
        let store = Arc::new(JobStore::new());
        let job = store.create_job(videos(10)).await;

        let mut handles = Vec::new();
        for (i, v) in job.videos.iter().enumerate() {
            let store = Arc::clone(&store);
            let job_id = job.id.clone();
            let video_id = v.id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .mark_processing(&job_id, &video_id, None)
                    .await
                    .unwrap();
                if i % 2 == 0 {
                    store
                        .complete_video(&job_id, &video_id, format!("story {i}"))
                        .await
                        .unwrap();
                } else {
                    store
                        .fail_video(&job_id, &video_id, format!("error {i}"))
                        .await
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let j = store.get_job(&job.id).await.unwrap();
        assert_eq!(j.status, JobStatus::Completed);
        for (i, v) in j.videos.iter().enumerate() {
            assert!(v.status.is_terminal());
            // Exactly one of story/error, never both.
            assert_ne!(v.story.is_some(), v.error.is_some());
            if i % 2 == 0 {
                assert_eq!(v.story.as_deref(), Some(format!("story {i}").as_str()));
            }
        }
    }
}
