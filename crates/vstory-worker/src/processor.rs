//! Per-video job processing.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use vstory_gemini::{GeminiClient, VideoSource};
use vstory_queue::GenerateStoryJob;
use vstory_store::JobStore;

use crate::error::WorkerResult;

/// Shared handles the worker pool processes jobs with.
pub struct ProcessingContext {
    pub store: Arc<JobStore>,
    pub gemini: Arc<GeminiClient>,
}

impl ProcessingContext {
    pub fn new(store: Arc<JobStore>, gemini: Arc<GeminiClient>) -> Self {
        Self { store, gemini }
    }
}

/// Process one queued video: transition it to `processing`, call the
/// generator with the staged reference, and record the terminal state.
///
/// A generation failure is not an error here; it lands on the video record
/// as `failed` with the upstream message, leaving sibling videos untouched.
/// Errors are returned only when the store has no matching record.
pub async fn process_story_job(
    ctx: &ProcessingContext,
    job: &GenerateStoryJob,
) -> WorkerResult<()> {
    info!("Processing video {} of job {}", job.video_id, job.job_id);

    ctx.store
        .mark_processing(&job.job_id, &job.video_id, Some(job.staged_uri.clone()))
        .await?;

    let source = VideoSource::Uri(job.staged_uri.clone());
    match ctx.gemini.generate_story(&source, &job.mime_type).await {
        Ok(story) => {
            ctx.store
                .complete_video(&job.job_id, &job.video_id, story)
                .await?;
            counter!("vstory_jobs_completed_total").increment(1);
            info!("Story generated for video {}", job.video_id);
        }
        Err(e) => {
            warn!("Generation failed for video {}: {}", job.video_id, e);
            ctx.store
                .fail_video(&job.job_id, &job.video_id, e.to_string())
                .await?;
            counter!("vstory_jobs_failed_total").increment(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstory_models::{JobStatus, VideoRecord, VideoStatus};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn context_with_gemini(server: &MockServer) -> (ProcessingContext, Arc<JobStore>) {
        let store = Arc::new(JobStore::new());
        let gemini = Arc::new(
            GeminiClient::new("test-key", "gemini-3-flash-preview").with_base_url(server.uri()),
        );
        (
            ProcessingContext::new(Arc::clone(&store), gemini),
            store,
        )
    }

    fn story_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
        })
    }

    #[tokio::test]
    async fn test_successful_job_completes_video() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(story_body("A story.")))
            .mount(&server)
            .await;

        let (ctx, store) = context_with_gemini(&server).await;
        let job = store
            .create_job(vec![VideoRecord::new("clip.mp4", "video/mp4")])
            .await;
        let task = GenerateStoryJob::new(
            job.id.clone(),
            job.videos[0].id.clone(),
            "https://storage/clip.mp4",
            "video/mp4",
        );

        process_story_job(&ctx, &task).await.unwrap();

        let video = store.get_video(&job.id, &task.video_id).await.unwrap();
        assert_eq!(video.status, VideoStatus::Completed);
        assert_eq!(video.story.as_deref(), Some("A story."));
        assert_eq!(video.staged_uri.as_deref(), Some("https://storage/clip.mp4"));
        assert_eq!(store.get_job(&job.id).await.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_quota_failure_marks_only_that_video() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let (ctx, store) = context_with_gemini(&server).await;
        let job = store
            .create_job(vec![
                VideoRecord::new("a.mp4", "video/mp4"),
                VideoRecord::new("b.mp4", "video/mp4"),
            ])
            .await;
        let task = GenerateStoryJob::new(
            job.id.clone(),
            job.videos[0].id.clone(),
            "https://storage/a.mp4",
            "video/mp4",
        );

        // Failure is recorded, not returned.
        process_story_job(&ctx, &task).await.unwrap();

        let failed = store.get_video(&job.id, &task.video_id).await.unwrap();
        assert_eq!(failed.status, VideoStatus::Failed);
        assert!(failed.error.as_deref().unwrap().contains("quota exceeded"));
        assert!(failed.story.is_none());

        // Sibling untouched, job still processing.
        let sibling = store
            .get_video(&job.id, &job.videos[1].id)
            .await
            .unwrap();
        assert_eq!(sibling.status, VideoStatus::Pending);
        assert_eq!(store.get_job(&job.id).await.unwrap().status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_unknown_job_is_an_error() {
        let server = MockServer::start().await;
        let (ctx, _store) = context_with_gemini(&server).await;

        let task = GenerateStoryJob::new(
            vstory_models::JobId::new(),
            vstory_models::VideoId::new(),
            "https://storage/x.mp4",
            "video/mp4",
        );
        let err = process_story_job(&ctx, &task).await.unwrap_err();
        assert!(matches!(err, crate::error::WorkerError::Store(_)));
    }
}
