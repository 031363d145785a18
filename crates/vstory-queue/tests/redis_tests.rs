//! Redis queue integration tests.

use vstory_models::{JobId, VideoId};
use vstory_queue::{GenerateStoryJob, JobQueue};

/// Test job enqueue and dequeue cycle.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_job_enqueue_dequeue() {
    dotenvy::dotenv().ok();

    let queue = JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let job = GenerateStoryJob::new(
        JobId::new(),
        VideoId::new(),
        "https://storage/test/clip.mp4",
        "video/mp4",
    );
    let video_id = job.video_id.clone();

    let message_id = queue.enqueue(&job).await.expect("Failed to enqueue");
    println!("Enqueued video {} with message ID {}", video_id, message_id);

    let jobs = queue
        .consume("test-consumer", 1000, 1)
        .await
        .expect("Failed to consume");

    assert_eq!(jobs.len(), 1);
    let (msg_id, consumed) = &jobs[0];
    assert_eq!(consumed.video_id, video_id);

    queue.ack(msg_id).await.expect("Failed to ack");
}

/// An entry without a decodable payload must be acked away, not left
/// pending in the consumer group.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_undecodable_entry_is_acked() {
    dotenvy::dotenv().ok();

    let queue = JobQueue::from_env().expect("Failed to create queue");
    queue.init().await.expect("Failed to initialize queue");

    let stream = std::env::var("QUEUE_STREAM").unwrap_or_else(|_| "vstory:jobs".to_string());
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let client = redis::Client::open(redis_url).expect("Failed to open redis");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect");

    // Entry with no "job" field at all.
    let _: String = redis::cmd("XADD")
        .arg(&stream)
        .arg("*")
        .arg("unrelated")
        .arg("payload")
        .query_async(&mut conn)
        .await
        .expect("Failed to XADD");

    let before = queue.len().await.expect("Failed to get length");
    let jobs = queue
        .consume("test-consumer", 1000, 10)
        .await
        .expect("Failed to consume");

    // Nothing decodable came back, and the entry was acked and deleted.
    assert!(jobs.is_empty());
    let after = queue.len().await.expect("Failed to get length");
    assert!(after < before);
}
