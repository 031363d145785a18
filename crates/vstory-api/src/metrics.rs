//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vstory_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vstory_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vstory_http_requests_in_flight";

    // Queue metrics
    pub const QUEUE_LENGTH: &str = "vstory_queue_length";
    pub const JOBS_ENQUEUED_TOTAL: &str = "vstory_jobs_enqueued_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "vstory_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "vstory_jobs_failed_total";

    // Upload metrics
    pub const VIDEOS_UPLOADED_TOTAL: &str = "vstory_videos_uploaded_total";
    pub const UPLOAD_BYTES_TOTAL: &str = "vstory_upload_bytes_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Update queue length gauge.
pub fn set_queue_length(length: u64) {
    gauge!(names::QUEUE_LENGTH).set(length as f64);
}

/// Record job enqueued.
pub fn record_job_enqueued() {
    counter!(names::JOBS_ENQUEUED_TOTAL).increment(1);
}

/// Record accepted upload files.
pub fn record_videos_uploaded(count: u64, bytes: u64) {
    counter!(names::VIDEOS_UPLOADED_TOTAL).increment(count);
    counter!(names::UPLOAD_BYTES_TOTAL).increment(bytes);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    // Replace UUIDs and numeric IDs with placeholders
    let path =
        regex_lite::Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .unwrap()
            .replace_all(path, ":id");
    let path = regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(&path, "/:id$1");
    // Normalize job IDs (alphanumeric strings after /job/)
    let path = regex_lite::Regex::new(r"/job/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/job/:job_id");
    // Normalize video IDs
    let path = regex_lite::Regex::new(r"/video/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/video/:video_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/job/j-abc123/video/v-def456"),
            "/api/job/:job_id/video/:video_id"
        );
        assert_eq!(
            sanitize_path("/api/job/550e8400-e29b-41d4-a716-446655440000"),
            "/api/job/:id"
        );
    }
}
