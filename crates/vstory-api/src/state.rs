//! Application state.

use std::sync::Arc;

use vstory_gemini::GeminiClient;
use vstory_queue::JobQueue;
use vstory_storage::StorageClient;
use vstory_store::JobStore;

use crate::config::{ApiConfig, DispatchMode};

/// Shared application state.
///
/// The job store is the single shared-mutable point; handlers, background
/// dispatch tasks, and queue workers all go through this `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<JobStore>,
    pub gemini: Arc<GeminiClient>,
    /// Present in staged and queued modes
    pub storage: Option<Arc<StorageClient>>,
    /// Present in queued mode
    pub queue: Option<Arc<JobQueue>>,
}

impl AppState {
    /// Create application state for the configured dispatch mode.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let gemini = Arc::new(GeminiClient::from_env()?);

        let storage = match config.dispatch_mode {
            DispatchMode::Inline => None,
            DispatchMode::Staged | DispatchMode::Queued => {
                Some(Arc::new(StorageClient::from_env().await?))
            }
        };

        let queue = match config.dispatch_mode {
            DispatchMode::Queued => Some(Arc::new(JobQueue::from_env()?)),
            _ => None,
        };

        Ok(Self {
            config,
            store: Arc::new(JobStore::new()),
            gemini,
            storage,
            queue,
        })
    }
}
