//! API configuration.

use std::fmt;
use std::str::FromStr;

/// Hard bound on files per upload batch.
pub const MAX_VIDEOS_PER_UPLOAD: usize = 10;

/// How uploaded videos reach the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// In-process background task, raw bytes sent to the model
    #[default]
    Inline,
    /// In-process background task, bytes staged to object storage first
    Staged,
    /// Bytes staged at upload time, per-video jobs pushed to the queue
    Queued,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Inline => "inline",
            DispatchMode::Staged => "staged",
            DispatchMode::Queued => "queued",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(DispatchMode::Inline),
            "staged" => Ok(DispatchMode::Staged),
            "queued" => Ok(DispatchMode::Queued),
            other => Err(format!("Unknown dispatch mode: {other}")),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Per-file size ceiling in bytes
    pub max_file_size: usize,
    /// Dispatch mode
    pub dispatch_mode: DispatchMode,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            max_file_size: 500 * 1024 * 1024, // 500MB
            dispatch_mode: DispatchMode::Inline,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_file_size: std::env::var("VIDEO_MAX_SIZE_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(500)
                * 1024
                * 1024,
            dispatch_mode: std::env::var("DISPATCH_MODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Request body ceiling: the per-file limit for each of up to ten
    /// files plus multipart framing headroom.
    pub fn max_body_size(&self) -> usize {
        self.max_file_size * MAX_VIDEOS_PER_UPLOAD + 1024 * 1024
    }
}
