//! Generator error types.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Failed to configure Gemini client: {0}")]
    ConfigError(String),

    #[error("Gemini API request failed: {0}")]
    RequestFailed(String),

    #[error("Gemini API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Failed to parse Gemini response: {0}")]
    MalformedResponse(String),

    #[error("No content in Gemini response")]
    EmptyResponse,
}

impl GeminiError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }
}
