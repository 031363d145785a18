//! Gemini API client.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GeminiError, GeminiResult};
use crate::prompt::{strip_title_quotes, STORY_PROMPT};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Models tried after the configured one, in order.
const FALLBACK_MODELS: [&str; 2] = ["gemini-2.5-flash", "gemini-2.5-pro"];

/// The video payload handed to the model.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Raw bytes, sent base64-encoded in the request body
    Inline(Vec<u8>),
    /// Reference to previously staged bytes (fetchable URL)
    Uri(String),
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
            file_data: None,
        }
    }

    fn video(source: &VideoSource, mime_type: &str) -> Self {
        match source {
            VideoSource::Inline(bytes) => Self {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.to_string(),
                    data: BASE64.encode(bytes),
                }),
                file_data: None,
            },
            VideoSource::Uri(uri) => Self {
                text: None,
                inline_data: None,
                file_data: Some(FileData {
                    mime_type: mime_type.to_string(),
                    file_uri: uri.clone(),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config_error("GEMINI_API_KEY not set"))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate a story for one video.
    ///
    /// Tries the configured model first, then the fallback list. The first
    /// successful response is normalized (title quotes stripped) and
    /// returned; no validation is performed against the prompt's formatting
    /// rules.
    pub async fn generate_story(
        &self,
        source: &VideoSource,
        mime_type: &str,
    ) -> GeminiResult<String> {
        let mut models = vec![self.model.as_str()];
        for m in FALLBACK_MODELS {
            if m != self.model {
                models.push(m);
            }
        }

        let mut last_error = None;

        for model in models {
            info!("Attempting Gemini API with model: {}", model);
            match self.call_generate(model, source, mime_type).await {
                Ok(raw) => {
                    info!("Story generated by {}", model);
                    return Ok(strip_title_quotes(&raw));
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GeminiError::EmptyResponse))
    }

    /// Call the generateContent endpoint for one model.
    async fn call_generate(
        &self,
        model: &str,
        source: &VideoSource,
        mime_type: &str,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::video(source, mime_type), Part::text(STORY_PROMPT)],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::request_failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiStatus { status, body });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::MalformedResponse(e.to_string()))?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(GeminiError::EmptyResponse)?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidates_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn test_generate_story_strips_title_quotes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body(
                "\"Flood Sweeps Coastal Road\"\n\nBody paragraph.",
            )))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", "gemini-3-flash-preview")
            .with_base_url(server.uri());
        let story = client
            .generate_story(&VideoSource::Inline(vec![0u8; 16]), "video/mp4")
            .await
            .unwrap();

        assert!(story.starts_with("Flood Sweeps Coastal Road\n"));
    }

    #[tokio::test]
    async fn test_quota_error_surfaces_after_fallbacks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("Resource has been exhausted"),
            )
            .expect(3) // configured model + two fallbacks
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", "gemini-3-flash-preview")
            .with_base_url(server.uri());
        let err = client
            .generate_story(&VideoSource::Uri("https://example.com/v.mp4".into()), "video/mp4")
            .await
            .unwrap_err();

        match err {
            GeminiError::ApiStatus { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("exhausted"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", "gemini-3-flash-preview")
            .with_base_url(server.uri());
        let err = client
            .generate_story(&VideoSource::Inline(Vec::new()), "video/webm")
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::EmptyResponse));
    }

    #[test]
    fn test_inline_part_serialization() {
        let part = Part::video(&VideoSource::Inline(vec![1, 2, 3]), "video/mp4");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "video/mp4");
        assert_eq!(json["inlineData"]["data"], BASE64.encode([1, 2, 3]));
        assert!(json.get("fileData").is_none());
    }

    #[test]
    fn test_file_part_serialization() {
        let part = Part::video(&VideoSource::Uri("https://x/y.mp4".into()), "video/quicktime");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["fileData"]["fileUri"], "https://x/y.mp4");
        assert_eq!(json["fileData"]["mimeType"], "video/quicktime");
    }
}
