//! Gemini story generation client.
//!
//! This crate provides:
//! - The `generateContent` call with a video payload (inline bytes or a
//!   staged file reference) and the fixed news-story prompt
//! - Title normalization of the raw model output

pub mod client;
pub mod error;
pub mod prompt;

pub use client::{GeminiClient, VideoSource};
pub use error::{GeminiError, GeminiResult};
pub use prompt::{strip_title_quotes, STORY_PROMPT};
