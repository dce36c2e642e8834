//! Failure-normalizing wrapper over a `LanguageModel`.
//!
//! Callers branch on `Generation::Ready` vs `Generation::Failed`; nothing here
//! returns an `Err` or panics on bad model output.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::LanguageModel;

/// Outcome of one generative call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation<T> {
    Ready(T),
    Failed { reason: String },
}

impl<T> Generation<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Generation::Failed {
            reason: reason.into(),
        }
    }
}

impl Generation<String> {
    /// Text-mode view: failures become a human-readable notice instead of content.
    pub fn into_text_or_notice(self) -> String {
        match self {
            Generation::Ready(text) => text,
            Generation::Failed { reason } => format!("Error generating content: {reason}"),
        }
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    model: Arc<dyn LanguageModel>,
}

impl GenerationClient {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Returns the raw response text, unmodified.
    pub async fn generate_text(&self, prompt: &str) -> Generation<String> {
        match self.model.complete(prompt).await {
            Ok(text) => Generation::Ready(text),
            Err(e) => {
                warn!("Text generation failed: {e}");
                Generation::failed(e.to_string())
            }
        }
    }

    /// Parses the response as JSON after stripping markdown fences.
    pub async fn generate_json(&self, prompt: &str) -> Generation<Value> {
        match self.model.complete(prompt).await {
            Ok(text) => parse_json_reply(&text),
            Err(e) => {
                warn!("JSON generation failed: {e}");
                Generation::failed(e.to_string())
            }
        }
    }
}

/// Parses model output as JSON, tolerating a ```json fence around it.
pub fn parse_json_reply(text: &str) -> Generation<Value> {
    let body = strip_json_fences(text);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Generation::Ready(value),
        Err(e) => {
            warn!("Model reply was not valid JSON: {e}");
            Generation::failed(format!("invalid JSON in model reply: {e}"))
        }
    }
}

/// Strips a leading ```json (or bare ```) marker and a trailing ``` marker.
/// Each side is handled independently.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
