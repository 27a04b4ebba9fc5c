// src/ai/mod.rs

//! External LLM collaborator. Every generation entry point degrades to a
//! deterministic fallback on failure; callers never see an error.

pub mod path;
pub mod quiz;

use std::fmt;
use std::time::Duration;

use serde_json::json;

/// Why a generation attempt produced nothing usable. Logged at warn and
/// swallowed by the fallback paths, never returned over HTTP.
#[derive(Debug)]
pub enum GenerationError {
    /// No API key configured; generation is disabled.
    Disabled,
    Http(reqwest::Error),
    /// The response had no text candidate.
    EmptyResponse,
    /// The returned text was not the JSON we asked for.
    Parse(serde_json::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Disabled => write!(f, "AI generation disabled (no API key)"),
            GenerationError::Http(e) => write!(f, "AI request failed: {}", e),
            GenerationError::EmptyResponse => write!(f, "AI returned no content"),
            GenerationError::Parse(e) => write!(f, "AI returned unparseable content: {}", e),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err)
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Parse(err)
    }
}

/// Thin client for the Gemini `generateContent` endpoint: prompt in,
/// fence-stripped text out. No retry, no backoff; one failed call means
/// the caller's fallback path runs.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(strip_code_fences(text))
    }
}

/// Models routinely wrap JSON in markdown fences despite being asked not
/// to; strip them before parsing.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        let fenced = "```\n  [1, 2, 3]\n```\n";
        assert_eq!(strip_code_fences(fenced), "[1, 2, 3]");
    }

    #[test]
    fn leaves_plain_json_untouched() {
        assert_eq!(strip_code_fences("{\"ok\": true}"), "{\"ok\": true}");
    }

    #[tokio::test]
    async fn generation_is_disabled_without_api_key() {
        let client = GeminiClient::new(None, "gemini-1.5-flash".to_string());
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
    }
}
