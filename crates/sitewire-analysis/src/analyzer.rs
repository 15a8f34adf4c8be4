//! The seam to the external vision model.
//!
//! `PhotoAnalyzer` is the asynchronous collaborator boundary: one call, one
//! result, no retry.  `GeminiAnalyzer` is the production implementation
//! against the generative-language HTTP API; tests substitute their own
//! implementations.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use sitewire_shared::types::{ImageRef, ReportKind};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::prompt::analysis_prompt;

/// External photo analysis collaborator.
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    /// Analyze a captured image for the given report kind and return the raw
    /// analysis text.  May suspend for an arbitrary duration; a single
    /// failure is final, the caller decides what to substitute.
    async fn analyze(&self, image: &ImageRef, kind: ReportKind) -> Result<String, AnalysisError>;
}

/// Remote analyzer speaking the `generateContent` API.
pub struct GeminiAnalyzer {
    http: reqwest::Client,
    config: AnalysisConfig,
}

impl GeminiAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn request_url(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            api_key,
        )
    }
}

#[async_trait]
impl PhotoAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, image: &ImageRef, kind: ReportKind) -> Result<String, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::NotConfigured)?;

        let path = image
            .as_str()
            .strip_prefix("file://")
            .unwrap_or(image.as_str());
        let image_bytes = tokio::fs::read(path).await?;

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": analysis_prompt(kind) },
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": BASE64.encode(&image_bytes),
                        }
                    },
                ]
            }]
        });

        debug!(kind = %kind, model = %self.config.model, "Sending analysis request");

        let response = self
            .http
            .post(self.request_url(api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let payload: GenerateContentResponse = response.json().await?;
        payload.first_text().ok_or(AnalysisError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Severity: low" }, { "text": "\nDone" } ] } }
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.first_text().unwrap(), "Severity: low\nDone");
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.first_text().is_none());

        let raw = r#"{ "candidates": [ { "content": { "parts": [] } } ] }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.first_text().is_none());
    }

    #[test]
    fn test_request_url_shape() {
        let analyzer = GeminiAnalyzer::new(AnalysisConfig {
            api_key: Some("k".to_string()),
            endpoint: "https://example.test/".to_string(),
            ..AnalysisConfig::default()
        })
        .unwrap();
        assert_eq!(
            analyzer.request_url("k"),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent?key=k"
        );
    }
}
