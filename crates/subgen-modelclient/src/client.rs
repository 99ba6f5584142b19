//! HTTP transport to the opaque generative model (spec.md §4.5).
//!
//! Grounded on `vclip-worker::gemini::GeminiClient::call_gemini_api`: same
//! request/response envelope shape and the same markdown-fence-stripping
//! before JSON parsing, generalized to take an already-uploaded segment
//! reference instead of an inline transcript.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ModelError, ModelResult};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    FileRef {
        #[serde(rename = "fileData")]
        file_data: FileData<'a>,
    },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    #[serde(rename = "fileUri")]
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

/// Thin HTTP client for one generative-model endpoint. One instance is
/// shared across all requests; it carries no per-job state.
pub struct ModelHttpClient {
    endpoint_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ModelHttpClient {
    pub fn new(endpoint_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { endpoint_url: endpoint_url.into(), api_key: api_key.into(), http: reqwest::Client::new() }
    }

    pub fn from_env() -> ModelResult<Self> {
        let endpoint_url = std::env::var("SUBGEN_MODEL_ENDPOINT_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta/models".to_string());
        let api_key = std::env::var("SUBGEN_MODEL_API_KEY")
            .map_err(|_| ModelError::AuthFailed("SUBGEN_MODEL_API_KEY not set".to_string()))?;
        Ok(Self::new(endpoint_url, api_key))
    }

    /// Issue one generation request against `segment_uri` (the remote
    /// object reference returned by the Blob Adapter) with `prompt` as the
    /// rendered instruction text. Returns the raw cue text produced by the
    /// model, with any markdown code-fence wrapper stripped.
    pub async fn generate(&self, model: &str, segment_uri: &str, prompt: &str) -> ModelResult<String> {
        let url = format!("{}/{}:generateContent?key={}", self.endpoint_url, model, self.api_key);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileRef { file_data: FileData { file_uri: segment_uri } },
                    Part::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig { response_mime_type: "text/plain".to_string() },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(ModelError::AuthFailed(format!("{status}: {body}")));
            }
            if status.as_u16() == 429 {
                return Err(ModelError::QuotaExceeded(format!("{status}: {body}")));
            }
            return Err(ModelError::RequestFailed(format!("{status}: {body}")));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "model response failed to deserialize");
            ModelError::ResponseInvalid(e.to_string())
        })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| ModelError::ResponseInvalid("response contained no candidates".to_string()))?;

        Ok(strip_markdown_fence(text))
    }
}

fn strip_markdown_fence(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("```srt").unwrap_or(text);
    let text = text.strip_prefix("```vtt").unwrap_or(text);
    let text = text.strip_prefix("```text").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markdown_fence_removes_language_tagged_block() {
        let wrapped = "```srt\n1\n00:00:00,000 --> 00:00:01,000\nHello\n```";
        assert_eq!(strip_markdown_fence(wrapped), "1\n00:00:00,000 --> 00:00:01,000\nHello");
    }

    #[test]
    fn strip_markdown_fence_is_noop_on_plain_text() {
        assert_eq!(strip_markdown_fence("plain cue text"), "plain cue text");
    }
}
