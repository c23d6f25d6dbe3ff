//! Google Gemini adapter.
//!
//! Calls `POST {base_url}/v1beta/models/{model}:generateContent` with
//! `responseMimeType = application/json` and a `responseSchema`, then pulls
//! the candidate text out of the response envelope.
//!
//! The API key travels in the `x-goog-api-key` header and is never logged.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::trait_def::{GenerationError, StructuredRequest, TextModel};

/// Connection settings for the Gemini API.
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Scheme and host, without a trailing slash. Overridable for tests.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Config with the default model, endpoint, and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`TextModel`] backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        info!(model = %config.model, "Gemini client initialized");
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

fn build_request_body(request: &StructuredRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![RequestPart {
                text: &request.system_instruction,
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![RequestPart {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
            temperature: request.temperature,
        },
    }
}

/// Map a non-success HTTP status and body to a [`GenerationError`].
fn classify_error(status: StatusCode, body: &str) -> GenerationError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (body.trim().to_string(), String::new()),
    };
    let code = status.as_u16();
    if code == 401 || code == 403 {
        GenerationError::Auth {
            status: code,
            message,
        }
    } else if code == 429 || api_status == "RESOURCE_EXHAUSTED" {
        GenerationError::RateLimited { message }
    } else {
        GenerationError::Status {
            status: code,
            message,
        }
    }
}

/// Extract the candidate text from a successful response body.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(GenerationError::Blocked { reason });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyResponse);
    };
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!(finish_reason = %reason, "Gemini candidate did not finish normally");
        }
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &StructuredRequest) -> Result<String, GenerationError> {
        let endpoint = self.config.endpoint();
        let body = build_request_body(request);
        debug!(endpoint = %endpoint, prompt_len = request.prompt.len(), "calling Gemini");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body_len = text.len(),
                "Gemini API returned an error status"
            );
            return Err(classify_error(status, &text));
        }

        let output = extract_text(&text)?;
        debug!(response_len = output.len(), "Gemini response received");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> StructuredRequest {
        StructuredRequest {
            system_instruction: "be helpful".to_string(),
            prompt: "plan meals".to_string(),
            response_schema: json!({"type": "OBJECT"}),
            temperature: 0.7,
        }
    }

    #[test]
    fn endpoint_includes_model() {
        let mut cfg = GeminiConfig::new("key");
        cfg.base_url = "http://localhost:9999/".to_string();
        assert_eq!(
            cfg.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = GeminiConfig::new("super-secret");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn request_body_uses_camel_case_and_json_mode() {
        let req = request();
        let body = serde_json::to_value(build_request_body(&req)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan meals");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn extract_text_joins_parts() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&body.to_string()).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_text_reports_block_reason() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = extract_text(&body.to_string()).unwrap_err();
        assert!(
            matches!(err, GenerationError::Blocked { ref reason } if reason == "SAFETY"),
            "expected Blocked, got: {err}"
        );
    }

    #[test]
    fn extract_text_without_candidates_is_empty_response() {
        let err = extract_text("{}").unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[test]
    fn extract_text_rejects_garbage_envelope() {
        let err = extract_text("<html>").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedEnvelope(_)));
    }

    #[test]
    fn classify_maps_auth_and_quota() {
        let body = json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}});
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, &body.to_string()),
            GenerationError::Auth { status: 403, .. }
        ));

        let body = json!({"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}});
        assert!(matches!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, &body.to_string()),
            GenerationError::RateLimited { .. }
        ));

        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(
            matches!(err, GenerationError::Status { status: 500, ref message } if message == "oops"),
            "expected Status, got: {err}"
        );
    }
}
