//! The `TextModel` trait -- the adapter interface for generative models.
//!
//! The meal plan agent only needs "send a prompt plus a JSON schema, get
//! JSON text back". Each provider implements that here. The trait is
//! object-safe so the agent can hold a `Box<dyn TextModel>`.

use async_trait::async_trait;
use thiserror::Error;

/// A single structured-output request.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// Role and hard constraints for the model.
    pub system_instruction: String,
    /// The user turn.
    pub prompt: String,
    /// Schema the response must conform to (OpenAPI subset, as Gemini
    /// accepts it).
    pub response_schema: serde_json::Value,
    pub temperature: f32,
}

/// Errors from calling the model.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model rejected credentials (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("model rate limit or quota exceeded: {message}")]
    RateLimited { message: String },

    #[error("model returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("prompt was blocked by the model: {reason}")]
    Blocked { reason: String },

    #[error("model response contained no text")]
    EmptyResponse,

    #[error("could not decode model response envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),
}

/// Adapter interface for a text model with JSON-constrained output.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Model identifier, for logs (e.g. "gemini-2.5-flash").
    fn name(&self) -> &str;

    /// Run one request and return the raw response text, which should be
    /// JSON matching `request.response_schema`. Callers validate it.
    async fn generate(&self, request: &StructuredRequest) -> Result<String, GenerationError>;
}

// Compile-time assertion: TextModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn TextModel) {}
};
