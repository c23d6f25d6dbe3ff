//! Generative model adapters.
//!
//! [`TextModel`] is the seam between the meal plan agent and a concrete
//! provider. [`GeminiClient`] is the production implementation.

pub mod gemini;
pub mod trait_def;

pub use gemini::{GeminiClient, GeminiConfig};
pub use trait_def::{GenerationError, StructuredRequest, TextModel};
