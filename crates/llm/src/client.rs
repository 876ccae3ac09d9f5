//! LLM client abstraction and request types.
//!
//! This module defines the core abstraction for interacting with LLM
//! providers. The contract is deliberately narrow: a system prompt, a user
//! prompt, and a flag requesting JSON output; the provider returns the raw
//! completion text.

use serde::{Deserialize, Serialize};
use tubescribe_core::AppResult;

/// LLM completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The user prompt text to send to the LLM
    pub prompt: String,

    /// Model identifier (e.g., "gpt-4o-mini", "gemini-1.5-pro")
    pub model: String,

    /// System prompt (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Ask the provider to emit a JSON object
    #[serde(default)]
    pub json_response: bool,
}

impl LlmRequest {
    /// Create a new LLM request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: None,
            temperature: None,
            max_tokens: None,
            json_response: false,
        }
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a JSON object response from the provider.
    pub fn with_json_response(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Trait for LLM providers.
///
/// Transport failures surface as `AppError::Provider`; whether the returned
/// text parses into the expected schema is the caller's concern.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "openai", "gemini").
    fn provider_name(&self) -> &str;

    /// Perform a completion and return the raw response text.
    async fn complete(&self, request: &LlmRequest) -> AppResult<String>;
}
