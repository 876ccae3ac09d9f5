//! LLM provider factory.
//!
//! This is the single place where a provider name becomes a concrete
//! client. Extraction code never branches on the provider.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, MockClient, OpenAiClient};
use std::sync::Arc;
use tubescribe_core::{AppError, AppResult};

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "gemini", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for openai and gemini)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => OpenAiClient::with_base_url(api_key, endpoint),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => GeminiClient::with_base_url(api_key, endpoint),
                None => GeminiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockClient::new())),
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
