//! Scripted mock provider.
//!
//! Returns canned responses without any network traffic. Used by tests that
//! exercise the extraction orchestrator, and available as the "mock"
//! provider for offline dry runs.

use crate::client::{LlmClient, LlmRequest};
use std::collections::VecDeque;
use std::sync::Mutex;
use tubescribe_core::{AppError, AppResult};

/// One scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    ProviderError(String),
}

/// Mock LLM client with a FIFO script of replies.
///
/// Replies are consumed in order; once the script is exhausted the default
/// response is returned (an empty JSON object unless overridden).
pub struct MockClient {
    script: Mutex<VecDeque<Reply>>,
    default_response: String,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    /// Create a mock client with no scripted replies.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: "{}".to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a successful reply.
    pub fn push_response(&self, response: impl Into<String>) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Reply::Text(response.into()));
    }

    /// Queue a transport failure.
    pub fn push_provider_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(Reply::ProviderError(message.into()));
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock request lock poisoned").len()
    }

    /// Copies of every request seen, in call order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .expect("mock request lock poisoned")
            .clone()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<String> {
        self.requests
            .lock()
            .expect("mock request lock poisoned")
            .push(request.clone());

        let reply = self
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::ProviderError(message)) => Err(AppError::Provider(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let client = MockClient::new();
        client.push_response("first");
        client.push_response("second");

        let request = LlmRequest::new("hi", "mock-model");
        assert_eq!(client.complete(&request).await.unwrap(), "first");
        assert_eq!(client.complete(&request).await.unwrap(), "second");
        // Script exhausted, default takes over
        assert_eq!(client.complete(&request).await.unwrap(), "{}");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_provider_error() {
        let client = MockClient::new();
        client.push_provider_error("boom");

        let request = LlmRequest::new("hi", "mock-model");
        let err = client.complete(&request).await.unwrap_err();
        assert_eq!(err.error_code(), "LLM_PROVIDER_ERROR");
    }
}
