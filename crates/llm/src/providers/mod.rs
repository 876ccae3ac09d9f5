//! LLM provider implementations.

mod gemini;
mod mock;
mod openai;

pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use openai::OpenAiClient;
