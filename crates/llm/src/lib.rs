//! LLM provider integration for tubescribe.
//!
//! Provider selection is a capability interface: the extraction code only
//! sees `LlmClient::complete` ("structured JSON in, text out"), never a
//! specific provider's request shape.

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{LlmClient, LlmRequest};
pub use factory::create_client;
