//! LLM client module
//!
//! Provides the model invocation interface the planning pipeline runs on.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, StreamChunk, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// The API key is resolved by the caller and passed in explicitly.
pub fn create_client(config: &LlmConfig, api_key: impl Into<String>) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicClient::new(config, api_key)?)),
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: anthropic",
                other
            )))
        }
    }
}
