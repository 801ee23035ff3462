//! LlmClient trait definition

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CompletionRequest, CompletionResponse, LlmError, StreamChunk};

/// Stateless LLM client - each call is independent (fresh context)
///
/// The planning pipeline issues at most one outstanding call at a time and
/// never retries; transport-level timeouts belong to the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Streaming completion for live display
    ///
    /// Sends `StreamChunk::TextDelta` values to the channel in arrival order.
    /// Returns the final response once the remote stream ends.
    async fn stream(
        &self,
        request: CompletionRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, used for logging and cost estimates
    fn model(&self) -> &str {
        "unknown"
    }
}
