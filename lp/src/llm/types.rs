//! LLM request/response types
//!
//! These types model the Anthropic Messages API, reduced to the text-only
//! exchanges the planning pipeline needs.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction for the role being played
    pub system_prompt: String,

    /// User messages (the pipeline always sends exactly one)
    pub messages: Vec<Message>,

    /// Max tokens for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a single-turn request
    pub fn single(system_prompt: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        debug!(%max_tokens, "CompletionRequest::single: called");
        Self {
            system_prompt: system_prompt.into(),
            messages: vec![Message::user(user)],
            max_tokens,
        }
    }

    /// Text of the first user message, if any
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// A plain end-of-turn text response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
}

impl StopReason {
    /// Parse from Anthropic API stop_reason string
    pub fn from_anthropic(s: &str) -> Self {
        debug!(%s, "StopReason::from_anthropic: called");
        match s {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => {
                debug!("StopReason::from_anthropic: unknown, defaulting to EndTurn");
                StopReason::EndTurn
            }
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Calculate cost in USD based on model pricing
    pub fn cost_usd(&self, model: &str) -> f64 {
        debug!(%model, %self.input_tokens, %self.output_tokens, "TokenUsage::cost_usd: called");
        let (input_price, output_price) = match model {
            m if m.contains("opus") => (15.0, 75.0),
            m if m.contains("sonnet") => (3.0, 15.0),
            m if m.contains("haiku") => (1.0, 5.0),
            _ => {
                debug!("TokenUsage::cost_usd: unknown model, defaulting to sonnet pricing");
                (3.0, 15.0)
            }
        };

        let input_cost = (self.input_tokens as f64 / 1_000_000.0) * input_price;
        let output_cost = (self.output_tokens as f64 / 1_000_000.0) * output_price;

        input_cost + output_cost
    }
}

/// Streaming chunk for live display
#[derive(Debug, Clone)]
pub enum StreamChunk {
    /// Message started with input token count (from message_start event)
    MessageStart { input_tokens: u64 },

    /// Text being generated
    TextDelta(String),

    /// Message complete with final stats
    MessageDone { stop_reason: StopReason, usage: TokenUsage },

    /// Error during streaming
    Error(String),
}
