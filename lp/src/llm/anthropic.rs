//! Anthropic Claude API client implementation
//!
//! Implements the LlmClient trait for Anthropic's Messages API with
//! support for both blocking and streaming responses. Failures are
//! classified into [`LlmError`] and returned as-is; nothing is retried.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest_eventsource::{Event, EventSource, retry};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, StreamChunk, TokenUsage};
use crate::config::LlmConfig;

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl AnthropicClient {
    /// Create a new client from configuration and an already-resolved API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "AnthropicClient::new: called");
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Authentication {
                message: "API key is empty".to_string(),
            });
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": request.system_prompt,
            "messages": request.messages,
        })
    }

    fn post(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
    }

    /// Parse the Anthropic API response
    fn parse_response(&self, api_response: AnthropicResponse) -> CompletionResponse {
        debug!(?api_response.stop_reason, "parse_response: called");
        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => {
                    debug!("parse_response: skipping non-text block");
                    None
                }
            })
            .collect();

        CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            stop_reason: api_response
                .stop_reason
                .as_deref()
                .map(StopReason::from_anthropic)
                .unwrap_or(StopReason::EndTurn),
            usage: TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            },
        }
    }
}

/// Read the `retry-after` header, in seconds
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Pull the human-readable message out of an API error body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Turn a failed HTTP response into an LlmError
async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let retry = retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    debug!(%status, "error_from_response: called");
    LlmError::from_status(status, api_error_message(&body), retry)
}

/// Map an in-stream `error` event to the status the API would have returned
fn stream_error(data: &serde_json::Value) -> LlmError {
    let kind = data["error"]["type"].as_str().unwrap_or("api_error");
    let message = data["error"]["message"].as_str().unwrap_or(kind).to_string();
    debug!(%kind, "stream_error: called");
    let status = match kind {
        "invalid_request_error" => 400,
        "authentication_error" => 401,
        "permission_error" => 403,
        "not_found_error" => 404,
        "request_too_large" => 413,
        "rate_limit_error" => 429,
        "overloaded_error" => 529,
        _ => 500,
    };
    LlmError::from_status(status, message, None)
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let body = self.build_request_body(&request);

        let response = self.post(&body).send().await?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            debug!(error = %err, "complete: API error");
            return Err(err);
        }

        debug!("complete: success");
        let api_response: AnthropicResponse = response.json().await?;
        Ok(self.parse_response(api_response))
    }

    async fn stream(
        &self,
        request: CompletionRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "stream: called");
        let mut body = self.build_request_body(&request);
        body["stream"] = serde_json::json!(true);

        let mut es = EventSource::new(self.post(&body)).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        es.set_retry_policy(Box::new(retry::Never));

        let mut full_content = String::new();
        let mut stop_reason = StopReason::EndTurn;
        let mut usage = TokenUsage::default();
        let mut finished = false;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("stream: Event::Open");
                }
                Ok(Event::Message(msg)) => {
                    let data: serde_json::Value = serde_json::from_str(&msg.data)?;

                    match data["type"].as_str() {
                        Some("message_start") => {
                            debug!("stream: message_start");
                            if let Some(u) = data["message"].get("usage") {
                                usage.input_tokens = u["input_tokens"].as_u64().unwrap_or(0);
                                let _ = chunk_tx
                                    .send(StreamChunk::MessageStart {
                                        input_tokens: usage.input_tokens,
                                    })
                                    .await;
                            }
                        }
                        Some("content_block_delta") => {
                            if let Some(text) = data["delta"]["text"].as_str() {
                                full_content.push_str(text);
                                let _ = chunk_tx.send(StreamChunk::TextDelta(text.to_string())).await;
                            }
                        }
                        Some("message_delta") => {
                            debug!("stream: message_delta");
                            if let Some(sr) = data["delta"]["stop_reason"].as_str() {
                                stop_reason = StopReason::from_anthropic(sr);
                            }
                            if let Some(u) = data.get("usage") {
                                usage.output_tokens = u["output_tokens"].as_u64().unwrap_or(0);
                            }
                        }
                        Some("message_stop") => {
                            debug!("stream: message_stop");
                            finished = true;
                            break;
                        }
                        Some("error") => {
                            let err = stream_error(&data);
                            debug!(error = %err, "stream: error event");
                            es.close();
                            let _ = chunk_tx.send(StreamChunk::Error(err.to_string())).await;
                            return Err(err);
                        }
                        _ => {
                            debug!("stream: ignored event type");
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("stream: remote closed the stream");
                    break;
                }
                Err(e) => {
                    es.close();
                    let err = match e {
                        reqwest_eventsource::Error::InvalidStatusCode(_, response) => {
                            error_from_response(response).await
                        }
                        reqwest_eventsource::Error::Transport(e) => LlmError::from(e),
                        other => LlmError::InvalidResponse(other.to_string()),
                    };
                    debug!(error = %err, "stream: failed");
                    let _ = chunk_tx.send(StreamChunk::Error(err.to_string())).await;
                    return Err(err);
                }
            }
        }
        es.close();

        if !finished {
            warn!(
                content_len = full_content.len(),
                "Stream ended without message_stop, keeping received text"
            );
        }

        debug!("stream: complete");
        let _ = chunk_tx
            .send(StreamChunk::MessageDone {
                stop_reason: stop_reason.clone(),
                usage: usage.clone(),
            })
            .await;

        Ok(CompletionResponse {
            content: if full_content.is_empty() { None } else { Some(full_content) },
            stop_reason,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
