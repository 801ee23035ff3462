//! Integration tests for the Generator-then-Critic pipeline
//!
//! These drive the public API end to end with a scripted client standing in
//! for the remote model.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::sync::mpsc;

use learnplan::familiarity;
use learnplan::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, StreamChunk, TokenUsage};
use learnplan::output;
use learnplan::pipeline::{PipelineError, PipelineEvent, PlanPipeline, PlanRequest, Stage};

const DRAFT: &str = "## Monday\nInstall Redis and run PING.\n\n## Friday\nBuild a cache.";

const CRITIQUE: &str = "## Assessment\nDay 1 is too thin for a novice.\n\n## Refined Plan\n## Monday\nInstall Redis, learn keys and TTLs.\n\n## Friday\nBuild a cache with eviction.";

/// Replays canned replies and records every request it receives
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn next(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".to_string())))
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.next(request).map(CompletionResponse::text)
    }

    async fn stream(
        &self,
        request: CompletionRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<CompletionResponse, LlmError> {
        let text = self.next(request)?;
        for line in text.split_inclusive('\n') {
            let _ = chunk_tx.send(StreamChunk::TextDelta(line.to_string())).await;
        }
        let _ = chunk_tx
            .send(StreamChunk::MessageDone {
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
            .await;
        Ok(CompletionResponse::text(text))
    }
}

/// Streams part of a draft, then loses the connection
struct DroppedStream {
    sent: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmClient for DroppedStream {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse::text(CRITIQUE))
    }

    async fn stream(
        &self,
        _request: CompletionRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for line in DRAFT.split_inclusive('\n').take(self.sent) {
            let _ = chunk_tx.send(StreamChunk::TextDelta(line.to_string())).await;
        }
        let err = LlmError::Connectivity("connection reset by peer".to_string());
        let _ = chunk_tx.send(StreamChunk::Error(err.to_string())).await;
        Err(err)
    }
}

fn novice_request(topic: &str) -> PlanRequest {
    PlanRequest::new(topic, familiarity::from_ordinal(1).unwrap())
}

#[tokio::test]
async fn test_full_run_produces_refined_plan() {
    let client = ScriptedClient::new(vec![Ok(DRAFT.to_string()), Ok(CRITIQUE.to_string())]);
    let pipeline = PlanPipeline::new(client.clone());

    let outcome = pipeline.run(&novice_request("Redis")).await.unwrap();

    assert_eq!(outcome.original_plan, DRAFT);
    assert_eq!(outcome.assessment, "Day 1 is too thin for a novice.");
    assert!(outcome.refined_plan.starts_with("## Monday\nInstall Redis, learn keys"));
    assert!(!outcome.refined_plan.contains("## Refined Plan"));

    let seen = client.seen();
    assert_eq!(seen.len(), 2);
    let generator_user = seen[0].user_text().unwrap();
    assert!(generator_user.contains("Redis"));
    assert!(generator_user.contains("Novice"));
    let critic_user = seen[1].user_text().unwrap();
    assert!(critic_user.contains(DRAFT));
    assert!(seen[1].max_tokens > seen[0].max_tokens);
}

#[tokio::test]
async fn test_streamed_text_reaches_callback_in_order() {
    let client = ScriptedClient::new(vec![Ok(DRAFT.to_string()), Ok(CRITIQUE.to_string())]);
    let pipeline = PlanPipeline::new(client);

    let mut streamed = String::new();
    let mut stages = Vec::new();
    pipeline
        .run_with(&novice_request("Redis"), |event| match event {
            PipelineEvent::Text(text) => streamed.push_str(text),
            PipelineEvent::StageStarted(stage) => stages.push(format!("start {}", stage)),
            PipelineEvent::StageFinished(stage) => stages.push(format!("end {}", stage)),
            PipelineEvent::Truncated(stage) => stages.push(format!("truncated {}", stage)),
        })
        .await
        .unwrap();

    assert_eq!(streamed, DRAFT);
    assert_eq!(stages, vec!["start generator", "end generator", "start critic", "end critic"]);
}

#[tokio::test]
async fn test_critic_without_marker_falls_back_to_whole_reply() {
    let reply = "Here is a better plan.\n\n## Monday\nRead the docs.";
    let client = ScriptedClient::new(vec![Ok(DRAFT.to_string()), Ok(reply.to_string())]);
    let pipeline = PlanPipeline::new(client);

    let outcome = pipeline.run(&novice_request("Redis")).await.unwrap();

    assert_eq!(outcome.assessment, "");
    assert_eq!(outcome.refined_plan, reply);
}

#[tokio::test]
async fn test_generator_auth_failure_stops_before_critic() {
    let client = ScriptedClient::new(vec![
        Err(LlmError::Authentication {
            message: "invalid x-api-key".to_string(),
        }),
        Ok(CRITIQUE.to_string()),
    ]);
    let pipeline = PlanPipeline::new(client.clone());

    let err = pipeline.run(&novice_request("Redis")).await.unwrap_err();

    assert!(matches!(err.llm_error(), Some(LlmError::Authentication { .. })));
    assert_eq!(client.seen().len(), 1);
}

#[tokio::test]
async fn test_connection_lost_mid_draft_discards_partial_text() {
    let client = Arc::new(DroppedStream {
        sent: 3,
        calls: AtomicUsize::new(0),
    });
    let pipeline = PlanPipeline::new(client.clone());

    let mut streamed = String::new();
    let mut critic_started = false;
    let err = pipeline
        .run_with(&novice_request("Redis"), |event| match event {
            PipelineEvent::Text(text) => streamed.push_str(text),
            PipelineEvent::StageStarted(Stage::Critic) => critic_started = true,
            _ => {}
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Llm(LlmError::Connectivity(_))));
    assert!(!streamed.is_empty(), "partial draft was shown live before the failure");
    assert!(!critic_started);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_whitespace_critic_reply_is_generation_failure() {
    let client = ScriptedClient::new(vec![Ok(DRAFT.to_string()), Ok("  \n\t ".to_string())]);
    let pipeline = PlanPipeline::new(client);

    let err = pipeline.run(&novice_request("Redis")).await.unwrap_err();

    assert!(matches!(err, PipelineError::EmptyResponse { stage: Stage::Critic }));
}

#[tokio::test]
async fn test_refined_plan_saves_as_markdown() {
    let client = ScriptedClient::new(vec![Ok(DRAFT.to_string()), Ok(CRITIQUE.to_string())]);
    let pipeline = PlanPipeline::new(client);
    let request = novice_request("Redis Streams");

    let outcome = pipeline.run(&request).await.unwrap();

    let dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    let path = output::save_plan(dir.path(), &request.topic, request.familiarity, date, &outcome.refined_plan).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "learning-plan-redis-streams-2025-03-07.md"
    );
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("# 1-Week Learning Plan: Redis Streams\n\n"));
    assert!(saved.contains("*Generated on 2025-03-07 · Familiarity: Novice*"));
    assert!(saved.ends_with(&outcome.refined_plan));
}
