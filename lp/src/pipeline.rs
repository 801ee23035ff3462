//! Two-stage plan pipeline
//!
//! Runs the Generator stage (streamed) and then the Critic stage (single
//! response) against one [`LlmClient`]. The Critic prompt embeds the complete
//! Generator output, so the stages are strictly sequential and at most one
//! remote call is outstanding at a time. Nothing is retried or cached.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::PlanConfig;
use crate::critic::{CriticResult, parse_critic_reply};
use crate::familiarity::FamiliarityLevel;
use crate::llm::{CompletionRequest, LlmClient, LlmError, StopReason, StreamChunk, TokenUsage};
use crate::prompts::{PromptError, PromptLoader};

/// Buffered stream chunks between the client and the accumulator
const STREAM_BUFFER: usize = 256;

/// Pipeline stage, used in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Critic,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generator => write!(f, "generator"),
            Self::Critic => write!(f, "critic"),
        }
    }
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent<'a> {
    StageStarted(Stage),
    /// A Generator text increment, in arrival order
    Text(&'a str),
    /// The stage stopped at its token budget; its text may be cut short
    Truncated(Stage),
    StageFinished(Stage),
}

/// Errors that end a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Remote call failed; the client's error is passed through unchanged
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The model finished without producing any text
    #[error("The {stage} stage returned no content")]
    EmptyResponse { stage: Stage },

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl PipelineError {
    /// The underlying remote-call error, if that is what failed
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            Self::Llm(e) => Some(e),
            _ => None,
        }
    }
}

/// Input for one pipeline run
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub topic: String,
    pub familiarity: &'static FamiliarityLevel,
    /// Show the draft and assessment as well as the refined plan
    pub verbose: bool,
    /// Persist the refined plan once both stages succeed
    pub save: bool,
}

impl PlanRequest {
    pub fn new(topic: impl Into<String>, familiarity: &'static FamiliarityLevel) -> Self {
        Self {
            topic: topic.into(),
            familiarity,
            verbose: false,
            save: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Generator draft, exactly as streamed
    pub original_plan: String,
    /// Critic's critique; empty when the reply was unstructured
    pub assessment: String,
    /// Final plan shown to and saved for the user
    pub refined_plan: String,
    pub generator_usage: TokenUsage,
    pub critic_usage: TokenUsage,
}

/// Generator then Critic, over a shared client
pub struct PlanPipeline {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    generator_max_tokens: u32,
    critic_max_tokens: u32,
}

impl PlanPipeline {
    /// Pipeline with embedded prompts and default token budgets
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::from_config(llm, &PlanConfig::default())
    }

    /// Pipeline using the budgets and template overrides from config
    pub fn from_config(llm: Arc<dyn LlmClient>, config: &PlanConfig) -> Self {
        debug!(
            generator_max_tokens = config.generator_max_tokens,
            critic_max_tokens = config.critic_max_tokens,
            "PlanPipeline::from_config: called"
        );
        let prompts = match config.prompts_path() {
            Some(dir) => PromptLoader::new(dir),
            None => PromptLoader::embedded_only(),
        };
        Self {
            llm,
            prompts,
            generator_max_tokens: config.generator_max_tokens,
            critic_max_tokens: config.critic_max_tokens,
        }
    }

    /// Run both stages without live output
    pub async fn run(&self, request: &PlanRequest) -> Result<PlanOutcome, PipelineError> {
        self.run_with(request, |_| {}).await
    }

    /// Run both stages, reporting progress and each Generator text increment
    /// to `on_event` as it happens
    pub async fn run_with<F>(&self, request: &PlanRequest, mut on_event: F) -> Result<PlanOutcome, PipelineError>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        debug!(topic = %request.topic, familiarity = %request.familiarity.label, "PlanPipeline::run_with: called");

        on_event(PipelineEvent::StageStarted(Stage::Generator));
        let (original_plan, generator_usage) = self.generate(request, &mut on_event).await?;
        on_event(PipelineEvent::StageFinished(Stage::Generator));

        on_event(PipelineEvent::StageStarted(Stage::Critic));
        let (critique, critic_usage) = self.critique(request, &original_plan, &mut on_event).await?;
        on_event(PipelineEvent::StageFinished(Stage::Critic));

        Ok(PlanOutcome {
            original_plan,
            assessment: critique.assessment,
            refined_plan: critique.refined_plan,
            generator_usage,
            critic_usage,
        })
    }

    /// Generator stage: stream the draft and accumulate it losslessly
    async fn generate<F>(&self, request: &PlanRequest, on_event: &mut F) -> Result<(String, TokenUsage), PipelineError>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        let prompt = self.prompts.generator_prompt(&request.topic, request.familiarity)?;
        let completion = CompletionRequest::single(prompt.system, prompt.user, self.generator_max_tokens);
        info!("Generator stage started for '{}'", request.topic);

        let (chunk_tx, mut chunk_rx) = mpsc::channel(STREAM_BUFFER);
        let collect = async {
            let mut text = String::new();
            let mut truncated = false;
            while let Some(chunk) = chunk_rx.recv().await {
                match chunk {
                    StreamChunk::MessageStart { input_tokens } => {
                        debug!(%input_tokens, "generate: stream started");
                    }
                    StreamChunk::TextDelta(delta) => {
                        on_event(PipelineEvent::Text(&delta));
                        text.push_str(&delta);
                    }
                    StreamChunk::MessageDone { stop_reason, usage } => {
                        debug!(?stop_reason, output_tokens = usage.output_tokens, "generate: stream done");
                        truncated = stop_reason == StopReason::MaxTokens;
                    }
                    StreamChunk::Error(message) => {
                        warn!(error = %message, chars_so_far = text.len(), "Generator stream failed, discarding partial draft");
                    }
                }
            }
            (text, truncated)
        };

        // The sender is dropped when the client returns, which ends `collect`
        let (result, (streamed, truncated)) = tokio::join!(self.llm.stream(completion, chunk_tx), collect);
        let response = result?;

        let text = if streamed.is_empty() {
            debug!("generate: no deltas received, using response content");
            response.content.unwrap_or_default()
        } else {
            streamed
        };

        if text.trim().is_empty() {
            return Err(PipelineError::EmptyResponse {
                stage: Stage::Generator,
            });
        }

        if truncated || response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.generator_max_tokens, "Generator draft hit its token budget");
            on_event(PipelineEvent::Truncated(Stage::Generator));
        }

        info!(
            "Generator stage finished: {} chars, {} output tokens (~${:.4})",
            text.len(),
            response.usage.output_tokens,
            response.usage.cost_usd(self.llm.model())
        );
        Ok((text, response.usage))
    }

    /// Critic stage: one non-streaming call, then split the reply
    async fn critique<F>(
        &self,
        request: &PlanRequest,
        original_plan: &str,
        on_event: &mut F,
    ) -> Result<(CriticResult, TokenUsage), PipelineError>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        let prompt = self
            .prompts
            .critic_prompt(&request.topic, request.familiarity, original_plan)?;
        let completion = CompletionRequest::single(prompt.system, prompt.user, self.critic_max_tokens);
        info!("Critic stage started for '{}'", request.topic);

        let response = self.llm.complete(completion).await?;
        let raw = response.content.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(PipelineError::EmptyResponse { stage: Stage::Critic });
        }

        if response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.critic_max_tokens, "Critic reply hit its token budget");
            on_event(PipelineEvent::Truncated(Stage::Critic));
        }

        let critique = parse_critic_reply(&raw);
        info!(
            "Critic stage finished: structured={}, {} output tokens (~${:.4})",
            critique.is_structured(),
            response.usage.output_tokens,
            response.usage.cost_usd(self.llm.model())
        );
        Ok((critique, response.usage))
    }
}
