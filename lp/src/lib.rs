//! learnplan - two-agent learning plan generator
//!
//! A Generator agent drafts a Monday-to-Friday learning plan for a topic,
//! tuned to the learner's familiarity. A Critic agent then assesses the draft
//! and rewrites it. The refined plan is always the final output; the draft and
//! the assessment are kept for anyone who wants to see them.
//!
//! # Modules
//!
//! - [`familiarity`] - Fixed catalog of learner familiarity tiers
//! - [`prompts`] - Generator and Critic prompt composition
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`critic`] - Splitting a Critic reply into assessment and refined plan
//! - [`pipeline`] - The Generator-then-Critic orchestration
//! - [`output`] - Markdown persistence of refined plans
//! - [`display`] - Terminal presentation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod critic;
pub mod display;
pub mod familiarity;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PlanConfig};
pub use critic::{CriticResult, parse_critic_reply};
pub use familiarity::{FAMILIARITY_LEVELS, FamiliarityError, FamiliarityLevel};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, StreamChunk, create_client};
pub use output::{plan_filename, save_plan, slugify};
pub use pipeline::{PipelineError, PipelineEvent, PlanOutcome, PlanPipeline, PlanRequest, Stage};
pub use prompts::{ComposedPrompt, PromptError, PromptLoader, compose_critic_prompt, compose_generator_prompt};
