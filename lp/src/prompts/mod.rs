//! Prompt composition for the Generator and Critic stages

pub mod embedded;
mod loader;

pub use loader::{ComposedPrompt, PromptContext, PromptError, PromptLoader, PromptRole};

use crate::familiarity::FamiliarityLevel;

/// Build the Generator payload from the embedded templates
pub fn compose_generator_prompt(topic: &str, familiarity: &FamiliarityLevel) -> Result<ComposedPrompt, PromptError> {
    PromptLoader::embedded_only().generator_prompt(topic, familiarity)
}

/// Build the Critic payload from the embedded templates
pub fn compose_critic_prompt(
    topic: &str,
    familiarity: &FamiliarityLevel,
    original_plan: &str,
) -> Result<ComposedPrompt, PromptError> {
    PromptLoader::embedded_only().critic_prompt(topic, familiarity, original_plan)
}
