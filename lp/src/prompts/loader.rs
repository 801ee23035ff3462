//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to embedded
//! defaults, then renders them with Handlebars.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::embedded;
use crate::familiarity::FamiliarityLevel;

/// Errors from prompt composition
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Prompt template not found: {0}")]
    NotFound(String),

    #[error("Failed to read prompt {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {name}: {message}")]
    Template { name: String, message: String },
}

/// Which side of the pipeline a prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    Generator,
    Critic,
}

impl PromptRole {
    /// Template name of the system instruction for this role
    pub fn system_template(&self) -> &'static str {
        match self {
            Self::Generator => "generator-system",
            Self::Critic => "critic-system",
        }
    }

    /// Template name of the user message for this role
    pub fn user_template(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Critic => "critic",
        }
    }
}

/// Variables available to every template
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext<'a> {
    pub topic: &'a str,
    pub familiarity_label: &'a str,
    pub familiarity_description: &'a str,
    pub familiarity_context: &'a str,
    /// Generator output, only set for the Critic stage
    pub original_plan: Option<&'a str>,
}

impl<'a> PromptContext<'a> {
    pub fn new(topic: &'a str, familiarity: &'a FamiliarityLevel) -> Self {
        Self {
            topic,
            familiarity_label: familiarity.label,
            familiarity_description: familiarity.description,
            familiarity_context: familiarity.context,
            original_plan: None,
        }
    }

    pub fn with_original_plan(mut self, original_plan: &'a str) -> Self {
        self.original_plan = Some(original_plan);
        self
    }
}

/// A rendered payload for one model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Fixed system instruction for the role
    pub system: String,
    /// Interpolated user message
    pub user: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directory holding `{name}.pmt` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded templates
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let exists = dir.is_dir();
        debug!(?dir, %exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            override_dir: if exists { Some(dir.to_path_buf()) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle topics like "C & C++"
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String, PromptError> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source });
            }
            debug!(?path, "PromptLoader::load_template: no override");
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext<'_>) -> Result<String, PromptError> {
        debug!(%template_name, topic = %context.topic, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        self.hbs
            .render_template(&template, context)
            .map_err(|e| PromptError::Template {
                name: template_name.to_string(),
                message: e.to_string(),
            })
    }

    fn compose(&self, role: PromptRole, context: &PromptContext<'_>) -> Result<ComposedPrompt, PromptError> {
        if context.topic.trim().is_empty() {
            debug!(?role, "PromptLoader::compose: empty topic");
            return Err(PromptError::EmptyTopic);
        }

        let system = self.render(role.system_template(), context)?;
        let user = self.render(role.user_template(), context)?;
        info!(
            "Composed {:?} prompt for '{}' ({} chars)",
            role,
            context.topic,
            system.len() + user.len()
        );
        Ok(ComposedPrompt { system, user })
    }

    /// Build the Generator payload for a topic and familiarity tier
    pub fn generator_prompt(&self, topic: &str, familiarity: &FamiliarityLevel) -> Result<ComposedPrompt, PromptError> {
        debug!(%topic, label = %familiarity.label, "PromptLoader::generator_prompt: called");
        self.compose(PromptRole::Generator, &PromptContext::new(topic, familiarity))
    }

    /// Build the Critic payload embedding the Generator's full output verbatim
    pub fn critic_prompt(
        &self,
        topic: &str,
        familiarity: &FamiliarityLevel,
        original_plan: &str,
    ) -> Result<ComposedPrompt, PromptError> {
        debug!(%topic, plan_len = original_plan.len(), "PromptLoader::critic_prompt: called");
        let context = PromptContext::new(topic, familiarity).with_original_plan(original_plan);
        self.compose(PromptRole::Critic, &context)
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
