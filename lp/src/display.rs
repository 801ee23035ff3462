//! Terminal presentation helpers

use colored::*;

use crate::familiarity::FAMILIARITY_LEVELS;
use crate::llm::LlmError;
use crate::pipeline::{PipelineError, Stage};

/// Width of dividers and rules
const RULE_WIDTH: usize = 60;

/// A labelled section divider
pub fn section(title: &str) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    format!("\n{}\n {}\n{}\n", rule.dimmed(), title.bold(), rule.dimmed())
}

/// The numbered familiarity menu, labels padded to a common width
pub fn familiarity_menu(topic: &str) -> String {
    let width = FAMILIARITY_LEVELS.iter().map(|l| l.label.len()).max().unwrap_or(0);

    let mut menu = format!("\nHow familiar are you with {}?\n\n", topic.cyan());
    for (i, level) in FAMILIARITY_LEVELS.iter().enumerate() {
        menu.push_str(&format!(
            "  {}. {:<width$}  —  {}\n",
            i + 1,
            level.label,
            level.description,
            width = width
        ));
    }
    menu
}

/// Prompt shown while waiting for a menu choice
pub fn selection_prompt() -> String {
    format!("Select [1-{}]: ", FAMILIARITY_LEVELS.len())
}

/// Message for an invalid menu choice
pub fn selection_error() -> String {
    format!("Please enter a number between 1 and {}.", FAMILIARITY_LEVELS.len())
}

/// Parse a menu answer into a 1-based ordinal
pub fn parse_selection(input: &str) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=FAMILIARITY_LEVELS.len()).contains(n))
}

/// The final refined plan block
pub fn plan_banner(topic: &str, refined_plan: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{}\n{}\n{}\n\n{}\n{}",
        format!("1-Week Learning Plan: {}", topic).bold(),
        rule,
        refined_plan,
        rule,
        "Plan complete. Good luck with your studies!".green()
    )
}

/// Warning shown when a stage stopped at its token budget
pub fn truncation_warning(stage: Stage) -> String {
    format!("Warning: the {} reply hit its token budget and may be cut short.", stage)
        .yellow()
        .to_string()
}

/// User-facing text for a failed run, without the `Error:` prefix
pub fn failure_message(err: &PipelineError) -> String {
    match err.llm_error() {
        Some(LlmError::Authentication { .. }) => format!(
            "invalid or missing API key.\nAdd it to your .env file: ANTHROPIC_API_KEY=your-key-here\n({})",
            err
        ),
        Some(LlmError::Connectivity(_)) => {
            "could not connect to the Anthropic API. Check your internet connection.".to_string()
        }
        Some(limited @ LlmError::RateLimited { .. }) => match limited.retry_after() {
            Some(delay) => format!(
                "rate limit reached. Wait a moment and try again (the API asked for {}s).",
                delay.as_secs()
            ),
            None => "rate limit reached. Wait a moment and try again.".to_string(),
        },
        Some(LlmError::ApiError { status, message }) => format!("API error {}: {}", status, message),
        _ => err.to_string(),
    }
}
