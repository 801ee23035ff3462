//! Critic reply parsing
//!
//! The Critic is asked to answer with an `## Assessment` section followed by a
//! `## Refined Plan` section. That structure is only requested in natural
//! language, so parsing degrades gracefully: when the marker is missing the
//! whole reply is treated as the refined plan.

use tracing::{debug, warn};

/// Heading that opens the critique section
pub const ASSESSMENT_HEADING: &str = "## Assessment";

/// Heading that opens the refined plan section
pub const REFINED_PLAN_MARKER: &str = "## Refined Plan";

/// A Critic reply split into its two sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticResult {
    /// Critique text; empty when the reply was not structured
    pub assessment: String,
    /// Improved plan; never empty for a non-blank reply
    pub refined_plan: String,
    /// Whether the refined-plan marker was found with content after it
    pub marker_found: bool,
}

impl CriticResult {
    /// Whether the reply followed the requested two-section layout
    pub fn is_structured(&self) -> bool {
        self.marker_found
    }
}

/// Split a raw Critic reply on the first refined-plan marker
///
/// Everything before the marker, minus the assessment heading, is the
/// assessment. Everything after it is the refined plan. A missing marker, or a
/// marker with nothing after it, falls back to the whole trimmed reply as the
/// refined plan with an empty assessment.
pub fn parse_critic_reply(raw: &str) -> CriticResult {
    debug!(raw_len = raw.len(), "parse_critic_reply: called");

    if let Some((before, after)) = raw.split_once(REFINED_PLAN_MARKER) {
        let refined_plan = after.trim();
        if !refined_plan.is_empty() {
            debug!("parse_critic_reply: marker found");
            return CriticResult {
                assessment: before.replace(ASSESSMENT_HEADING, "").trim().to_string(),
                refined_plan: refined_plan.to_string(),
                marker_found: true,
            };
        }
        warn!("Critic reply has an empty refined plan section, using the whole reply");
    } else {
        warn!("Critic reply is missing '{}', using the whole reply", REFINED_PLAN_MARKER);
    }

    CriticResult {
        assessment: String::new(),
        refined_plan: raw.trim().to_string(),
        marker_found: false,
    }
}
