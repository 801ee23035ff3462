//! Learner familiarity profiles
//!
//! A fixed, ordered catalog of three familiarity tiers. Each tier carries the
//! text used to steer the pace and tone of a generated plan. Entries are
//! selected by 1-based ordinal, matching the numbered menu shown to the user.

use thiserror::Error;
use tracing::debug;

/// A learner familiarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamiliarityLevel {
    /// Short name shown in menus and the saved plan byline
    pub label: &'static str,

    /// One-line summary shown next to the label in the menu
    pub description: &'static str,

    /// Steering instructions interpolated into the generator prompt
    pub context: &'static str,
}

/// Errors from catalog lookups
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FamiliarityError {
    #[error("Familiarity ordinal {ordinal} out of range (expected 1-{max})")]
    OutOfRange { ordinal: usize, max: usize },
}

/// All familiarity tiers, in menu order
pub const FAMILIARITY_LEVELS: [FamiliarityLevel; 3] = [
    FamiliarityLevel {
        label: "Novice",
        description: "Never worked with it before",
        context: "The learner has never worked with this topic before. \
                  Assume zero prior knowledge of the topic itself, though they are a competent developer. \
                  Day 1 must build confidence through pure concepts — no setup, no code. \
                  Every term introduced must be briefly defined. \
                  By the end of the week they should feel genuinely ready to contribute to a real codebase.",
    },
    FamiliarityLevel {
        label: "A little familiar",
        description: "Seen it or done a quick tutorial",
        context: "The learner has a passing familiarity — perhaps followed a getting-started tutorial \
                  or read an overview — but has never built anything real with this topic. \
                  Day 1 should consolidate and sharpen existing mental models rather than re-explain basics. \
                  Pick up pace gradually from Day 2 onward, filling gaps and building toward production patterns. \
                  By the end of the week they should feel confident enough to own a feature in a professional project.",
    },
    FamiliarityLevel {
        label: "Quite familiar",
        description: "Used it in small projects or prototypes",
        context: "The learner has used this topic in small projects and understands the core mechanics. \
                  Day 1 should challenge and deepen existing knowledge — focus on mental models, edge cases, \
                  or common misconceptions rather than re-covering ground they already know. \
                  Progress quickly toward advanced patterns, best practices, and production-readiness. \
                  By the end of the week they should feel ready to architect and lead work in this area.",
    },
];

/// Number of catalog entries
pub fn count() -> usize {
    FAMILIARITY_LEVELS.len()
}

/// Look up a tier by 1-based ordinal
pub fn from_ordinal(ordinal: usize) -> Result<&'static FamiliarityLevel, FamiliarityError> {
    debug!(%ordinal, "from_ordinal: called");
    ordinal
        .checked_sub(1)
        .and_then(|idx| FAMILIARITY_LEVELS.get(idx))
        .ok_or_else(|| {
            debug!(%ordinal, "from_ordinal: out of range");
            FamiliarityError::OutOfRange {
                ordinal,
                max: FAMILIARITY_LEVELS.len(),
            }
        })
}

impl std::fmt::Display for FamiliarityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
