//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when no override template is found.

use tracing::debug;

/// System prompt for the Generator stage
pub const GENERATOR_SYSTEM: &str = "You are an expert learning coach and curriculum designer specialising in onboarding \
experienced developers into new topics. \
Your audience is an intermediate developer — comfortable with code, abstractions, and \
system design — but completely new to the requested topic. \
Design every plan so difficulty increases slowly and consistently across all five days: \
Day 1 is purely conceptual and confidence-building (no code, no configuration); \
Day 2 introduces the simplest hands-on 'hello world' style task; \
Days 3 and 4 add one new concept per day, each building directly on the last; \
Day 5 ties everything together with a small but realistic project that mirrors \
the kind of task found in a professional or enterprise codebase — leaving the learner \
ready to start contributing to production-grade software. \
Never introduce more than one new concept per day. \
Never make a day feel overwhelming. \
Always explain why each concept matters before showing how it works. \
Be concise but complete: finishing all five days is the top priority. \
Never sacrifice coverage of a day for extra detail on an earlier one.";

/// User prompt for the Generator stage
pub const GENERATOR: &str = r#"Create a structured 1-week learning plan for the topic: "{{topic}}"

Learner familiarity: {{familiarity_label}} — {{familiarity_description}}
{{familiarity_context}}

Cover Monday through Friday only. For each day provide exactly:

**Day: <Day name>**
- Focus: <one specific aspect of {{topic}} to concentrate on that day>
- Resources:
  1. <Resource name> — <one-sentence description and where to find it>
  2. <Resource name> — <one-sentence description and where to find it>
- Exercise: <a small, concrete hands-on activity completable in 30–60 minutes>

Build each day on the previous so the plan progresses logically and ends with the learner elevated in their understanding and ready to work confidently on real projects.
"#;

/// System prompt for the Critic stage
pub const CRITIC_SYSTEM: &str = "You are an expert learning plan critic. Your job is to rigorously evaluate a \
generated learning plan and produce a meaningfully improved version. \
Assess the plan on four criteria: \
(1) Difficulty progression — does it increase gradually across all five days without sudden spikes? \
(2) Resource quality — are the resources credible, specific, and genuinely useful rather than vague or generic? \
(3) Exercise practicality — can each exercise realistically be completed in 30–60 minutes \
and does it build real, transferable skill? \
(4) Confidence outcome — will someone who completes this plan feel genuinely ready to work \
professionally with the topic by Friday? \
Be specific and direct in your assessment. Name exactly what is weak and why. \
Then produce a refined plan that concretely fixes every issue you identified. \
The refined plan must use the same day-by-day format as the original.";

/// User prompt for the Critic stage
///
/// The two section headings must stay in sync with the markers in [`crate::critic`].
pub const CRITIC: &str = r#"Below is a 1-week learning plan for the topic "{{topic}}" written for a learner at the "{{familiarity_label}}" familiarity level.

Evaluate it, then produce an improved version. Your response must use this exact structure with no text outside it:

## Assessment
<Your critique covering difficulty progression, resource credibility, exercise practicality, and confidence outcome. Be specific about what is weak and why.>

## Refined Plan
<The improved Monday–Friday plan using the same format as the original. Fix every issue raised in your assessment.>

---
Original plan:
{{original_plan}}
"#;

/// Look up an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "generator-system" => Some(GENERATOR_SYSTEM),
        "generator" => Some(GENERATOR),
        "critic-system" => Some(CRITIC_SYSTEM),
        "critic" => Some(CRITIC),
        _ => {
            debug!(%name, "get_embedded: no embedded template");
            None
        }
    }
}
