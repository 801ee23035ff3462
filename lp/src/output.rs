//! Saving refined plans as markdown

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use eyre::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::familiarity::FamiliarityLevel;

/// Longest slug kept in a filename
const MAX_SLUG_CHARS: usize = 50;

static NON_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATOR_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").expect("valid regex"));

/// Convert a topic into a filename fragment
///
/// Lower-cases, drops anything that is not a word character, whitespace or
/// hyphen, collapses separator runs into single hyphens, keeps the first 50
/// characters and trims hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = SEPARATOR_RUNS.replace_all(&stripped, "-");
    let truncated: String = hyphenated.chars().take(MAX_SLUG_CHARS).collect();
    truncated.trim_matches('-').to_string()
}

/// `learning-plan-<slug>-<YYYY-MM-DD>.md`
pub fn plan_filename(topic: &str, date: NaiveDate) -> String {
    format!("learning-plan-{}-{}.md", slugify(topic), date.format("%Y-%m-%d"))
}

/// Render the saved document
pub fn render_markdown(topic: &str, familiarity: &FamiliarityLevel, date: NaiveDate, refined_plan: &str) -> String {
    format!(
        "# 1-Week Learning Plan: {}\n\n*Generated on {} · Familiarity: {}*\n\n{}",
        topic,
        date.format("%Y-%m-%d"),
        familiarity.label,
        refined_plan
    )
}

/// Write the refined plan into `dir`, returning the absolute path written
pub fn save_plan(
    dir: &Path,
    topic: &str,
    familiarity: &FamiliarityLevel,
    date: NaiveDate,
    refined_plan: &str,
) -> Result<PathBuf> {
    debug!(?dir, %topic, "save_plan: called");
    fs::create_dir_all(dir).context(format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(plan_filename(topic, date));
    fs::write(&path, render_markdown(topic, familiarity, date, refined_plan))
        .context(format!("Failed to write {}", path.display()))?;

    let path = path.canonicalize().unwrap_or(path);
    info!("Saved plan to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::familiarity::FAMILIARITY_LEVELS;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("Docker Compose & Kubernetes!"), "docker-compose-kubernetes");
        assert_eq!(slugify("Python programming"), "python-programming");
        assert_eq!(slugify("  C++ / Rust__FFI -- basics "), "c-rust-ffi-basics");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates_then_trims() {
        let topic = format!("{} tail", "a".repeat(49));
        // 49 letters + '-' is cut at 50, then the trailing hyphen is trimmed
        assert_eq!(slugify(&topic), "a".repeat(49));
    }

    #[test]
    fn test_slugify_keeps_unicode_words() {
        assert_eq!(slugify("Café Élan"), "café-élan");
    }

    #[test]
    fn test_plan_filename() {
        assert_eq!(plan_filename("Redis", date()), "learning-plan-redis-2026-10-16.md");
    }

    #[test]
    fn test_render_markdown() {
        let md = render_markdown("Redis", &FAMILIARITY_LEVELS[0], date(), "**Day: Monday**");
        assert_eq!(
            md,
            "# 1-Week Learning Plan: Redis\n\n*Generated on 2026-10-16 · Familiarity: Novice*\n\n**Day: Monday**"
        );
    }

    #[test]
    fn test_save_plan() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("plans");

        let path = save_plan(&out, "Go Concurrency", &FAMILIARITY_LEVELS[2], date(), "plan body").unwrap();

        assert!(path.is_absolute());
        assert!(path.ends_with("learning-plan-go-concurrency-2026-10-16.md"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# 1-Week Learning Plan: Go Concurrency\n"));
        assert!(content.contains("Familiarity: Quite familiar"));
        assert!(content.ends_with("plan body"));
    }

    proptest! {
        #[test]
        fn prop_slug_shape(topic in "[a-zA-Z0-9 _&!.,/-]{0,120}") {
            let slug = slugify(&topic);
            prop_assert!(slug.chars().count() <= MAX_SLUG_CHARS);
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
