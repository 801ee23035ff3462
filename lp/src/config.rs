//! learnplan configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm::LlmError;

/// Main learnplan configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Pipeline and output settings
    pub plan: PlanConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider != "anthropic" {
            return Err(eyre::eyre!(
                "Unknown LLM provider: '{}'. Supported: anthropic",
                self.llm.provider
            ));
        }
        if self.plan.generator_max_tokens == 0 {
            return Err(eyre::eyre!("plan.generator-max-tokens must be greater than zero"));
        }
        // The critic reproduces the whole plan plus its critique
        if self.plan.critic_max_tokens <= self.plan.generator_max_tokens {
            return Err(eyre::eyre!(
                "plan.critic-max-tokens ({}) must be larger than plan.generator-max-tokens ({})",
                self.plan.critic_max_tokens,
                self.plan.generator_max_tokens
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed here; the full load reports them.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };
        paths
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|config| config.log_level)
    }

    /// Project-local `.learnplan.yml`, then `~/.config/learnplan/learnplan.yml`
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".learnplan.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("learnplan").join("learnplan.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API key, used when the variable is unset
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<String>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key_file: None,
            base_url: "https://api.anthropic.com".to_string(),
            timeout_ms: 300_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key once, for handing to the client constructor
    ///
    /// Checks the process environment, then `dotenv_path` (read without
    /// touching the environment), then `api-key-file`.
    pub fn resolve_api_key(&self, dotenv_path: Option<&Path>) -> Result<String, LlmError> {
        debug!(api_key_env = %self.api_key_env, ?dotenv_path, "resolve_api_key: called");
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            debug!("resolve_api_key: found in environment");
            return Ok(key.trim().to_string());
        }

        if let Some(key) = dotenv_path.and_then(|p| read_dotenv_key(p, &self.api_key_env)) {
            debug!("resolve_api_key: found in dotenv file");
            return Ok(key);
        }

        if let Some(ref file) = self.api_key_file {
            let path = expand_home(file);
            debug!(?path, "resolve_api_key: reading key file");
            let key = fs::read_to_string(&path).map_err(|e| LlmError::Authentication {
                message: format!("Failed to read API key file {}: {}", path.display(), e),
            })?;
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }

        Err(LlmError::Authentication {
            message: format!("API key not found. Set the {} environment variable.", self.api_key_env),
        })
    }
}

/// Look up one variable in a `.env` file
fn read_dotenv_key(path: &Path, name: &str) -> Option<String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            debug!(?path, error = %e, "read_dotenv_key: no usable dotenv file");
            return None;
        }
    };
    iter.filter_map(|item| item.ok())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Pipeline and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Token budget for the Generator stage
    #[serde(rename = "generator-max-tokens")]
    pub generator_max_tokens: u32,

    /// Token budget for the Critic stage
    #[serde(rename = "critic-max-tokens")]
    pub critic_max_tokens: u32,

    /// Directory saved plans are written to
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Directory with `.pmt` template overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<String>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            generator_max_tokens: 4096,
            critic_max_tokens: 8192,
            output_dir: ".".to_string(),
            prompts_dir: None,
        }
    }
}

impl PlanConfig {
    /// Output directory with `~/` resolved
    pub fn output_path(&self) -> PathBuf {
        expand_home(&self.output_dir)
    }

    /// Template override directory with `~/` resolved
    pub fn prompts_path(&self) -> Option<PathBuf> {
        self.prompts_dir.as_deref().map(expand_home)
    }
}

/// Resolve a leading `~/` against the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert!(config.llm.model.contains("haiku"));
        assert_eq!(config.plan.generator_max_tokens, 4096);
        assert_eq!(config.plan.critic_max_tokens, 8192);
        assert!(config.log_level.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-sonnet-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  timeout-ms: 60000

plan:
  generator-max-tokens: 2048
  critic-max-tokens: 6000
  output-dir: plans
  prompts-dir: .learnplan/prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-sonnet-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.timeout_ms, 60000);
        assert_eq!(config.plan.generator_max_tokens, 2048);
        assert_eq!(config.plan.output_path(), PathBuf::from("plans"));
        assert_eq!(config.plan.prompts_path(), Some(PathBuf::from(".learnplan/prompts")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-opus-4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.plan.critic_max_tokens, 8192);
    }

    #[test]
    fn test_validate_rejects_small_critic_budget() {
        let mut config = Config::default();
        config.plan.critic_max_tokens = config.plan.generator_max_tokens;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "openai".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lp.yml");
        fs::write(&path, "log-level: warn\nplan:\n  output-dir: /tmp/plans\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.plan.output_dir, "/tmp/plans");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_errors() {
        let missing = PathBuf::from("/nonexistent/learnplan.yml");
        assert!(Config::load(Some(&missing)).is_err());
        assert!(Config::load_log_level(Some(&missing)).is_none());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("plans"), PathBuf::from("plans"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/plans"), home.join("plans"));
        }
    }

    #[test]
    #[serial]
    fn test_resolve_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "LEARNPLAN_TEST_KEY_ENV".to_string(),
            ..LlmConfig::default()
        };
        unsafe { std::env::set_var("LEARNPLAN_TEST_KEY_ENV", " sk-env \n") };
        let key = config.resolve_api_key(None);
        unsafe { std::env::remove_var("LEARNPLAN_TEST_KEY_ENV") };
        assert_eq!(key.unwrap(), "sk-env");
    }

    #[test]
    #[serial]
    fn test_resolve_api_key_from_dotenv() {
        let dir = TempDir::new().unwrap();
        let dotenv = dir.path().join(".env");
        fs::write(&dotenv, "OTHER=1\nLEARNPLAN_TEST_KEY_DOTENV=sk-dotenv\n").unwrap();

        let config = LlmConfig {
            api_key_env: "LEARNPLAN_TEST_KEY_DOTENV".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(config.resolve_api_key(Some(&dotenv)).unwrap(), "sk-dotenv");
        // The process environment is left untouched
        assert!(std::env::var("LEARNPLAN_TEST_KEY_DOTENV").is_err());
    }

    #[test]
    #[serial]
    fn test_resolve_api_key_from_file() {
        let dir = TempDir::new().unwrap();
        let key_file = dir.path().join("key");
        fs::write(&key_file, "sk-file\n").unwrap();

        let config = LlmConfig {
            api_key_env: "LEARNPLAN_TEST_KEY_FILE".to_string(),
            api_key_file: Some(key_file.to_string_lossy().into_owned()),
            ..LlmConfig::default()
        };
        assert_eq!(config.resolve_api_key(Some(&dir.path().join(".env"))).unwrap(), "sk-file");
    }

    #[test]
    #[serial]
    fn test_resolve_api_key_missing() {
        let config = LlmConfig {
            api_key_env: "LEARNPLAN_TEST_KEY_MISSING".to_string(),
            ..LlmConfig::default()
        };
        let err = config.resolve_api_key(None).unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().contains("LEARNPLAN_TEST_KEY_MISSING"));
    }
}
