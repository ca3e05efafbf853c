//! Autofix configuration
//!
//! Loaded from an optional YAML file. Every field is defaulted, so an empty
//! document (or no file at all) is a complete configuration:
//!
//! ```yaml
//! github:
//!   api_url: https://api.github.com
//!   timeout_secs: 30
//!
//! inference:
//!   temperature: 0.3
//!   max_tokens: 4000
//!
//! git:
//!   remote: origin
//!   author_name: AI Bot
//!
//! limits:
//!   fetch_log_chars: 10000
//!   summary_log_chars: 2000
//! ```
//!
//! Credentials never live in this file. They are read from the environment
//! through [`Credentials`] when a client first needs them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const OPENAI_KEY_ENV: &str = "OPENAI_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {file}: {error}")]
    Io {
        file: String,
        error: std::io::Error,
    },

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AutofixConfig {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AutofixConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            file: path.display().to_string(),
            error: e,
        })?;
        Self::from_yaml(&content).map_err(|e| ConfigError::Yaml {
            file: path.display().to_string(),
            error: e,
        })
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// GitHub REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,

    /// Page size used when listing repair history
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Upper bound on history pages scanned before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            timeout_secs: default_github_timeout(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_timeout() -> u64 {
    30
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

fn default_user_agent() -> String {
    concat!("workflow-autofix/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub api_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: default_inference_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_inference_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_inference_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_inference_timeout() -> u64 {
    120
}

fn default_system_prompt() -> String {
    "You are an expert CI/CD engineer specializing in GitHub Actions.".to_string()
}

/// Identity and remote used when committing a fix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Repository working directory (defaults to the current directory)
    #[serde(default)]
    pub workdir: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            author_name: default_author_name(),
            author_email: default_author_email(),
            workdir: None,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_author_name() -> String {
    "AI Bot".to_string()
}

fn default_author_email() -> String {
    "ai-bot@example.com".to_string()
}

/// Truncation caps, counted in characters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_fetch_log_chars")]
    pub fetch_log_chars: usize,

    #[serde(default = "default_summary_log_chars")]
    pub summary_log_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            fetch_log_chars: default_fetch_log_chars(),
            summary_log_chars: default_summary_log_chars(),
        }
    }
}

fn default_fetch_log_chars() -> usize {
    crate::snapshot::FETCH_LOG_CAP
}

fn default_summary_log_chars() -> usize {
    crate::engine::summary::SUMMARY_LOG_CAP
}

/// Environment-backed credentials, resolved lazily
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials;

impl Credentials {
    pub fn github_token() -> Result<String, ConfigError> {
        Self::require(GITHUB_TOKEN_ENV)
    }

    pub fn openai_key() -> Result<String, ConfigError> {
        Self::require(OPENAI_KEY_ENV)
    }

    fn require(name: &'static str) -> Result<String, ConfigError> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingCredential(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AutofixConfig::from_yaml("").unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.inference.max_tokens, 4000);
        assert!((config.inference.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.limits.fetch_log_chars, 10_000);
        assert_eq!(config.limits.summary_log_chars, 2_000);
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = AutofixConfig::from_yaml(
            r#"
github:
  api_url: https://ghe.example.com/api/v3
inference:
  max_tokens: 1000
git:
  author_name: Repair Bot
"#,
        )
        .unwrap();

        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.inference.max_tokens, 1000);
        assert_eq!(config.git.author_name, "Repair Bot");
        assert_eq!(config.git.author_email, "ai-bot@example.com");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("autofix.yaml");
        fs::write(&path, "limits:\n  fetch_log_chars: 500\n").unwrap();

        let config = AutofixConfig::load(&path).unwrap();
        assert_eq!(config.limits.fetch_log_chars, 500);
        assert_eq!(config.limits.summary_log_chars, 2_000);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("autofix.yaml");
        fs::write(&path, "github: [unterminated").unwrap();

        let err = AutofixConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AutofixConfig::load_or_default(None).unwrap();
        assert_eq!(config.github.per_page, 100);
    }
}
