//! Configuration loading from environment variables.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for the Claude content source.
#[derive(Debug, Clone)]
pub struct AiSettings {
    /// `None` disables the API and uses template content
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4000,
            temperature: 0.7,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Service settings loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ai: AiSettings,
    /// Where generated files are written and served from
    pub output_dir: PathBuf,
    /// Optional JSON file overriding the month values
    pub values_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Reads `ANTHROPIC_API_KEY`, `ANTHROPIC_MODEL`, `ANTHROPIC_BASE_URL`,
    /// `ANTHROPIC_TIMEOUT_SECS`, `PLANNER_OUTPUT_DIR` and `PLANNER_VALUES_FILE`,
    /// either from the environment or from a `.env` file.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AiSettings::default();

        let timeout = match var("ANTHROPIC_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("ANTHROPIC_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.timeout,
        };

        let ai = AiSettings {
            api_key: var("ANTHROPIC_API_KEY"),
            model: var("ANTHROPIC_MODEL").unwrap_or(defaults.model),
            base_url: var("ANTHROPIC_BASE_URL").unwrap_or(defaults.base_url),
            timeout,
            ..defaults
        };

        Ok(Self {
            ai,
            output_dir: var("PLANNER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
            values_file: var("PLANNER_VALUES_FILE").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert!(settings.ai.api_key.is_none());
        assert_eq!(settings.ai.model, DEFAULT_MODEL);
        assert_eq!(settings.ai.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.ai.max_tokens, 4000);
        assert_eq!(settings.ai.timeout, Duration::from_secs(120));
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert!(settings.values_file.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MODEL", "claude-test"),
            ("ANTHROPIC_TIMEOUT_SECS", "5"),
            ("PLANNER_OUTPUT_DIR", "/tmp/plans"),
            ("PLANNER_VALUES_FILE", "values.json"),
        ]))
        .unwrap();

        assert_eq!(settings.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.ai.model, "claude-test");
        assert_eq!(settings.ai.timeout, Duration::from_secs(5));
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/plans"));
        assert_eq!(settings.values_file, Some(PathBuf::from("values.json")));
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let settings = Settings::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert!(settings.ai.api_key.is_none());
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        assert!(Settings::from_lookup(lookup(&[("ANTHROPIC_TIMEOUT_SECS", "soon")])).is_err());
    }
}
