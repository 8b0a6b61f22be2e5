//! Configuration loading from environment variables.

use anyhow::{bail, Context, Result};
use reqwest::Url;

pub const DEFAULT_PLANNER_URL: &str = "http://127.0.0.1:8080";

/// Where the planner service lives.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
}

impl ClientConfig {
    /// Load the client configuration from environment variables.
    ///
    /// Reads `PLANNER_URL`, either from the environment or from a `.env`
    /// file, and falls back to a planner on localhost.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup("PLANNER_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PLANNER_URL.to_string());

        let base_url =
            Url::parse(&raw).with_context(|| format!("PLANNER_URL is not a valid URL: {}", raw))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("PLANNER_URL must be an http or https URL: {}", raw);
        }

        Ok(Self { base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(url: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let url = url.map(str::to_string);
        move |key| match key {
            "PLANNER_URL" => url.clone(),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_to_localhost() {
        let config = ClientConfig::from_lookup(lookup(None)).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_blank_url_uses_default() {
        let config = ClientConfig::from_lookup(lookup(Some("   "))).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_reads_planner_url() {
        let config = ClientConfig::from_lookup(lookup(Some(" https://planner.school.ae "))).unwrap();
        assert_eq!(config.base_url.host_str(), Some("planner.school.ae"));
        assert_eq!(config.base_url.scheme(), "https");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(ClientConfig::from_lookup(lookup(Some("not a url"))).is_err());
        let err = ClientConfig::from_lookup(lookup(Some("ftp://files.local"))).unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}
