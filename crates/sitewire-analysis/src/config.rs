//! Analyzer configuration loaded from environment variables.
//!
//! All settings have defaults so the core can start with zero configuration;
//! without an API key the composition root selects the offline strategy and
//! every report is produced from the canned fallback.

use std::time::Duration;

/// Remote analyzer configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// API key for the vision model.
    /// Env: `ANALYSIS_API_KEY`
    /// Default: unset (offline analysis).
    pub api_key: Option<String>,

    /// Model identifier sent in the request path.
    /// Env: `ANALYSIS_MODEL`
    /// Default: `gemini-1.5-flash`
    pub model: String,

    /// Base URL of the generative-language API.
    /// Env: `ANALYSIS_ENDPOINT`
    /// Default: `https://generativelanguage.googleapis.com`
    pub endpoint: String,

    /// Whole-request timeout.
    /// Env: `ANALYSIS_TIMEOUT_SECS`
    /// Default: 30 seconds.
    pub request_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("ANALYSIS_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(model) = std::env::var("ANALYSIS_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }

        if let Ok(endpoint) = std::env::var("ANALYSIS_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint.trim().to_string();
            }
        }

        if let Ok(secs) = std::env::var("ANALYSIS_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(n) if n > 0 => config.request_timeout = Duration::from_secs(n),
                _ => {
                    tracing::warn!(
                        value = %secs,
                        "Invalid ANALYSIS_TIMEOUT_SECS, using default"
                    );
                }
            }
        }

        config
    }

    /// Whether a remote analyzer can be used at all.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
