//! Configuration loading and validation for SilverCare.
//!
//! Loads `silvercare.toml` from the working directory (or the path in
//! `SILVERCARE_CONFIG`) with environment variable overrides for secrets.
//! A missing file is not an error: defaults are usable out of the box, with
//! every provider route disabled until a key is supplied.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure. Maps directly to `silvercare.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation history bounds
    #[serde(default)]
    pub session: SessionConfig,

    /// Realtime search augmentation
    #[serde(default)]
    pub search: SearchConfig,

    /// Provider routes, in fixed priority order
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Static knowledge snippet injected into the persona at startup
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8001
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Max rounds kept per user; the stored turn list is bounded at twice this.
    #[serde(default = "default_max_history_rounds")]
    pub max_history_rounds: usize,

    /// Idle time after which a session is evicted.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

fn default_max_history_rounds() -> usize {
    10
}
fn default_ttl_hours() -> i64 {
    24
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history_rounds: default_max_history_rounds(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Tavily API key. Absent ⇒ augmentation is silently skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_timeout() -> u64 {
    10
}
fn default_max_results() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_search_timeout(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Route A — Aliyun DashScope, tried first.
    #[serde(default)]
    pub dashscope: ProviderConfig,

    /// Route B — OpenRouter, tried when route A fails or is unconfigured.
    #[serde(default)]
    pub openrouter: ProviderConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Plain-text policy snippet; treated as an opaque string by the core.
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("data/shanghai_policy_snippet.txt")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("session", &self.session)
            .field("search", &self.search)
            .field("providers", &self.providers)
            .field("knowledge", &self.knowledge)
            .finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `silvercare.toml` (or `SILVERCARE_CONFIG`).
    ///
    /// Environment variables override file values for secrets:
    /// - `DASHSCOPE_API_KEY`
    /// - `OPENROUTER_API_KEY`
    /// - `TAVILY_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SILVERCARE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("silvercare.toml"));
        let mut config = Self::load_from(&path)?;

        if config.providers.dashscope.api_key.is_none() {
            config.providers.dashscope.api_key = std::env::var("DASHSCOPE_API_KEY").ok();
        }
        if config.providers.openrouter.api_key.is_none() {
            config.providers.openrouter.api_key = std::env::var("OPENROUTER_API_KEY").ok();
        }
        if config.search.api_key.is_none() {
            config.search.api_key = std::env::var("TAVILY_API_KEY").ok();
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_history_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_history_rounds must be at least 1".into(),
            ));
        }
        if self.session.ttl_hours < 1 {
            return Err(ConfigError::ValidationError(
                "session.ttl_hours must be at least 1".into(),
            ));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.timeout_secs must be at least 1".into(),
            ));
        }
        if self.search.max_results == 0 || self.search.max_results > 10 {
            return Err(ConfigError::ValidationError(
                "search.max_results must be between 1 and 10".into(),
            ));
        }
        for (name, provider) in [
            ("dashscope", &self.providers.dashscope),
            ("openrouter", &self.providers.openrouter),
        ] {
            if provider.timeout_secs == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.timeout_secs must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Names of the provider routes whose credentials are present, in
    /// priority order. Presence of a key is what makes a route attemptable.
    pub fn active_routes(&self) -> Vec<&'static str> {
        let mut routes = Vec::new();
        if self.providers.dashscope.api_key.is_some() {
            routes.push("dashscope");
        }
        if self.providers.openrouter.api_key.is_some() {
            routes.push("openrouter");
        }
        routes
    }

    /// Generate a default config TOML string (for `silvercare onboard`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            session: SessionConfig::default(),
            search: SearchConfig::default(),
            providers: ProvidersConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.port, 8001);
        assert_eq!(config.session.max_history_rounds, 10);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.search.timeout_secs, 10);
        assert!(config.active_routes().is_empty());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(
            parsed.session.max_history_rounds,
            config.session.max_history_rounds
        );
    }

    #[test]
    fn zero_history_rounds_rejected() {
        let config = AppConfig {
            session: SessionConfig {
                max_history_rounds: 0,
                ttl_hours: 24,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_provider_timeout_rejected() {
        let mut config = AppConfig::default();
        config.providers.openrouter.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/silvercare.toml")).unwrap();
        assert_eq!(config.gateway.port, 8001);
    }

    #[test]
    fn parses_provider_section() {
        let toml_str = r#"
[gateway]
port = 9000

[providers.dashscope]
api_key = "sk-test"
model = "qwen-plus"

[providers.openrouter]
timeout_secs = 30
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.providers.dashscope.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.providers.dashscope.model.as_deref(), Some("qwen-plus"));
        assert_eq!(config.providers.openrouter.timeout_secs, Some(30));
        assert_eq!(config.active_routes(), vec!["dashscope"]);
    }

    #[test]
    fn active_routes_in_priority_order() {
        let mut config = AppConfig::default();
        config.providers.openrouter.api_key = Some("or-key".into());
        config.providers.dashscope.api_key = Some("ds-key".into());
        assert_eq!(config.active_routes(), vec!["dashscope", "openrouter"]);
    }

    #[test]
    fn secrets_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.providers.dashscope.api_key = Some("sk-very-secret".into());
        config.search.api_key = Some("tvly-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(!debug.contains("tvly-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("8001"));
        assert!(toml_str.contains("max_history_rounds"));
    }

    #[test]
    fn load_from_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silvercare.toml");
        std::fs::write(&path, "[session]\nmax_history_rounds = 5\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.session.max_history_rounds, 5);
        assert_eq!(config.session.ttl_hours, 24);
    }
}
