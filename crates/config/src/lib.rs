//! Configuration loading, validation, and management for ragline.
//!
//! Loads configuration from `~/.ragline/config.toml` with environment
//! variable overrides. Validates all settings at startup. A missing API
//! credential is a fatal initialization error, never a per-request one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the hosted LLM (chat + embeddings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// LLM endpoint and model selection
    #[serde(default)]
    pub llm: LlmConfig,

    /// Vector store (Chroma) connection
    #[serde(default)]
    pub chroma: ChromaConfig,

    /// Retrieval behavior
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// HTTP gateway binding
    #[serde(default)]
    pub gateway: GatewayConfig,
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
            .field("api_key", &redact(&self.api_key))
            .field("llm", &self.llm)
            .field("chroma", &self.chroma)
            .field("retrieval", &self.retrieval)
            .field("tools", &self.tools)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat-completion model
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for the first completion round
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max output tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Outbound request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.upstage.ai/v1".into()
}
fn default_chat_model() -> String {
    "solar-pro2".into()
}
fn default_embedding_model() -> String {
    "embedding-query".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    500
}
fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaConfig {
    #[serde(default = "default_chroma_host")]
    pub host: String,

    #[serde(default = "default_chroma_port")]
    pub port: u16,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Store request timeout in seconds
    #[serde(default = "default_chroma_timeout")]
    pub request_timeout_secs: u64,
}

fn default_chroma_host() -> String {
    "localhost".into()
}
fn default_chroma_port() -> u16 {
    8800
}
fn default_collection_name() -> String {
    "upstage_embeddings".into()
}
fn default_chroma_timeout() -> u64 {
    30
}

impl ChromaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            host: default_chroma_host(),
            port: default_chroma_port(),
            collection_name: default_collection_name(),
            request_timeout_secs: default_chroma_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many documents to retrieve per query (top-K)
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
}

fn default_context_limit() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            context_limit: default_context_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Base URL of the time-lookup service
    #[serde(default = "default_time_api_url")]
    pub time_api_base_url: String,

    /// Per-call timeout for external tool HTTP requests, in seconds
    #[serde(default = "default_tool_timeout")]
    pub http_timeout_secs: u64,
}

fn default_time_api_url() -> String {
    "https://worldtimeapi.org/api/timezone".into()
}
fn default_tool_timeout() -> u64 {
    5
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            time_api_base_url: default_time_api_url(),
            http_timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}
fn default_gateway_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragline/config.toml).
    ///
    /// Environment variables override file values:
    /// - `RAGLINE_API_KEY` / `UPSTAGE_API_KEY` — LLM credential
    /// - `RAGLINE_MODEL` — chat model
    /// - `CHROMA_HOST`, `CHROMA_PORT`, `CHROMA_COLLECTION_NAME` — store
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("RAGLINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("UPSTAGE_API_KEY").ok());
        }
        if let Ok(model) = std::env::var("RAGLINE_MODEL") {
            self.llm.chat_model = model;
        }
        if let Ok(host) = std::env::var("CHROMA_HOST") {
            self.chroma.host = host;
        }
        if let Ok(port) = std::env::var("CHROMA_PORT") {
            if let Ok(port) = port.parse() {
                self.chroma.port = port;
            }
        }
        if let Ok(name) = std::env::var("CHROMA_COLLECTION_NAME") {
            self.chroma.collection_name = name;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragline")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.retrieval.context_limit == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.context_limit must be at least 1".into(),
            ));
        }
        if self.tools.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.http_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The LLM API key, or a fatal startup error when absent.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential("RAGLINE_API_KEY"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            llm: LlmConfig::default(),
            chroma: ChromaConfig::default(),
            retrieval: RetrievalConfig::default(),
            tools: ToolsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required credential: set {0}")]
    MissingCredential(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.chat_model, "solar-pro2");
        assert_eq!(config.chroma.port, 8800);
        assert_eq!(config.chroma.collection_name, "upstage_embeddings");
        assert_eq!(config.retrieval.context_limit, 3);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.chat_model, config.llm.chat_model);
        assert_eq!(parsed.chroma.port, config.chroma.port);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let config = AppConfig::default();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[test]
    fn present_api_key_passes() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            llm: LlmConfig {
                temperature: 5.0,
                ..LlmConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_context_limit_rejected() {
        let config = AppConfig {
            retrieval: RetrievalConfig { context_limit: 0 },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.llm.base_url, "https://api.upstage.ai/v1");
    }

    #[test]
    fn chroma_base_url_formatting() {
        let config = ChromaConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8800");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-very-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
api_key = "sk-file"

[chroma]
host = "chroma.internal"
port = 9000
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.chroma.host, "chroma.internal");
        assert_eq!(config.chroma.port, 9000);
        // untouched sections keep defaults
        assert_eq!(config.llm.chat_model, "solar-pro2");
        assert_eq!(config.tools.http_timeout_secs, 5);
    }
}
