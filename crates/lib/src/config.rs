//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.sakhi/config.json`) and environment.
//! The server, provider, and widget sections are independent; each front end reads what it needs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Chat server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream chat-completions provider used by the server.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chat widget settings (endpoint, display labels).
    #[serde(default)]
    pub widget: WidgetConfig,
}

/// Chat server bind address and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8000
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// OpenAI-compatible chat-completions provider (Groq by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Full chat-completions URL.
    #[serde(default = "default_provider_api_url")]
    pub api_url: String,

    /// API key. Overridden by GROQ_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model id passed as-is to the provider.
    #[serde(default = "default_provider_model")]
    pub model: String,

    #[serde(default = "default_provider_temperature")]
    pub temperature: f32,

    /// System message sent before every user message.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Per-request timeout in seconds (default 30). 0 disables the timeout.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_provider_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_provider_temperature() -> f32 {
    0.8
}

fn default_system_prompt() -> String {
    "You are SakhiChat, a funny and helpful chatbot that makes witty jokes and puns.".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_provider_api_url(),
            api_key: None,
            model: default_provider_model(),
            temperature: default_provider_temperature(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Chat widget: where messages go and how the transcript labels them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Chat endpoint URL. Overridden by SAKHI_ENDPOINT env.
    #[serde(default = "default_widget_endpoint")]
    pub endpoint: String,

    /// Label shown before the user's own messages.
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Label shown before replies and error blocks.
    #[serde(default = "default_bot_label")]
    pub bot_label: String,

    /// Request timeout in seconds (default 60). 0 disables the timeout.
    #[serde(default = "default_widget_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_widget_endpoint() -> String {
    "http://127.0.0.1:8000/chat".to_string()
}

fn default_user_label() -> String {
    "You".to_string()
}

fn default_bot_label() -> String {
    "SakhiChat".to_string()
}

fn default_widget_timeout_secs() -> u64 {
    60
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_widget_endpoint(),
            user_label: default_user_label(),
            bot_label: default_bot_label(),
            timeout_secs: default_widget_timeout_secs(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the provider API key: env GROQ_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    api_key_from(non_empty_env("GROQ_API_KEY"), config)
}

fn api_key_from(env_key: Option<String>, config: &Config) -> Option<String> {
    env_key.or_else(|| {
        config
            .provider
            .api_key
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Resolve the widget endpoint: env SAKHI_ENDPOINT overrides config.
pub fn resolve_endpoint(config: &Config) -> String {
    endpoint_from(non_empty_env("SAKHI_ENDPOINT"), config)
}

fn endpoint_from(env_endpoint: Option<String>, config: &Config) -> String {
    env_endpoint.unwrap_or_else(|| config.widget.endpoint.trim().to_string())
}

/// `timeoutSecs` as a client timeout; 0 means wait indefinitely.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    match secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SAKHI_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".sakhi").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or SAKHI_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = read_config(&path)?;
    Ok((config, path))
}

fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
