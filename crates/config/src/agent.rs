//! Agent and reasoning-provider configuration

use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, limits, models, timeouts};

/// Router behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reasoning iterations allowed per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Timeout for a single tool execution selected by the reasoning loop
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Message placed at the start of every new session
    #[serde(default)]
    pub greeting: Option<String>,
}

fn default_max_iterations() -> u32 {
    limits::MAX_REASONING_ITERATIONS
}
fn default_tool_timeout() -> u64 {
    timeouts::TOOL_EXECUTION_SECS
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout(),
            greeting: None,
        }
    }
}

/// Which reasoning backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderKind {
    /// OpenAI-style `/chat/completions` (DeepSeek, vLLM, OpenAI)
    #[default]
    OpenaiCompatible,
    /// Local Ollama server
    Ollama,
    /// No provider; every turn goes through the keyword fallback
    Disabled,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenaiCompatible => "openai_compatible",
            LlmProviderKind::Ollama => "ollama",
            LlmProviderKind::Disabled => "disabled",
        }
    }
}

/// Reasoning provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,

    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Bearer token for remote OpenAI-compatible endpoints
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_endpoint() -> String {
    endpoints::DEEPSEEK_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    models::DEEPSEEK_CHAT.to_string()
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}
fn default_max_retries() -> u32 {
    limits::LLM_MAX_RETRIES
}
fn default_initial_backoff() -> u64 {
    timeouts::LLM_INITIAL_BACKOFF_MS
}
fn default_max_tokens() -> usize {
    512
}
fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Local Ollama defaults
    pub fn ollama() -> Self {
        Self {
            provider: LlmProviderKind::Ollama,
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            model: models::OLLAMA_DEFAULT.to_string(),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            provider: LlmProviderKind::Disabled,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 3);
        assert!(config.greeting.is_none());
    }

    #[test]
    fn test_provider_kind_deserialize() {
        let kind: LlmProviderKind = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(kind, LlmProviderKind::Ollama);
        let kind: LlmProviderKind = serde_json::from_str("\"openai_compatible\"").unwrap();
        assert_eq!(kind, LlmProviderKind::OpenaiCompatible);
        assert_eq!(LlmProviderKind::Disabled.as_str(), "disabled");
    }

    #[test]
    fn test_ollama_preset() {
        let config = LlmConfig::ollama();
        assert_eq!(config.provider, LlmProviderKind::Ollama);
        assert_eq!(config.endpoint, "http://localhost:11434");
    }
}
