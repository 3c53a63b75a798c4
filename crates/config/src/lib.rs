//! Configuration management for the banking assistant
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`BANK_ASSISTANT__` prefix, `__` separator)
//!
//! Example override: `BANK_ASSISTANT__LLM__API_KEY=sk-...`

pub mod agent;
pub mod constants;
pub mod lookup;
pub mod settings;

pub use agent::{AgentConfig, LlmConfig, LlmProviderKind};
pub use lookup::{CurrencyRateEntry, LookupConfig, WeatherEntry};
pub use settings::{
    load_settings, load_settings_from, KnowledgeConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, StudentServiceConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
