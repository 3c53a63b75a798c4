//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, limits, timeouts};
use crate::{AgentConfig, ConfigError, LlmConfig, LlmProviderKind, LookupConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning provider
    #[serde(default)]
    pub llm: LlmConfig,

    /// Router behaviour
    #[serde(default)]
    pub agent: AgentConfig,

    /// Student record service
    #[serde(default)]
    pub student_service: StudentServiceConfig,

    /// Knowledge/answer system
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Weather and currency tables
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_agent()?;
        self.validate_student_service()?;
        self.validate_knowledge()?;
        self.validate_lookup()?;
        self.validate_observability()?;
        self.validate_tool_timeout()?;
        Ok(())
    }

    /// The per-tool timeout must exceed every adapter's own timeout
    fn validate_tool_timeout(&self) -> Result<(), ConfigError> {
        let tool_timeout = self.agent.tool_timeout_secs;
        let adapters = [
            ("knowledge.timeout_secs", self.knowledge.timeout_secs),
            ("student_service.timeout_secs", self.student_service.timeout_secs),
        ];
        for (field, secs) in adapters {
            if tool_timeout <= secs {
                return Err(invalid(
                    "agent.tool_timeout_secs",
                    format!("Must exceed {} ({}s), got {}s", field, secs, tool_timeout),
                ));
            }
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        if self.server.max_sessions == 0 {
            return Err(invalid("server.max_sessions", "Must allow at least one session"));
        }
        if self.server.session_timeout_secs == 0 {
            return Err(invalid("server.session_timeout_secs", "Must be greater than 0"));
        }
        if self.server.cleanup_interval_secs == 0 {
            return Err(invalid("server.cleanup_interval_secs", "Must be greater than 0"));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;
        if llm.provider == LlmProviderKind::Disabled {
            return Ok(());
        }
        if !is_http_url(&llm.endpoint) {
            return Err(invalid(
                "llm.endpoint",
                format!("Must be an http(s) URL, got '{}'", llm.endpoint),
            ));
        }
        if llm.model.trim().is_empty() {
            return Err(invalid("llm.model", "Model name cannot be empty"));
        }
        if llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "Must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }
        Ok(())
    }

    fn validate_agent(&self) -> Result<(), ConfigError> {
        let max = self.agent.max_iterations;
        if max == 0 || max > limits::MAX_REASONING_ITERATIONS_CEILING {
            return Err(invalid(
                "agent.max_iterations",
                format!(
                    "Must be between 1 and {}, got {}",
                    limits::MAX_REASONING_ITERATIONS_CEILING,
                    max
                ),
            ));
        }
        if self.agent.tool_timeout_secs == 0 {
            return Err(invalid("agent.tool_timeout_secs", "Must be greater than 0"));
        }
        Ok(())
    }

    fn validate_student_service(&self) -> Result<(), ConfigError> {
        let svc = &self.student_service;
        if !is_http_url(&svc.base_url) {
            return Err(invalid(
                "student_service.base_url",
                format!("Must be an http(s) URL, got '{}'", svc.base_url),
            ));
        }
        if svc.timeout_secs == 0 || svc.health_timeout_secs == 0 {
            return Err(invalid("student_service.timeout_secs", "Timeouts must be greater than 0"));
        }
        if svc.max_listed == 0 {
            return Err(invalid("student_service.max_listed", "Must list at least one record"));
        }
        Ok(())
    }

    fn validate_knowledge(&self) -> Result<(), ConfigError> {
        if self.knowledge.top_k == 0 {
            return Err(invalid("knowledge.top_k", "Must be at least 1"));
        }
        if let Some(endpoint) = &self.knowledge.endpoint {
            if !is_http_url(endpoint) {
                return Err(invalid(
                    "knowledge.endpoint",
                    format!("Must be an http(s) URL, got '{}'", endpoint),
                ));
            }
        }
        Ok(())
    }

    fn validate_lookup(&self) -> Result<(), ConfigError> {
        for entry in &self.lookup.currency_rates {
            if entry.from.trim().is_empty() || entry.to.trim().is_empty() {
                return Err(invalid("lookup.currency_rates", "Currency codes cannot be empty"));
            }
            if !entry.rate.is_finite() || entry.rate <= 0.0 {
                return Err(invalid(
                    "lookup.currency_rates",
                    format!("Rate {} → {} must be positive, got {}", entry.from, entry.to, entry.rate),
                ));
            }
        }
        for entry in &self.lookup.weather {
            if entry.city.trim().is_empty() {
                return Err(invalid("lookup.weather", "City name cannot be empty"));
            }
            if entry.humidity_percent > 100 {
                return Err(invalid(
                    "lookup.weather",
                    format!("Humidity for {} exceeds 100%", entry.city),
                ));
            }
        }
        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        let level = self.observability.log_level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            return Err(invalid(
                "observability.log_level",
                format!("Unknown log level '{}'", self.observability.log_level),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time before a session is reclaimed
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}
fn default_max_sessions() -> usize {
    limits::MAX_SESSIONS
}
fn default_session_timeout() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Student record service (MyrluxBack)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentServiceConfig {
    #[serde(default = "default_student_base_url")]
    pub base_url: String,

    #[serde(default = "default_student_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// Records rendered by a full listing
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
}

fn default_student_base_url() -> String {
    endpoints::STUDENT_SERVICE_BASE.to_string()
}
fn default_student_timeout() -> u64 {
    timeouts::STUDENT_SERVICE_SECS
}
fn default_health_timeout() -> u64 {
    timeouts::HEALTH_CHECK_SECS
}
fn default_max_listed() -> usize {
    limits::MAX_LISTED_STUDENTS
}

impl Default for StudentServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_student_base_url(),
            timeout_secs: default_student_timeout(),
            health_timeout_secs: default_health_timeout(),
            max_listed: default_max_listed(),
        }
    }
}

/// Knowledge/answer system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Base URL of the answer service; `None` leaves the tool unavailable
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_knowledge_timeout")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    limits::KNOWLEDGE_TOP_K
}
fn default_knowledge_timeout() -> u64 {
    timeouts::KNOWLEDGE_QUERY_SECS
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            top_k: default_top_k(),
            timeout_secs: default_knowledge_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment.
///
/// Priority: env vars (`BANK_ASSISTANT__*`) > `config/{env}` > `config/default` > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("BANK_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.agent.max_iterations, 3);
        assert_eq!(settings.student_service.base_url, "http://localhost:11002/api");
        assert_eq!(settings.student_service.timeout_secs, 10);
        assert_eq!(settings.student_service.health_timeout_secs, 5);
        assert_eq!(settings.knowledge.top_k, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_iteration_cap_validation() {
        let mut settings = Settings::default();
        settings.agent.max_iterations = 0;
        assert!(settings.validate().is_err());

        settings.agent.max_iterations = 11;
        assert!(settings.validate().is_err());

        settings.agent.max_iterations = 5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_currency_rate_validation() {
        let mut settings = Settings::default();
        settings.lookup.currency_rates[0].rate = 0.0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "lookup.currency_rates"));
    }

    #[test]
    fn test_cleanup_interval_validation() {
        let mut settings = Settings::default();
        settings.server.cleanup_interval_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.cleanup_interval_secs"));
    }

    #[test]
    fn test_tool_timeout_must_exceed_adapter_timeouts() {
        let settings = Settings::default();
        assert!(settings.agent.tool_timeout_secs > settings.knowledge.timeout_secs);
        assert!(settings.agent.tool_timeout_secs > settings.student_service.timeout_secs);

        let mut settings = Settings::default();
        settings.agent.tool_timeout_secs = settings.knowledge.timeout_secs;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "agent.tool_timeout_secs"));

        let mut settings = Settings::default();
        settings.student_service.timeout_secs = settings.agent.tool_timeout_secs + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_disabled_provider_skips_endpoint_check() {
        let mut settings = Settings::default();
        settings.llm.endpoint = "not-a-url".to_string();
        assert!(settings.validate().is_err());

        settings.llm.provider = LlmProviderKind::Disabled;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let mut settings = Settings::default();
        settings.observability.log_level = "verbose".to_string();
        assert!(settings.validate().is_err());
        settings.observability.log_level = "DEBUG".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.yaml")).unwrap();
        writeln!(
            file,
            "server:\n  port: 9001\nagent:\n  max_iterations: 2\nstudent_service:\n  base_url: http://records.internal:8080/api\nllm:\n  provider: ollama\n  endpoint: http://localhost:11434\n  model: qwen2.5:7b-instruct"
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.server.port, 9001);
        assert_eq!(settings.agent.max_iterations, 2);
        assert_eq!(settings.llm.provider, LlmProviderKind::Ollama);
        assert_eq!(
            settings.student_service.base_url,
            "http://records.internal:8080/api"
        );
        // untouched sections keep their defaults
        assert_eq!(settings.lookup.currency_rates.len(), 6);
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "server:\n  port: 9001\n").unwrap();
        std::fs::write(
            dir.path().join("production.yaml"),
            "environment: production\nserver:\n  port: 9443\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("production")).unwrap();
        assert_eq!(settings.server.port, 9443);
        assert!(settings.environment.is_production());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "agent:\n  max_iterations: 0\n").unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("absent"), None).unwrap();
        assert_eq!(settings.server.port, 8080);
    }
}
