//! LLM Factory
//!
//! Builds the configured reasoning provider. `Disabled` yields `None`, in
//! which case the router answers every turn through the keyword fallback.

use std::sync::Arc;

use bank_assistant_config::{LlmConfig, LlmProviderKind};
use bank_assistant_core::ReasoningProvider;

use crate::backend::{BackendConfig, OllamaBackend, OpenAIBackend};
use crate::LlmError;

pub struct LlmFactory;

impl LlmFactory {
    pub fn create(config: &LlmConfig) -> Result<Option<Arc<dyn ReasoningProvider>>, LlmError> {
        let backend_config = BackendConfig::from_settings(config);

        let provider: Arc<dyn ReasoningProvider> = match config.provider {
            LlmProviderKind::Disabled => {
                tracing::info!("Reasoning provider disabled, using keyword routing only");
                return Ok(None);
            },
            LlmProviderKind::Ollama => Arc::new(OllamaBackend::new(backend_config)?),
            LlmProviderKind::OpenaiCompatible => Arc::new(OpenAIBackend::new(backend_config)?),
        };

        tracing::info!(
            provider = config.provider.as_str(),
            model = %config.model,
            endpoint = %config.endpoint,
            "Reasoning provider created"
        );
        Ok(Some(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_provider() {
        assert!(LlmFactory::create(&LlmConfig::disabled()).unwrap().is_none());
    }

    #[test]
    fn test_ollama_provider() {
        let provider = LlmFactory::create(&LlmConfig::ollama()).unwrap().unwrap();
        assert_eq!(provider.model_name(), "qwen2.5:7b-instruct");
    }

    #[test]
    fn test_remote_provider_without_key_fails() {
        let config = LlmConfig::default();
        assert!(matches!(
            LlmFactory::create(&config),
            Err(LlmError::Configuration(_))
        ));

        let config = LlmConfig {
            api_key: Some("sk-live".to_string()),
            ..LlmConfig::default()
        };
        let provider = LlmFactory::create(&config).unwrap().unwrap();
        assert_eq!(provider.model_name(), "deepseek-chat");
    }
}
