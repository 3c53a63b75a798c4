//! Reasoning provider integration
//!
//! Features:
//! - Ollama and OpenAI-compatible (DeepSeek, vLLM, OpenAI) backends
//! - Retry with exponential backoff for transient failures
//! - Reasoning prompt construction and `Action:` / `Final Answer:` parsing

pub mod backend;
pub mod factory;
pub mod prompt;

pub use backend::{BackendConfig, OllamaBackend, OpenAIBackend};
pub use factory::LlmFactory;
pub use prompt::{
    parse_reasoning_reply, Message, ReasoningPromptBuilder, ReasoningReply, Role, ScratchStep,
    ToolDescription,
};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Timeout)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for bank_assistant_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Network(msg) => bank_assistant_core::Error::ProviderUnreachable(msg),
            LlmError::Timeout => bank_assistant_core::Error::ProviderUnreachable("timeout".into()),
            other => bank_assistant_core::Error::Provider(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Timeout.is_retryable());
        assert!(LlmError::Network("reset".into()).is_retryable());
        assert!(!LlmError::Api("401".into()).is_retryable());
        assert!(!LlmError::InvalidResponse("no choices".into()).is_retryable());
    }

    #[test]
    fn test_core_error_mapping() {
        let err: bank_assistant_core::Error = LlmError::Timeout.into();
        assert!(err.is_unreachable());
        let err: bank_assistant_core::Error = LlmError::Api("HTTP 400".into()).into();
        assert!(matches!(err, bank_assistant_core::Error::Provider(_)));
    }
}
