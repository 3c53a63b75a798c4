//! Reasoning provider capability

use async_trait::async_trait;

use crate::error::Result;

/// Text-completion backend driving the reasoning loop
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Complete a fully rendered prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Identifier for logs and status endpoints
    fn model_name(&self) -> &str;
}
