//! Tool contract

use async_trait::async_trait;

/// A single-purpose capability the router can select.
///
/// `invoke` always yields text: malformed input, missing records and
/// collaborator outages are rendered as messages by the implementation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup and in reasoning prompts
    fn name(&self) -> &str;

    /// Human-readable description shown to the reasoning provider
    fn description(&self) -> &str;

    /// Run the tool on free-form input
    async fn invoke(&self, input: &str) -> String;
}
