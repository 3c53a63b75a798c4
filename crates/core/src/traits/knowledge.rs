//! Knowledge/answer system capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Answer produced by the knowledge system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    pub response_text: String,
    /// Number of supporting documents consulted
    pub source_count: usize,
}

/// Opaque retrieval + answer system
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn answer(&self, question: &str, top_k: usize) -> Result<KnowledgeAnswer>;

    /// Whether a real backend is wired in
    fn is_available(&self) -> bool {
        true
    }
}
