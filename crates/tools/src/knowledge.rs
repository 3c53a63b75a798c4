//! Banking knowledge tool and the knowledge-system adapters

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bank_assistant_config::KnowledgeConfig;
use bank_assistant_core::{Error, KnowledgeAnswer, KnowledgeBase, Result, Tool};

pub const NAME: &str = "consulta_bancaria_rag";
pub const DESCRIPTION: &str = "Responde preguntas sobre productos y servicios bancarios usando
el sistema RAG. Ejemplos: cuentas de ahorro, préstamos, tarjetas de crédito";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
    #[serde(default)]
    sources: Vec<serde_json::Value>,
}

/// Knowledge system reached over HTTP: `POST {endpoint}/query`
pub struct HttpKnowledgeBase {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpKnowledgeBase {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Knowledge(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn answer(&self, question: &str, top_k: usize) -> Result<KnowledgeAnswer> {
        let url = format!("{}/query", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&QueryRequest { question, k: top_k })
            .send()
            .await
            .map_err(|e| Error::Knowledge(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Knowledge(format!("status {}", status.as_u16())));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Knowledge(format!("invalid response: {}", e)))?;

        Ok(KnowledgeAnswer {
            response_text: body.response,
            source_count: body.sources.len(),
        })
    }
}

/// Stand-in used when no knowledge endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableKnowledgeBase;

#[async_trait]
impl KnowledgeBase for UnavailableKnowledgeBase {
    async fn answer(&self, _question: &str, _top_k: usize) -> Result<KnowledgeAnswer> {
        Err(Error::Knowledge(
            "sistema de conocimiento no disponible".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Pick the knowledge adapter for the configured endpoint
pub fn knowledge_base_from_config(config: &KnowledgeConfig) -> Result<Arc<dyn KnowledgeBase>> {
    match config.endpoint.as_deref() {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            tracing::info!(endpoint, "Using HTTP knowledge system");
            Ok(Arc::new(HttpKnowledgeBase::new(
                endpoint,
                Duration::from_secs(config.timeout_secs),
            )?))
        },
        _ => {
            tracing::warn!("No knowledge endpoint configured, banking questions will report unavailability");
            Ok(Arc::new(UnavailableKnowledgeBase))
        },
    }
}

/// Answers banking questions through the knowledge system
#[derive(Clone)]
pub struct BankingKnowledgeTool {
    knowledge: Arc<dyn KnowledgeBase>,
    top_k: usize,
}

impl BankingKnowledgeTool {
    pub fn new(knowledge: Arc<dyn KnowledgeBase>, top_k: usize) -> Self {
        Self { knowledge, top_k }
    }

    pub fn is_available(&self) -> bool {
        self.knowledge.is_available()
    }

    pub async fn ask(&self, question: &str) -> String {
        match self.knowledge.answer(question, self.top_k).await {
            Ok(answer) => {
                let mut text = format!("🏦 Consulta Bancaria:\n\n{}", answer.response_text);
                if answer.source_count > 0 {
                    text.push_str(&format!(
                        "\n\n📋 Fuentes consultadas: {} documentos",
                        answer.source_count
                    ));
                }
                text
            },
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge query failed");
                format!("Error en consulta bancaria: {}", e)
            },
        }
    }
}

impl std::fmt::Debug for BankingKnowledgeTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankingKnowledgeTool")
            .field("top_k", &self.top_k)
            .field("available", &self.knowledge.is_available())
            .finish()
    }
}

#[async_trait]
impl Tool for BankingKnowledgeTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, input: &str) -> String {
        self.ask(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedKnowledge {
        sources: usize,
    }

    #[async_trait]
    impl KnowledgeBase for FixedKnowledge {
        async fn answer(&self, question: &str, top_k: usize) -> Result<KnowledgeAnswer> {
            Ok(KnowledgeAnswer {
                response_text: format!("{} (k={})", question, top_k),
                source_count: self.sources,
            })
        }
    }

    #[tokio::test]
    async fn test_answer_with_sources() {
        let tool = BankingKnowledgeTool::new(Arc::new(FixedKnowledge { sources: 2 }), 3);
        assert_eq!(
            tool.invoke("tarjetas").await,
            "🏦 Consulta Bancaria:\n\ntarjetas (k=3)\n\n📋 Fuentes consultadas: 2 documentos"
        );
    }

    #[tokio::test]
    async fn test_answer_without_sources_omits_footer() {
        let tool = BankingKnowledgeTool::new(Arc::new(FixedKnowledge { sources: 0 }), 3);
        let text = tool.invoke("cuentas").await;
        assert!(!text.contains("Fuentes"));
    }

    #[tokio::test]
    async fn test_unavailable_knowledge() {
        let tool = BankingKnowledgeTool::new(Arc::new(UnavailableKnowledgeBase), 3);
        assert!(!tool.is_available());
        assert!(tool
            .invoke("cuentas")
            .await
            .starts_with("Error en consulta bancaria:"));
    }

    #[test]
    fn test_adapter_selection() {
        let config = KnowledgeConfig::default();
        assert!(!knowledge_base_from_config(&config).unwrap().is_available());

        let config = KnowledgeConfig {
            endpoint: Some("http://localhost:8000".to_string()),
            ..KnowledgeConfig::default()
        };
        assert!(knowledge_base_from_config(&config).unwrap().is_available());
    }
}
