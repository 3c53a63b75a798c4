//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use bank_assistant_agent::{ConversationRouter, FallbackClassifier};
use bank_assistant_config::Settings;
use bank_assistant_core::ReasoningProvider;
use bank_assistant_llm::LlmFactory;
use bank_assistant_tools::{
    build_registry, knowledge_base_from_config, AgentTool, BankingKnowledgeTool,
    StudentServiceClient, ToolId, ToolRegistry,
};

use crate::session::SessionManager;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub tools: Arc<ToolRegistry>,
    pub router: Arc<ConversationRouter>,
}

impl AppState {
    /// Wire provider, knowledge system, tools and router from settings.
    ///
    /// A provider that fails to build is logged and replaced by keyword-only
    /// routing; a broken knowledge or student client configuration is fatal.
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let provider = match LlmFactory::create(&settings.llm) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(error = %e, "Reasoning provider unavailable, using keyword routing");
                None
            },
        };

        let knowledge = knowledge_base_from_config(&settings.knowledge)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let registry = build_registry(&settings, knowledge)
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(Self::with_provider(settings, provider, Arc::new(registry)))
    }

    /// Build state around an explicit provider and registry
    pub fn with_provider(
        settings: Settings,
        provider: Option<Arc<dyn ReasoningProvider>>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let router = Arc::new(ConversationRouter::new(
            provider,
            tools.clone(),
            FallbackClassifier::new(&settings.lookup),
            settings.agent.clone(),
        ));

        let sessions = SessionManager::from_config(router.clone(), &settings.server)
            .with_greeting(settings.agent.greeting.clone());

        Self {
            config: Arc::new(settings),
            sessions: Arc::new(sessions),
            tools,
            router,
        }
    }

    /// Settings the state was built from
    pub fn get_config(&self) -> &Settings {
        &self.config
    }

    /// Student service client behind the registered lookup tool
    pub fn student_client(&self) -> Option<&StudentServiceClient> {
        match self.tools.get_by_id(ToolId::StudentLookup) {
            Some(AgentTool::StudentLookup(tool)) => Some(tool.client()),
            _ => None,
        }
    }

    pub fn knowledge_tool(&self) -> Option<&BankingKnowledgeTool> {
        match self.tools.get_by_id(ToolId::Knowledge) {
            Some(AgentTool::Knowledge(tool)) => Some(tool),
            _ => None,
        }
    }
}
