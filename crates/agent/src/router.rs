//! Conversation router
//!
//! Per turn the router runs a bounded reasoning loop:
//!
//! ```text
//! Idle → Reasoning → ToolSelected → ToolExecuting → Responded
//!           │  ↺ (not a usable selection, up to max_iterations)
//!           └────────────→ Fallback → Responded
//! ```
//!
//! Any provider failure, a missing provider, iteration exhaustion or a tool
//! timeout sends the turn to the keyword [`FallbackClassifier`]. The router
//! never fails: every path ends in a response string.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bank_assistant_config::{AgentConfig, LookupConfig};
use bank_assistant_core::{ReasoningProvider, Tool, ToolError, Turn};
use bank_assistant_llm::{
    parse_reasoning_reply, ReasoningPromptBuilder, ReasoningReply, ScratchStep, ToolDescription,
};
use bank_assistant_tools::ToolRegistry;

use crate::fallback::{FallbackClassifier, FallbackRoute};

/// Returned when even the fallback tool cannot run
pub const FALLBACK_FAILURE: &str =
    "Lo siento, no pude procesar tu consulta en este momento. Intenta de nuevo.";

const FINAL_ANSWER_OBSERVATION: &str =
    "Debes elegir una herramienta con 'Action:' y 'Action Input:'.";
const UNPARSEABLE_OBSERVATION: &str =
    "Respuesta no reconocida. Usa el formato 'Action: <herramienta>' y 'Action Input: <texto>'.";

/// Router lifecycle states, reported per turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterState {
    Idle,
    Reasoning,
    ToolSelected,
    ToolExecuting,
    Fallback,
    Responded,
}

/// Which path produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePath {
    Reasoning,
    Fallback,
}

impl RoutePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutePath::Reasoning => "reasoning",
            RoutePath::Fallback => "fallback",
        }
    }
}

/// Why a turn left the reasoning path
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    NoProvider,
    Provider(String),
    IterationsExhausted,
    ToolFailed(ToolError),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoProvider => write!(f, "no reasoning provider"),
            FallbackReason::Provider(e) => write!(f, "provider failed: {}", e),
            FallbackReason::IterationsExhausted => write!(f, "iteration cap reached"),
            FallbackReason::ToolFailed(e) => write!(f, "tool failed: {}", e),
        }
    }
}

/// Trace of one routed turn
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub response: String,
    pub path: RoutePath,
    /// Tool that produced the response, if any
    pub tool: Option<String>,
    /// Provider calls made this turn
    pub iterations: u32,
    pub states: Vec<RouterState>,
    pub fallback_reason: Option<FallbackReason>,
    /// Fallback rule that matched
    pub rule: Option<&'static str>,
}

/// Reasoning loop with keyword fallback
pub struct ConversationRouter {
    provider: Option<Arc<dyn ReasoningProvider>>,
    registry: Arc<ToolRegistry>,
    classifier: FallbackClassifier,
    config: AgentConfig,
}

impl ConversationRouter {
    pub fn new(
        provider: Option<Arc<dyn ReasoningProvider>>,
        registry: Arc<ToolRegistry>,
        classifier: FallbackClassifier,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            classifier,
            config,
        }
    }

    /// Router using the default lookup tables for the classifier
    pub fn with_defaults(
        provider: Option<Arc<dyn ReasoningProvider>>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self::new(
            provider,
            registry,
            FallbackClassifier::new(&LookupConfig::default()),
            AgentConfig::default(),
        )
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.config.tool_timeout_secs)
    }

    /// Route one user turn; `history` excludes `input`
    pub async fn route(&self, history: &[Turn], input: &str) -> RouteOutcome {
        let start = Instant::now();
        let mut trace = Trace::new();

        let outcome = match self.provider.as_deref() {
            Some(provider) => match self.reason(provider, history, input, &mut trace).await {
                Ok((response, tool)) => {
                    trace.enter(RouterState::Responded);
                    trace.finish(response, RoutePath::Reasoning, Some(tool), None, None)
                },
                Err(reason) => self.fallback(input, reason, trace).await,
            },
            None => self.fallback(input, FallbackReason::NoProvider, trace).await,
        };

        metrics::counter!("router_turns_total", "path" => outcome.path.as_str()).increment(1);
        metrics::histogram!("reasoning_latency_ms").record(start.elapsed().as_millis() as f64);
        if let Some(tool) = &outcome.tool {
            metrics::counter!("tool_invocations_total", "tool" => tool.clone()).increment(1);
        }

        tracing::info!(
            path = outcome.path.as_str(),
            tool = outcome.tool.as_deref().unwrap_or("-"),
            iterations = outcome.iterations,
            rule = outcome.rule.unwrap_or("-"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Turn routed"
        );
        outcome
    }

    async fn reason(
        &self,
        provider: &dyn ReasoningProvider,
        history: &[Turn],
        input: &str,
        trace: &mut Trace,
    ) -> Result<(String, String), FallbackReason> {
        let mut scratchpad: Vec<ScratchStep> = Vec::new();

        while trace.iterations < self.config.max_iterations {
            trace.enter(RouterState::Reasoning);
            trace.iterations += 1;

            let prompt = ReasoningPromptBuilder::new(input)
                .with_tools(self.registry.iter().map(|t| ToolDescription {
                    name: t.name(),
                    description: t.description(),
                }))
                .with_history(history)
                .with_scratchpad(&scratchpad)
                .build();

            let reply = provider.complete(&prompt).await.map_err(|e| {
                tracing::warn!(error = %e, iteration = trace.iterations, "Reasoning provider failed");
                FallbackReason::Provider(e.to_string())
            })?;

            let observation = match parse_reasoning_reply(&reply) {
                ReasoningReply::Action { tool, input: tool_input } if self.registry.has(&tool) => {
                    trace.enter(RouterState::ToolSelected);
                    tracing::debug!(tool = %tool, iteration = trace.iterations, "Tool selected");

                    trace.enter(RouterState::ToolExecuting);
                    let response = self
                        .registry
                        .execute(&tool, &tool_input, self.tool_timeout())
                        .await
                        .map_err(|e| {
                            tracing::warn!(tool = %tool, error = %e, "Selected tool failed");
                            FallbackReason::ToolFailed(e)
                        })?;
                    return Ok((response, tool));
                },
                ReasoningReply::Action { tool, .. } => format!(
                    "La herramienta '{}' no existe. Herramientas disponibles: {}.",
                    tool,
                    self.registry.names().join(", ")
                ),
                ReasoningReply::FinalAnswer(_) => FINAL_ANSWER_OBSERVATION.to_string(),
                ReasoningReply::Unparseable => UNPARSEABLE_OBSERVATION.to_string(),
            };

            tracing::debug!(iteration = trace.iterations, %observation, "No usable tool selection");
            scratchpad.push(ScratchStep { reply, observation });
        }

        Err(FallbackReason::IterationsExhausted)
    }

    async fn fallback(&self, input: &str, reason: FallbackReason, mut trace: Trace) -> RouteOutcome {
        trace.enter(RouterState::Fallback);
        let decision = self.classifier.classify(input);
        tracing::debug!(reason = %reason, rule = decision.rule, "Routing through fallback");

        let (response, tool) = match decision.route {
            FallbackRoute::Reply(text) => (text, None),
            FallbackRoute::Tool { tool, input } => {
                match self.registry.execute_id(tool, &input, self.tool_timeout()).await {
                    Ok(text) => (text, Some(tool.name().to_string())),
                    Err(e) => {
                        tracing::error!(tool = %tool, error = %e, "Fallback tool failed");
                        (FALLBACK_FAILURE.to_string(), None)
                    },
                }
            },
        };

        trace.enter(RouterState::Responded);
        trace.finish(response, RoutePath::Fallback, tool, Some(reason), Some(decision.rule))
    }
}

impl std::fmt::Debug for ConversationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRouter")
            .field("provider", &self.provider.as_ref().map(|p| p.model_name().to_string()))
            .field("tools", &self.registry.names())
            .field("config", &self.config)
            .finish()
    }
}

struct Trace {
    states: Vec<RouterState>,
    iterations: u32,
}

impl Trace {
    fn new() -> Self {
        Self {
            states: vec![RouterState::Idle],
            iterations: 0,
        }
    }

    fn enter(&mut self, state: RouterState) {
        self.states.push(state);
    }

    fn finish(
        self,
        response: String,
        path: RoutePath,
        tool: Option<String>,
        fallback_reason: Option<FallbackReason>,
        rule: Option<&'static str>,
    ) -> RouteOutcome {
        RouteOutcome {
            response,
            path,
            tool,
            iterations: self.iterations,
            states: self.states,
            fallback_reason,
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_assistant_tools::{AgentTool, FinancialCalculatorTool, HelpTool, WeatherTool};

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register(AgentTool::Calculator(FinancialCalculatorTool::new()))
            .unwrap();
        registry
            .register(AgentTool::Weather(WeatherTool::default()))
            .unwrap();
        registry.register(AgentTool::Help(HelpTool)).unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_no_provider_uses_fallback() {
        let router = ConversationRouter::with_defaults(None, registry());
        let outcome = router.route(&[], "clima en monterrey").await;

        assert_eq!(outcome.path, RoutePath::Fallback);
        assert_eq!(outcome.fallback_reason, Some(FallbackReason::NoProvider));
        assert_eq!(outcome.rule, Some("weather"));
        assert_eq!(outcome.tool.as_deref(), Some("consultar_clima"));
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.response.contains("Clima en Monterrey"));
        assert_eq!(
            outcome.states,
            vec![RouterState::Idle, RouterState::Fallback, RouterState::Responded]
        );
    }

    #[tokio::test]
    async fn test_fallback_tool_missing_from_registry() {
        // Currency is not registered here
        let router = ConversationRouter::with_defaults(None, registry());
        let outcome = router.route(&[], "convierte 10 USD a MXN").await;
        assert_eq!(outcome.response, FALLBACK_FAILURE);
        assert_eq!(outcome.tool, None);
    }

    #[test]
    fn test_route_path_names() {
        assert_eq!(RoutePath::Reasoning.as_str(), "reasoning");
        assert_eq!(RoutePath::Fallback.as_str(), "fallback");
        assert_eq!(
            FallbackReason::IterationsExhausted.to_string(),
            "iteration cap reached"
        );
    }
}
