//! HTTP Endpoints
//!
//! REST API for the banking assistant.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bank_assistant_agent::RoutePath;
use bank_assistant_core::Turn;
use bank_assistant_tools::ToolSummary;

use crate::metrics::{metrics_handler, record_chat_request};
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/history", get(session_history))
        // Chat endpoint
        .route("/api/chat/:session_id", post(chat))
        // Tool listing
        .route("/api/tools", get(list_tools))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - `enabled == false` → permissive (development only)
/// - no valid origins → `http://localhost:3000`
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        return base.allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    base.allow_origin(parsed_origins)
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: String,
    greeting: Option<String>,
}

/// Create session
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ServerError> {
    let session = state.sessions.create()?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id.clone(),
            greeting: session.greeting().await,
        }),
    ))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ServerError::SessionNotFound(id.clone()))?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "active": session.is_active(),
        "turn_count": session.turn_count().await,
        "age_secs": session.created_at.elapsed().as_secs(),
    })))
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    session_id: String,
    turns: Vec<Turn>,
}

/// Full conversation log
async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ServerError::SessionNotFound(id.clone()))?;

    Ok(Json(HistoryResponse {
        session_id: id,
        turns: session.history().await,
    }))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    route: RoutePath,
    tool: Option<String>,
    turn_count: usize,
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ServerError::SessionNotFound(session_id.clone()))?;

    let (outcome, turn_count) = session.chat(message).await;
    record_chat_request(outcome.path.as_str());

    Ok(Json(ChatResponse {
        response: outcome.response,
        route: outcome.path,
        tool: outcome.tool,
        turn_count,
    }))
}

/// List tools in registry order
async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tools: Vec<ToolSummary> = state.tools.summaries();
    Json(serde_json::json!({
        "tools": tools,
        "count": tools.len(),
    }))
}

/// Liveness
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "tools": { "status": "ok", "count": state.tools.len() },
            "sessions": { "status": "ok", "count": state.sessions.count() },
        }
    }))
}

/// Readiness: the student service answers and a knowledge system is wired.
///
/// The reasoning provider is reported but optional, since the keyword
/// fallback serves every turn without it.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let config = state.get_config();
    let health_timeout = Duration::from_secs(config.student_service.health_timeout_secs);
    let provider_kind = config.llm.provider.as_str();
    let model = config.llm.model.clone();

    let mut checks = serde_json::Map::new();
    let mut ready = true;

    let student_status = match state.student_client() {
        Some(client) => match tokio::time::timeout(health_timeout, client.health()).await {
            Ok(Ok(())) => "ok",
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Student service health check failed");
                ready = false;
                "unreachable"
            },
            Err(_) => {
                ready = false;
                "timeout"
            },
        },
        None => {
            ready = false;
            "missing"
        },
    };
    checks.insert(
        "student_service".to_string(),
        serde_json::json!({
            "status": student_status,
            "url": state.student_client().map(|c| c.base_url().to_string()),
        }),
    );

    let knowledge_ok = state
        .knowledge_tool()
        .map(|t| t.is_available())
        .unwrap_or(false);
    if !knowledge_ok {
        ready = false;
    }
    checks.insert(
        "knowledge".to_string(),
        serde_json::json!({
            "status": if knowledge_ok { "ok" } else { "unavailable" },
        }),
    );

    checks.insert(
        "reasoning_provider".to_string(),
        serde_json::json!({
            "status": if state.router.has_provider() { "ok" } else { "disabled" },
            "provider": provider_kind,
            "model": model,
        }),
    );

    let (status, status_code) = if ready {
        ("ready", StatusCode::OK)
    } else {
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "checks": checks
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_assistant_config::{LlmConfig, Settings};

    #[test]
    fn test_router_creation() {
        let settings = Settings {
            llm: LlmConfig::disabled(),
            ..Settings::default()
        };
        let state = AppState::from_settings(settings).unwrap();
        let _ = create_router(state);
    }

    #[test]
    fn test_state_clones_share_settings() {
        let mut settings = Settings {
            llm: LlmConfig::disabled(),
            ..Settings::default()
        };
        settings.server.port = 9123;
        let state = AppState::from_settings(settings).unwrap();
        let cloned = state.clone();

        assert!(std::sync::Arc::ptr_eq(&state.config, &cloned.config));
        assert_eq!(cloned.get_config().server.port, 9123);
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&["https://banco.example".to_string()], true);
    }
}
