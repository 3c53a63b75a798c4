//! End-to-end HTTP tests against an in-process server

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use bank_assistant_config::{LlmConfig, Settings};
use bank_assistant_core::{KnowledgeAnswer, KnowledgeBase, Result};
use bank_assistant_server::{create_router, AppState};
use bank_assistant_tools::{build_registry, UnavailableKnowledgeBase};

struct StaticKnowledge;

#[async_trait]
impl KnowledgeBase for StaticKnowledge {
    async fn answer(&self, _question: &str, _top_k: usize) -> Result<KnowledgeAnswer> {
        Ok(KnowledgeAnswer {
            response_text: "Las cuentas de ahorro no tienen comisión de apertura.".to_string(),
            source_count: 2,
        })
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn student_stub() -> String {
    let router = Router::new()
        .route("/api/home", get(|| async { "MyrluxBack" }))
        .route(
            "/api/lista/alumno",
            get(|| async { Json(json!([{ "id": 1, "nombres": "Ana", "apellidos": "Ruiz" }])) }),
        );
    format!("{}/api", spawn(router).await)
}

async fn server(knowledge: Arc<dyn KnowledgeBase>, student_base: String) -> String {
    let mut settings = Settings {
        llm: LlmConfig::disabled(),
        ..Settings::default()
    };
    settings.student_service.base_url = student_base;

    let registry = build_registry(&settings, knowledge).unwrap();
    let state = AppState::with_provider(settings, None, Arc::new(registry));
    spawn(create_router(state)).await
}

#[tokio::test]
async fn session_lifecycle_and_chat() {
    let base = server(Arc::new(StaticKnowledge), student_stub().await).await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["session_id"].as_str().unwrap().to_string();
    assert!(created["greeting"].as_str().unwrap().starts_with("¡Hola!"));

    let reply: Value = client
        .post(format!("{}/api/chat/{}", base, id))
        .json(&json!({ "message": "prestamo 50000 18 24" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["route"], "fallback");
    assert_eq!(reply["tool"], "calculadora_financiera");
    assert_eq!(reply["turn_count"], 3);
    assert!(reply["response"].as_str().unwrap().contains("$2,496.21"));

    let reply: Value = client
        .post(format!("{}/api/chat/{}", base, id))
        .json(&json!({ "message": "Muestra todos los estudiantes" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(reply["response"].as_str().unwrap().contains("Nombre: Ana Ruiz"));

    let history: Value = client
        .get(format!("{}/api/sessions/{}/history", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 5);
    assert_eq!(turns[1]["role"], "user");
    assert_eq!(turns[2]["role"], "assistant");

    let status = client
        .delete(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::NO_CONTENT);

    let status = client
        .get(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_rejects_unknown_session_and_empty_message() {
    let base = server(Arc::new(StaticKnowledge), student_stub().await).await;
    let client = reqwest::Client::new();

    let status = client
        .post(format!("{}/api/chat/nope", base))
        .json(&json!({ "message": "hola" }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);

    let created: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let status = client
        .post(format!("{}/api/chat/{}", base, created["session_id"].as_str().unwrap()))
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tools_are_listed_in_registry_order() {
    let base = server(Arc::new(StaticKnowledge), student_stub().await).await;
    let body: Value = reqwest::get(format!("{}/api/tools", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "consulta_bancaria_rag",
            "consultar_estudiante",
            "calculadora_financiera",
            "consultar_clima",
            "conversion_moneda",
            "informacion_sistema",
            "ayuda_general",
        ]
    );
}

#[tokio::test]
async fn readiness_reflects_dependencies() {
    let base = server(Arc::new(StaticKnowledge), student_stub().await).await;
    let response = reqwest::get(format!("{}/ready", base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["student_service"]["status"], "ok");
    assert_eq!(body["checks"]["reasoning_provider"]["status"], "disabled");

    // Knowledge system missing and student service down
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api", addr)
    };
    let base = server(Arc::new(UnavailableKnowledgeBase), closed).await;
    let response = reqwest::get(format!("{}/ready", base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["student_service"]["status"], "unreachable");
    assert_eq!(body["checks"]["knowledge"]["status"], "unavailable");

    let health = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);
}
