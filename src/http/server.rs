use crate::config::HttpServerConfig;
use crate::dialogue::{DialogueEngine, TurnOutcome, TurnRequest};
use crate::error::{DialogueError, Result};
use crate::http::openapi::api_spec;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Body of `POST /chat`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default, rename = "previousMessage")]
    previous_message: Option<String>,
    #[serde(default, rename = "chatSummary")]
    chat_summary: Option<String>,
    #[serde(default, rename = "characterId")]
    character_id: Option<Value>,
}

/// Character key from `characterId`: `2`, `2.0` and `"2"` all name character 2.
///
/// Floats are truncated toward zero. Anything else (`null`, booleans, objects)
/// uses the default key; unknown keys are left to the store's fallback.
fn character_key(character_id: Option<Value>, default: &str) -> String {
    match character_id {
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.is_finite() => (f.trunc() as i64).to_string(),
            _ => default.to_string(),
        },
        Some(Value::String(s)) => s,
        _ => default.to_string(),
    }
}

/// HTTP front end for a dialogue engine
pub struct ChatServer {
    engine: Arc<DialogueEngine>,
    config: HttpServerConfig,
}

impl ChatServer {
    pub fn new(engine: Arc<DialogueEngine>, config: HttpServerConfig) -> Self {
        Self { engine, config }
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<()> {
        let app = router(Arc::clone(&self.engine), &self.config.allowed_origins);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            DialogueError::Config(format!(
                "Failed to bind to {}: {}. Set http_server.port in config.toml to use another port.",
                addr, e
            ))
        })?;

        log::info!("Server is running on http://{}", addr);
        log::info!("Chat endpoint: http://{}/chat", addr);
        log::info!("API description: http://{}/api-spec.json", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the axum router
///
/// An empty `allowed_origins` allows any origin.
pub fn router(engine: Arc<DialogueEngine>, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .route("/api-spec.json", get(handle_api_spec))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(engine)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Handle `POST /chat`
///
/// Missing message or node_id starts a conversation; otherwise one turn runs.
async fn handle_chat(State(engine): State<Arc<DialogueEngine>>, body: axum::body::Bytes) -> Response {
    let request: ChatRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ChatRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e));
            }
        }
    };

    let character = character_key(request.character_id, engine.store().default_character());

    let turn = TurnRequest {
        message: request.message,
        node_id: request.node_id,
        previous_message: request.previous_message.unwrap_or_default(),
        chat_summary: request.chat_summary.unwrap_or_default(),
        character,
    };

    match engine.handle_turn(turn).await {
        Ok(TurnOutcome::Entry(Some(node))) => (StatusCode::OK, Json(node)).into_response(),
        Ok(TurnOutcome::Entry(None)) => {
            log::error!("Graph has no entry node");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "No conversation nodes found.")
        }
        Ok(TurnOutcome::Reply(reply)) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            log::error!("Turn failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to answer.")
        }
    }
}

/// Handle health check endpoint
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "npc-dialogue",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

async fn handle_api_spec() -> Response {
    (StatusCode::OK, Json(api_spec())).into_response()
}
