use crate::chat::ChatService;
use crate::config::HttpServerConfig;
use crate::error::{Result, ShopbotError};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const ENDPOINTS: &[&str] = &[
    "POST /api/chat",
    "GET /health",
    "GET /agents",
    "GET /agents/health",
];

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Bind and serve until the process is stopped
pub async fn run(config: &HttpServerConfig, service: Arc<ChatService>) -> Result<()> {
    let app = create_router(service, &config.allowed_origins);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        ShopbotError::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to bind to {}: {}. Another process may be using port {}; set http_server.port in config.toml",
                addr, e, config.port
            ),
        ))
    })?;
    log::info!("Starting Shopbot HTTP server on http://{}", addr);
    log::info!("Chat endpoint: http://{}/api/chat", addr);

    axum::serve(listener, app).await.map_err(|e| {
        ShopbotError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("HTTP server error: {}", e),
        ))
    })?;

    Ok(())
}

/// Routes plus trace and CORS layers; an empty origin list allows any origin
pub fn create_router(service: Arc<ChatService>, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(handle_root))
        .route("/api/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .route("/agents", get(handle_agents))
        .route("/agents/health", get(handle_agents_health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(service)
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn handle_chat(State(service): State<Arc<ChatService>>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            log::warn!("[API] {} Invalid request body: {}", request_id, e);
            return bad_request(format!("Invalid JSON: {}", e));
        }
    };
    log::info!("[API] {} Received message: {}", request_id, request.message);

    let mut response = match service.chat(&request.message).await {
        Ok(reply) => {
            log::info!(
                "[API] {} Answered by {} in {:?}",
                request_id,
                reply.source,
                start.elapsed()
            );
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(ShopbotError::InvalidInput(msg)) => {
            log::warn!("[API] {} Rejected: {}", request_id, msg);
            bad_request(msg)
        }
        Err(e) => {
            log::error!("[API] {} Failed: {}", request_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn handle_root() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "service": "shopbot",
            "message": "Shopbot e-commerce chat API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": ENDPOINTS,
        })),
    )
        .into_response()
}

async fn handle_health(State(service): State<Arc<ChatService>>) -> Response {
    (StatusCode::OK, Json(service.health().await)).into_response()
}

async fn handle_agents(State(service): State<Arc<ChatService>>) -> Response {
    (StatusCode::OK, Json(service.agents_overview())).into_response()
}

async fn handle_agents_health(State(service): State<Arc<ChatService>>) -> Response {
    (StatusCode::OK, Json(service.agents_health().await)).into_response()
}
