//! HTTP API gateway for SilverCare.
//!
//! Endpoints:
//! - `POST /chat` — one conversational exchange
//! - `GET  /`     — health check with the active provider routes
//!
//! Built on Axum. The only caller-visible failure is a malformed request,
//! rejected here before the core runs; a well-formed chat request always
//! gets a well-formed answer.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use silvercare_config::AppConfig;
use silvercare_orchestrator::{Orchestrator, Persona};
use silvercare_providers::build_chain;
use silvercare_search::SearchClient;
use silvercare_session::SessionStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Orchestrator,
    pub active_routes: Vec<String>,
}

pub type SharedState = Arc<GatewayState>;

/// Chat message request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
}

/// Reply text plus suggested follow-up questions.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    active_routes: Vec<String>,
    message: &'static str,
}

#[derive(Serialize)]
struct ValidationError {
    error: String,
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    info!("Health check");
    Json(HealthResponse {
        status: "online",
        active_routes: state.active_routes.clone(),
        message: "SilverCare API ready.",
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ValidationError>)> {
    if payload.message.trim().is_empty() || payload.user_id.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationError {
                error: "message and user_id must be non-empty".into(),
            }),
        ));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id, user = %payload.user_id);
    let answer = state
        .orchestrator
        .handle(&payload.user_id, &payload.message)
        .instrument(span)
        .await;

    Ok(Json(ChatResponse {
        response: answer.text,
        suggestions: answer.suggestions,
    }))
}

/// Start the gateway HTTP server: wire config → knowledge → store → chain →
/// search → orchestrator, then serve until shutdown.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let persona = Persona::load(&config.knowledge.path);
    let store = Arc::new(SessionStore::new(
        config.session.max_history_rounds,
        chrono::Duration::hours(config.session.ttl_hours),
    ));
    let chain = build_chain(&config);
    let search = Arc::new(SearchClient::new(
        config.search.api_key.clone(),
        Duration::from_secs(config.search.timeout_secs),
        config.search.max_results,
    ));
    let active_routes = config
        .active_routes()
        .into_iter()
        .map(String::from)
        .collect();

    let state = Arc::new(GatewayState {
        orchestrator: Orchestrator::new(store, chain, search, persona),
        active_routes,
    });

    info!(%addr, "Starting SilverCare gateway");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
