//! HTTP surface for the chain
//!
//! `POST /query`, `GET /health` and `GET /tools`. The chain is shared
//! immutably between requests; every query gets its own history.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::chain::{Chain, ChainError};
use crate::llm::ToolDefinition;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<Chain>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(handle_query))
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(chain: Arc<Chain>, bind: &str) -> Result<()> {
    let app = router(AppState { chain });
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context(format!("Failed to bind {}", bind))?;
    info!(%bind, "HTTP server listening");
    println!("tubeloop listening on {}", bind);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!(query_len = %request.query.len(), "handle_query: called");
    match state.chain.invoke(&request.query).await {
        Ok(result) => Ok(Json(QueryResponse { result })),
        Err(e) => {
            let status = match e {
                ChainError::EmptyQuery => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!(%status, error = %e, "handle_query: query failed");
            Err((status, Json(ErrorResponse { detail: e.to_string() })))
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDefinition>> {
    Json(state.chain.tool_definitions())
}
