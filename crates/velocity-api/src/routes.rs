//! Router and request handlers.
//!
//! | Method | Path | Auth | Handler |
//! |--------|------|------|---------|
//! | `POST` | `/api/search/hybrid` | yes | keyword + vector with RRF |
//! | `POST` | `/api/search/semantic` | yes | vector only |
//! | `GET` | `/api/search/test` | yes | corpus stats and capabilities |
//! | `GET` | `/health` | no | liveness |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use velocity_core::{SearchHit, SearchMethod};
use velocity_search::{HybridOutcome, HybridQuery, SearchStatus, SemanticQuery, EMBEDDING_REQUIRED};

use crate::auth::require_auth;
use crate::error::ApiError;
use crate::state::AppState;

const SEARCH_FAILED: &str = "Search failed";
const SEMANTIC_FAILED: &str = "Semantic search failed";
const STATUS_FAILED: &str = "Failed to check search status";

/// Ranked results and the method that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
    pub method: SearchMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let search_routes = Router::new()
        .route("/hybrid", post(hybrid_search))
        .route("/semantic", post(semantic_search))
        .route("/test", get(search_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .nest("/api/search", search_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn hybrid_search(
    State(state): State<AppState>,
    payload: Result<Json<HybridQuery>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .hybrid(&request)
        .await
        .map_err(|e| ApiError::from_search(e, SEARCH_FAILED))?;

    let method = outcome.method();
    let response = match outcome {
        HybridOutcome::Fused(results) => Json(SearchResponse { results, method }).into_response(),
        HybridOutcome::KeywordOnly(results) => {
            Json(SearchResponse { results, method }).into_response()
        }
    };
    Ok(response)
}

async fn semantic_search(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse<SearchHit>>, ApiError> {
    let Json(body) = payload?;
    if !body.get("embedding").is_some_and(Value::is_array) {
        return Err(ApiError::BadRequest(EMBEDDING_REQUIRED.to_string()));
    }
    let request: SemanticQuery =
        serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let results = state
        .engine
        .semantic(&request)
        .await
        .map_err(|e| ApiError::from_search(e, SEMANTIC_FAILED))?;

    Ok(Json(SearchResponse {
        results,
        method: SearchMethod::Semantic,
    }))
}

async fn search_status(State(state): State<AppState>) -> Result<Json<SearchStatus>, ApiError> {
    state
        .engine
        .status()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_search(e, STATUS_FAILED))
}
