//! JSON HTTP server.
//!
//! Every handler reads the catalog through the shared [`CatalogStore`], so a
//! request either hits the cached snapshot or triggers a refresh. Handlers
//! hold their `Arc<Snapshot>` only until the response body is serialized.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/exercise/{id}` | One record by id |
//! | `GET`  | `/search?name=&page=` | Fuzzy name search, 10 per page |
//! | `GET`  | `/random` | 5 records sampled with replacement |
//! | `GET`  | `/recommendations?equipment=&primaryMuscle=` | Up to 5 filtered records |
//! | `GET`  | `/health` | Version and cache status |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "exercise not found: Foo" } }
//! ```
//!
//! Error codes: `not_found` (404), `upstream_unavailable` (500). Malformed
//! pagination, repeated keys, and unknown query parameters are never errors;
//! when a key repeats, its first value wins.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::CatalogError;
use crate::fuzzy::Matcher;
use crate::lookup;
use crate::search::{paginated_search, parse_page};
use crate::source::{create_source, CatalogSource};
use crate::store::{CatalogStatus, CatalogStore};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub matcher: Matcher,
}

/// Starts the HTTP server with the source described in `[source]`.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let source = create_source(&config.source)?;
    run_server_with_source(config, source).await
}

/// Starts the HTTP server reading the catalog from `source`.
///
/// The catalog is fetched once before the listener opens. A failed warm-up
/// is logged, not fatal: requests keep retrying until a fetch succeeds.
pub async fn run_server_with_source(
    config: &Config,
    source: Arc<dyn CatalogSource>,
) -> anyhow::Result<()> {
    let store = Arc::new(CatalogStore::from_config(config, source));

    match store.get_catalog().await {
        Ok(snapshot) => tracing::info!(records = snapshot.len(), "catalog primed"),
        Err(e) => tracing::warn!(error = %e, "catalog warm-up failed, will retry per request"),
    }

    let state = AppState {
        store,
        matcher: Matcher::new(config.search.threshold),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "exercise catalog listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Builds the router with all routes, CORS, and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/exercise/{id}", get(handle_get_exercise))
        .route("/search", get(handle_search))
        .route("/random", get(handle_random))
        .route("/recommendations", get(handle_recommendations))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: err.to_string(),
            },
            CatalogError::UpstreamUnavailable(_) => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "upstream_unavailable".to_string(),
                message: err.to_string(),
            },
        }
    }
}

// ============ Query parameters ============

/// Raw query pairs in request order.
///
/// Extracting into a struct would reject repeated keys with a 400, so
/// handlers read the pairs directly and take the first occurrence.
type QueryPairs = Vec<(String, String)>;

fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// ============ GET /exercise/{id} ============

async fn handle_get_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state.store.get_catalog().await?;
    let exercise = lookup::get_by_id(&snapshot, &id)?;
    Ok(Json(exercise).into_response())
}

// ============ GET /search ============

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, AppError> {
    let snapshot = state.store.get_catalog().await?;
    let query = first_param(&params, "name").unwrap_or("");
    // Kept as text so that junk values fall back to page 1.
    let page = parse_page(first_param(&params, "page"));

    let result = paginated_search(&state.matcher, &snapshot, query, page);
    tracing::debug!(query, page, results = result.results, "search");
    Ok(Json(result).into_response())
}

// ============ GET /random ============

async fn handle_random(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.store.get_catalog().await?;
    let picked = lookup::sample(&snapshot, lookup::RANDOM_COUNT);
    Ok(Json(picked).into_response())
}

// ============ GET /recommendations ============

async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, AppError> {
    let snapshot = state.store.get_catalog().await?;
    let recs = lookup::recommend(
        &snapshot,
        first_param(&params, "equipment").unwrap_or(""),
        first_param(&params, "primaryMuscle").unwrap_or(""),
    );
    Ok(Json(recs).into_response())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    catalog: CatalogStatus,
}

/// Always 200; reports cache state without triggering a fetch.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: state.store.status(),
    })
}
