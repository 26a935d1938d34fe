//! HTTP API endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use sensorlog_core::{DataPoint, SensorLogError, Store, StoreStats, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state
pub type AppState = Arc<Store>;

/// Create the API router
pub fn create_router(store: Arc<Store>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))
        // Device clock
        .route("/time", get(time))
        // Range query and ingestion
        .route("/data", get(read_data).post(insert_data))
        // Stats
        .route("/stats", get(stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    from: Option<String>,
    to: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct TimeResponse {
    pub unix: i64,
    pub embedded: i64,
    pub iso: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn store_error(e: SensorLogError) -> ApiError {
    if e.is_caller_error() {
        return bad_request(e.to_string());
    }

    warn!("Store operation failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<Timestamp>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|_| bad_request(format!("Invalid '{}' bound: {:?}", name, text))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: sensorlog_core::VERSION.to_string(),
    })
}

async fn time() -> Json<TimeResponse> {
    let now = Timestamp::now();
    Json(TimeResponse {
        unix: now.as_unix(),
        embedded: now.as_embedded(),
        iso: now.to_rfc3339(),
    })
}

async fn read_data(
    State(store): State<AppState>,
    Query(params): Query<ReadParams>,
) -> Result<Response, ApiError> {
    let from = parse_bound("from", params.from.as_deref())?;
    let to = parse_bound("to", params.to.as_deref())?;

    let series = store.read(from, to).map_err(store_error)?;

    match params.format.as_deref().unwrap_or("csv") {
        "csv" => {
            let body = series.to_text().map_err(store_error)?;
            Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
        }
        "json" => Ok(Json(series).into_response()),
        other => Err(bad_request(format!("Unknown format: {}", other))),
    }
}

async fn insert_data(
    State(store): State<AppState>,
    Json(point): Json<DataPoint>,
) -> Result<StatusCode, ApiError> {
    store.insert(&point).map_err(store_error)?;
    Ok(StatusCode::CREATED)
}

async fn stats(State(store): State<AppState>) -> Result<Json<StoreStats>, ApiError> {
    store.stats().map(Json).map_err(store_error)
}
