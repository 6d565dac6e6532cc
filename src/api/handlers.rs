//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics;
use crate::store::{BackendKind, Item, ItemStore, NewItem};
use crate::utils::{host_name, iso_timestamp};

/// Service name reported by `GET /`.
pub const SERVICE_NAME: &str = "API Server";

/// Static facts about this process, reported by `GET /`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Host the process runs on.
    pub hostname: String,
    /// Deployed version.
    pub version: String,
    /// Database target, only for the postgres backend.
    pub database: Option<String>,
}

impl ServiceInfo {
    /// Derive service info from configuration.
    pub fn from_config(config: &Config) -> Self {
        let database = match config.storage_backend {
            BackendKind::Memory => None,
            BackendKind::Postgres => Some(config.database_target()),
        };

        Self {
            hostname: host_name(),
            version: config.app_version(),
            database,
        }
    }
}

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Item storage backend.
    pub store: Arc<dyn ItemStore>,
    /// Process info.
    pub info: Arc<ServiceInfo>,
    /// Prometheus render handle.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: Arc<dyn ItemStore>, info: ServiceInfo, metrics: PrometheusHandle) -> Self {
        Self {
            store,
            info: Arc::new(info),
            metrics,
        }
    }
}

/// Process info response.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Service name.
    pub service: &'static str,
    /// Host name.
    pub hostname: String,
    /// Deployed version.
    pub version: String,
    /// Current UTC time.
    pub timestamp: String,
    /// Database target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Item list response.
#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    /// Items in ascending id order.
    pub items: Vec<Item>,
    /// Number of items.
    pub count: usize,
}

/// Health and readiness response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Status text.
    pub status: &'static str,
}

/// Process info handler.
pub async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        service: SERVICE_NAME,
        hostname: state.info.hostname.clone(),
        version: state.info.version.clone(),
        timestamp: iso_timestamp(),
        database: state.info.database.clone(),
    })
}

/// List all items.
pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.store.list().await.inspect_err(|_| {
        metrics::inc_store_errors("list");
    })?;

    Ok(Json(ItemListResponse {
        count: items.len(),
        items,
    }))
}

/// Fetch one item by id. Anything but plain digits is simply not found.
pub async fn get_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if raw_id.is_empty() || !raw_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    let id: i32 = raw_id.parse().map_err(|_| ApiError::NotFound)?;

    let item = state.store.get(id).await.inspect_err(|_| {
        metrics::inc_store_errors("get");
    })?;

    item.map(Json).ok_or(ApiError::NotFound)
}

/// Create an item from the request body.
pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewItem::from_body(&body)?;

    let item = state.store.create(input).await.inspect_err(|_| {
        metrics::inc_store_errors("create");
    })?;

    metrics::inc_items_created();
    info!(id = item.id, name = %item.name, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(StatusResponse { status: "healthy" })
}

/// Readiness check handler - returns 200 if the backend answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.store.ping().await.map_err(|e| {
        warn!(error = %e, "Readiness check failed");
        ApiError::NotReady
    })?;

    Ok(Json(StatusResponse { status: "ready" }))
}

/// Prometheus scrape handler.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
