//! Integration tests for the items service.
//!
//! Everything runs against the router in-process. Tests marked
//! `requires database` need a reachable PostgreSQL configured via `DB_*`.
//! Run with: cargo test --test integration -- --ignored

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use items_api::api::{create_router, AppState, ServiceInfo};
use items_api::config::Config;
use items_api::error::StoreError;
use items_api::metrics::build_recorder;
use items_api::store::{
    bootstrap, BackendKind, BootstrapPolicy, Item, ItemStore, MemoryItemStore, NewItem,
    PgItemStore,
};

/// Store whose every operation fails as if the database were down.
struct DownStore;

fn down() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ItemStore for DownStore {
    async fn init(&self) -> Result<(), StoreError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Err(down())
    }

    async fn get(&self, _id: i32) -> Result<Option<Item>, StoreError> {
        Err(down())
    }

    async fn create(&self, _input: NewItem) -> Result<Item, StoreError> {
        Err(down())
    }
}

fn router_with(store: Arc<dyn ItemStore>, config: &Config) -> Router {
    let state = AppState::new(store, ServiceInfo::from_config(config), build_recorder().handle());
    create_router(state)
}

fn memory_router() -> Router {
    router_with(Arc::new(MemoryItemStore::seeded()), &Config::default())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: &str) -> Response {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn seeded_list_returns_two_items() {
    let app = memory_router();

    let response = get(&app, "/api/items").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "items": [
                {"id": 1, "name": "Item 1", "description": "First item"},
                {"id": 2, "name": "Item 2", "description": "Second item"}
            ],
            "count": 2
        })
    );
}

#[tokio::test]
async fn create_after_seed_assigns_next_id() {
    let app = memory_router();

    let response = post(&app, "/api/items", r#"{"name":"Item 3"}"#).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({"id": 3, "name": "Item 3", "description": ""})
    );

    let list = json_body(get(&app, "/api/items").await).await;
    assert_eq!(list["count"], 3);
}

#[tokio::test]
async fn create_then_fetch_round_trips() {
    let app = memory_router();

    let created = json_body(post(&app, "/api/items", r#"{"name":"X","description":"Y"}"#).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = get(&app, &format!("/api/items/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"id": id, "name": "X", "description": "Y"})
    );
}

#[tokio::test]
async fn empty_object_body_applies_defaults() {
    let app = memory_router();

    let created = json_body(post(&app, "/api/items", "{}").await).await;
    assert_eq!(created["name"], "New Item");
    assert_eq!(created["description"], "");
}

#[tokio::test]
async fn missing_body_applies_defaults() {
    let app = memory_router();

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/items")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["name"], "New Item");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = memory_router();

    let response = post(&app, "/api/items", "{oops").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let list = json_body(get(&app, "/api/items").await).await;
    assert_eq!(list["count"], 2);
}

#[tokio::test]
async fn missing_item_returns_404() {
    let app = router_with(Arc::new(MemoryItemStore::new()), &Config::default());

    let response = get(&app, "/api/items/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Item not found"}));
}

#[tokio::test]
async fn signed_item_id_returns_404() {
    let app = memory_router();

    assert_eq!(get(&app, "/api/items/2").await.status(), StatusCode::OK);

    let response = get(&app, "/api/items/+2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Item not found"}));
}

#[tokio::test]
async fn list_stays_ordered_after_many_creates() {
    let app = memory_router();

    for i in 0..10 {
        let response = post(&app, "/api/items", &format!(r#"{{"name":"n{i}"}}"#)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let list = json_body(get(&app, "/api/items").await).await;
    let ids: Vec<i64> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_unique_ids() {
    let app = memory_router();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { json_body(post(&app, "/api/items", "{}").await).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap()["id"].as_i64().unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 32);
}

#[tokio::test]
async fn storage_failures_surface_as_500() {
    let app = router_with(Arc::new(DownStore), &Config::default());
    let expected = json!({"error": sqlx::Error::PoolTimedOut.to_string()});

    let response = get(&app, "/api/items").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, expected);

    let response = get(&app, "/api/items/1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = post(&app, "/api/items", "{}").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_ignores_storage_state() {
    let app = router_with(Arc::new(DownStore), &Config::default());

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn ready_reports_503_when_store_is_down() {
    let app = router_with(Arc::new(DownStore), &Config::default());

    let response = get(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await, json!({"status": "not ready"}));
}

#[tokio::test]
async fn bootstrap_policies_differ_on_failure() {
    assert!(bootstrap(&DownStore, BootstrapPolicy::LogAndContinue).await.is_ok());
    assert!(bootstrap(&DownStore, BootstrapPolicy::Fatal).await.is_err());
}

#[tokio::test]
async fn unreachable_postgres_serves_errors_not_hangs() {
    let config = Config {
        storage_backend: BackendKind::Postgres,
        db_host: "127.0.0.1".to_string(),
        db_port: 1,
        db_acquire_timeout_secs: 1,
        ..Config::default()
    };
    let store = Arc::new(PgItemStore::connect_lazy(&config));
    assert!(bootstrap(store.as_ref(), config.bootstrap_policy()).await.is_ok());

    let app = router_with(store, &config);

    assert_eq!(get(&app, "/health").await.status(), StatusCode::OK);
    assert_eq!(get(&app, "/ready").await.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        get(&app, "/api/items").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let info = json_body(get(&app, "/").await).await;
    assert_eq!(info["version"], "v2.0-db");
    assert_eq!(info["database"], "127.0.0.1:1/appdb");
}

#[tokio::test]
#[ignore = "requires database"]
async fn postgres_round_trip_includes_created_at() {
    let mut config = Config::load().expect("config");
    config.storage_backend = BackendKind::Postgres;

    let store = Arc::new(PgItemStore::connect_lazy(&config));
    bootstrap(store.as_ref(), BootstrapPolicy::Fatal)
        .await
        .expect("schema bootstrap failed");
    let app = router_with(store, &config);

    assert_eq!(get(&app, "/ready").await.status(), StatusCode::OK);

    let created = json_body(post(&app, "/api/items", r#"{"name":"X","description":"Y"}"#).await).await;
    assert!(created["created_at"].is_string());

    let id = created["id"].as_i64().unwrap();
    let fetched = json_body(get(&app, &format!("/api/items/{id}")).await).await;
    assert_eq!(fetched, created);

    let list = json_body(get(&app, "/api/items").await).await;
    assert!(list["count"].as_u64().unwrap() >= 1);
}
