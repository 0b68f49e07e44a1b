#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use record_service::config::{ConnectionLifecycle, MongoConfig, RecordConfig};
use record_service::services::InMemoryRecordStore;
use record_service::{build_router, AppState};
use secrecy::Secret;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryRecordStore,
}

impl TestApp {
    /// Router over a fresh in-memory store.
    pub fn spawn() -> Self {
        let store = InMemoryRecordStore::new();
        let state = AppState {
            config: RecordConfig::in_memory(),
            store: Arc::new(store.clone()),
        };

        TestApp {
            router: build_router(state),
            store,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        into_json(response).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: impl Into<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = self
            .request(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await;
        into_json(response).await
    }
}

pub async fn into_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse JSON")
    };
    (status, body)
}

/// MongoDB settings from the environment, with a unique database per test.
pub fn live_mongo_config() -> (MongoConfig, String) {
    let db_name = format!("record_test_{}", Uuid::new_v4().simple());
    let config = MongoConfig {
        username: std::env::var("MONGODB_USERNAME").unwrap_or_else(|_| "root".to_string()),
        password: Secret::new(
            std::env::var("MONGODB_PASSWORD").unwrap_or_else(|_| "example".to_string()),
        ),
        endpoint: std::env::var("MONGODB_ENDPOINT")
            .unwrap_or_else(|_| "localhost:27017".to_string()),
        database: db_name.clone(),
        collection: "records".to_string(),
        timeout_secs: 5,
        lifecycle: ConnectionLifecycle::PerOperation,
        max_pool_size: 10,
        max_idle_secs: 60,
    };
    (config, db_name)
}

/// Settings pointing at a port nothing listens on.
pub fn unreachable_mongo_config(lifecycle: ConnectionLifecycle) -> MongoConfig {
    MongoConfig {
        username: "nobody".to_string(),
        password: Secret::new("nothing".to_string()),
        endpoint: "127.0.0.1:1".to_string(),
        database: "records".to_string(),
        collection: "records".to_string(),
        timeout_secs: 1,
        lifecycle,
        max_pool_size: 1,
        max_idle_secs: 1,
    }
}
