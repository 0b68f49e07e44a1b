pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use service_core::observability::panic_reporting_layer;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::RecordConfig;
use crate::services::RecordStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::examples::ping,
        handlers::examples::time,
        handlers::examples::helloworld,
        handlers::records::list_records,
        handlers::records::get_record,
        handlers::records::create_record,
        handlers::records::update_record,
    ),
    components(
        schemas(
            models::Record,
            dtos::ErrorResponse,
            dtos::records::RecordListResponse,
            dtos::records::RecordLookupResponse,
            dtos::records::CreateRecordRequest,
            dtos::records::CreateRecordResponse,
            dtos::records::UpdateRecordRequest,
            dtos::records::UpdateRecordResponse,
        )
    ),
    tags(
        (name = "Records", description = "Record document storage"),
        (name = "Example", description = "Example and utility endpoints"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: RecordConfig,
    pub store: Arc<dyn RecordStore>,
}

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::examples::root))
        .route("/ping", get(handlers::examples::ping))
        .route("/time", get(handlers::examples::time))
        .route(
            "/api/v1/example/helloworld",
            get(handlers::examples::helloworld),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route(
            "/records",
            get(handlers::list_records).put(handlers::create_record),
        )
        .route("/records/update", post(handlers::update_record))
        .route("/records/:id", get(handlers::get_record));

    if state.config.serve_swagger_ui() {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        // Keep the OpenAPI JSON available for programmatic access
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        );
    }

    app.with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(panic_reporting_layer())
}

/// Prometheus exposition, served on its own port.
pub fn build_metrics_router() -> Router {
    Router::new().route("/metrics", get(handlers::metrics::metrics))
}
