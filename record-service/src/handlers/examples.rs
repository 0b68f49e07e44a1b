use axum::{http::StatusCode, Json};
use chrono::Utc;

pub async fn root() -> StatusCode {
    StatusCode::OK
}

/// Liveness ping
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Always answers pong", body = String)),
    tag = "Example"
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// Current server time
#[utoipa::path(
    get,
    path = "/time",
    responses((status = 200, description = "RFC 3339 timestamp followed by a newline", body = String)),
    tag = "Example"
)]
pub async fn time() -> String {
    tracing::info!("Time requested");
    format!("{}\n", Utc::now().to_rfc3339())
}

/// Hello world example
#[utoipa::path(
    get,
    path = "/api/v1/example/helloworld",
    responses((status = 200, description = "Greeting", body = String)),
    tag = "Example"
)]
pub async fn helloworld() -> Json<&'static str> {
    Json("helloworld")
}
