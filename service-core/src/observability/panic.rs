//! Crash reporting for HTTP handlers.
//!
//! A panicking handler is turned into a JSON 500 response, logged at error
//! level and counted in `http_panics_total`. The process keeps serving.

use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response<Body>;

/// Layer that reports handler panics instead of dropping the connection.
pub fn panic_reporting_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(report_panic as PanicHandler)
}

pub fn report_panic(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %message, "Request handler panicked");
    metrics::counter!("http_panics_total").increment(1);

    let body = serde_json::json!({
        "error": "Internal server error",
        "details": message,
    });

    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::Request, routing::get};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("y tho")
    }

    #[tokio::test]
    async fn panicking_handler_becomes_json_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .route("/fine", get(|| async { "fine" }))
            .layer(panic_reporting_layer());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["details"], "y tho");

        let response = app
            .oneshot(Request::builder().uri("/fine").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
