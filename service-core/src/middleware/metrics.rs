use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Requests at or above this latency are also counted as slow.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(10);

/// Label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route template (`/records/:id`) rather than the raw path, so label
/// cardinality stays bounded.
pub fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_label(&req);

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    let labels = [("method", method), ("path", path), ("status", status)];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
    if duration >= SLOW_REQUEST_THRESHOLD {
        counter!("http_slow_requests_total", &labels).increment(1);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn unrouted_requests_share_one_label() {
        let first = Request::builder()
            .uri("/wp-admin/setup.php")
            .body(Body::empty())
            .unwrap();
        let second = Request::builder()
            .uri("/.env")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_label(&first), UNMATCHED_ROUTE);
        assert_eq!(route_label(&second), UNMATCHED_ROUTE);
    }
}
