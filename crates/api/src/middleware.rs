use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Log one line per handled request: method, path, status, latency.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    response
}
