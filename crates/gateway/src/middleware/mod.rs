//! Gateway middleware

pub mod rate_limit;

use axum::{extract::Request, middleware::Next, response::Response};
use notegraph_common::metrics::RequestMetrics;

/// Record request count and latency for every request
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let metrics = RequestMetrics::start(&method, &path);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());

    response
}
