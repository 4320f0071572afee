//! Access logging middleware.
//!
//! Logs the start and end of every request, so the whole request timeline is
//! visible even when the handler itself logs nothing. Runs inside the
//! lifecycle middleware's span, so the request fields are attached to both
//! lines.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Log `Starting`/`Finished` around the rest of the chain.
pub async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::info!(method = %method, path = %path, "Starting");
    let start = Instant::now();

    let response = next.run(req).await;

    // Handler errors are already materialized into the response at this
    // point, so its status is authoritative.
    let elapsed_time = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_time,
        "Finished"
    );

    response
}
