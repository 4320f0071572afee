//! Request lifecycle middleware.
//!
//! Initializes everything a request needs before it reaches a handler:
//! a lazily enforced body-size ceiling, a correlation id, a resolved client
//! IP, a request-scoped log span, a deadline, and the [`RequestContext`]
//! published through the request's extensions. Side effects are strictly
//! additive; only the body is rewrapped.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::Limited;
use tracing::{field, Instrument};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::http::context::RequestContext;
use crate::net::client_ip;

/// Correlation id header consumed and trusted when non-empty.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that become log fields only when present and non-empty.
const OPTIONAL_FIELDS: [(&str, &str); 4] = [
    ("x-retailer-api-key", "retailer_api_key"),
    ("x-api-key", "api_key"),
    ("x-auth-token", "auth_token"),
    ("x-organization-id", "organization_id"),
];

/// Initialize special per-request state and invoke the rest of the chain.
pub async fn init_request(
    State(config): State<Arc<ServerConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    // Extract or generate the correlation id
    let request_id = match header_str(req.headers(), X_REQUEST_ID) {
        "" => Uuid::new_v4().to_string(),
        id => id.to_string(),
    };

    let forwarded_for = header_str(req.headers(), X_FORWARDED_FOR).to_string();
    let user_ip = client_ip(&forwarded_for, peer);

    let server_name = header_str(req.headers(), header::HOST.as_str());
    let user_agent = header_str(req.headers(), header::USER_AGENT.as_str());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        server_name = %server_name,
        progname = %config.application_name,
        user_agent = %user_agent,
        user_ip = %user_ip,
        retailer_api_key = field::Empty,
        api_key = field::Empty,
        auth_token = field::Empty,
        organization_id = field::Empty,
    );
    for (header_name, field_name) in OPTIONAL_FIELDS {
        let value = header_str(req.headers(), header_name);
        if !value.is_empty() {
            span.record(field_name, value);
        }
    }

    let organization_id = header_str(req.headers(), "x-organization-id").to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Rewrap body so overly long reads fail at the point of consumption
    let limit = config.max_body_size as usize;
    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(RequestContext {
        request_id,
        forwarded_for,
        organization_id,
    });
    let req = Request::from_parts(parts, Body::new(Limited::new(body, limit)));

    let start = Instant::now();
    let inner = next.run(req).instrument(span.clone());
    match tokio::time::timeout(config.max_request_duration, inner).await {
        Ok(response) => response,
        Err(_) => {
            // The dropped chain can no longer log `Finished`, so close
            // the request timeline here
            let elapsed_time = start.elapsed().as_secs_f64() * 1000.0;
            span.in_scope(|| {
                tracing::warn!("request deadline exceeded");
                tracing::info!(
                    method = %method,
                    path = %path,
                    status = StatusCode::REQUEST_TIMEOUT.as_u16(),
                    elapsed_time,
                    "Finished"
                );
            });
            StatusCode::REQUEST_TIMEOUT.into_response()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
