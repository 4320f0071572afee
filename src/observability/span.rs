//! Per-request tracing span middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::trace::{Span, SpanKind, TraceContextExt, Tracer};
use opentelemetry::{global, Context, KeyValue};

use crate::http::context::RequestContext;

/// Create a server span for the request against the global tracer.
///
/// Tags the span with the correlation and organization identifiers when the
/// lifecycle middleware has published a [`RequestContext`], and stores the
/// span's [`Context`] in the request extensions so handlers can parent
/// child spans to it. With tracing disabled the global tracer is a no-op
/// and this records nothing.
pub async fn trace_request(mut req: Request, next: Next) -> Response {
    let tracer = global::tracer("rest-kit");
    let mut span = tracer
        .span_builder(format!("{} {}", req.method(), req.uri().path()))
        .with_kind(SpanKind::Server)
        .start(&tracer);

    if let Some(ctx) = req.extensions().get::<RequestContext>() {
        span.set_attribute(KeyValue::new("http.request_id", ctx.request_id.clone()));
        if !ctx.organization_id.is_empty() {
            span.set_attribute(KeyValue::new(
                "http.organization_id",
                ctx.organization_id.clone(),
            ));
        }
    }

    let cx = Context::current_with_span(span);
    req.extensions_mut().insert(cx.clone());

    let response = next.run(req).await;

    let span = cx.span();
    span.set_attribute(KeyValue::new(
        "http.status_code",
        i64::from(response.status().as_u16()),
    ));
    span.end();

    response
}
