//! End-to-end tests for the middleware chain.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;
use tracing::instrument::WithSubscriber;
use tracing_subscriber::fmt::MakeWriter;

use rest_kit::config::ServerConfig;
use rest_kit::http::{HttpServer, RequestContext};

async fn echo_body(request: Request) -> Response {
    // Surfaces the lazy body ceiling as a request-level error
    match to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "request body too large").into_response(),
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(200)).await;
    "done"
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

fn app(config: ServerConfig) -> Router {
    let routes = Router::new()
        .route("/test", get(|| async { "bar" }))
        .route(
            "/context",
            get(|ctx: RequestContext| async move { ctx.request_id }),
        )
        .route(
            "/forwarded",
            get(|ctx: RequestContext| async move { ctx.forwarded_for }),
        )
        .route(
            "/organization",
            get(|ctx: RequestContext| async move { ctx.organization_id }),
        )
        .route("/echo", post(echo_body))
        .route("/slow", get(slow))
        .route("/panic", get(explode));
    HttpServer::new(config, routes).into_router()
}

/// Collects formatted log output so tests can assert on emitted events.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> LogCapture {
        self.clone()
    }
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_client_supplied_request_id_is_kept() {
    let app = app(ServerConfig::default());
    let request = Request::builder()
        .uri("/context")
        .header("x-request-id", "test-id")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "test-id");
}

#[tokio::test]
async fn test_generated_request_ids_are_distinct() {
    let app = app(ServerConfig::default());

    let mut ids = Vec::new();
    for _ in 0..2 {
        let request = Request::builder()
            .uri("/context")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(body_string(response).await);
    }

    assert!(!ids[0].is_empty());
    assert!(!ids[1].is_empty());
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_empty_request_id_header_is_replaced() {
    let app = app(ServerConfig::default());
    let request = Request::builder()
        .uri("/context")
        .header("x-request-id", "")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(!body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_forwarded_for_is_published_verbatim() {
    let app = app(ServerConfig::default());
    let request = Request::builder()
        .uri("/forwarded")
        .header("x-forwarded-for", "192.168.0.1,123.123.123.123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "192.168.0.1,123.123.123.123");
}

#[tokio::test]
async fn test_organization_id_from_header() {
    let app = app(ServerConfig::default());
    let request = Request::builder()
        .uri("/organization")
        .header("x-organization-id", "1000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "1000");

    // Absent header leaves the field empty rather than failing
    let request = Request::builder()
        .uri("/organization")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_body_over_ceiling_fails_on_read() {
    let config = ServerConfig {
        max_body_size: 10,
        ..ServerConfig::default()
    };
    let app = app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/echo")
        .body(Body::from(vec![b'x'; 100]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "request body too large");
}

#[tokio::test]
async fn test_body_at_ceiling_reads_fully() {
    let config = ServerConfig {
        max_body_size: 10,
        ..ServerConfig::default()
    };
    let app = app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/echo")
        .body(Body::from("0123456789"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "0123456789");
}

#[tokio::test]
async fn test_deadline_cancels_slow_handler() {
    let config = ServerConfig {
        max_request_duration: Duration::from_millis(10),
        ..ServerConfig::default()
    };
    let app = app(config);

    let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_deadline_closes_the_access_log_timeline() {
    let logs = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();

    let config = ServerConfig {
        max_request_duration: Duration::from_millis(10),
        ..ServerConfig::default()
    };
    let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let response = app(config)
        .oneshot(request)
        .with_subscriber(subscriber)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    // A timed-out request still gets a closing line with its status
    let output = logs.contents();
    assert!(output.contains("Starting"), "missing Starting line:\n{output}");
    assert!(output.contains("Finished"), "missing Finished line:\n{output}");
    assert!(output.contains("status=408"), "missing 408 status:\n{output}");
}

#[tokio::test]
async fn test_generous_deadline_lets_handler_finish() {
    let app = app(ServerConfig::default());

    let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "done");
}

#[tokio::test]
async fn test_panic_becomes_500_and_serving_continues() {
    let app = app(ServerConfig::default());

    let request = Request::builder().uri("/panic").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The process keeps serving subsequent requests
    let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "bar");
}

#[tokio::test]
async fn test_context_extractor_without_middleware_rejects() {
    // A route mounted without the lifecycle middleware has no context
    let bare: Router = Router::new().route(
        "/context",
        get(|ctx: RequestContext| async move { ctx.request_id }),
    );

    let request = Request::builder()
        .uri("/context")
        .body(Body::empty())
        .unwrap();
    let response = bare.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
