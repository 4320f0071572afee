//! Panic recovery middleware.
//!
//! Catches panics unwinding out of handlers, logs them with a stack trace
//! and a headers-only dump of the request, and converts them into an empty
//! 500 response. The panic value is never re-raised; the process keeps
//! serving subsequent requests.
//!
//! The trace is recorded by a panic hook at the panic site, before the
//! stack unwinds; a trace captured after `catch_unwind` would only show
//! the recovery frames.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

/// Upper bound on the captured stack trace, matching a 32 KiB buffer.
const STACK_TRACE_LIMIT: usize = 1 << 15;

thread_local! {
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Record the backtrace at the panic site.
///
/// Chains in front of any previously installed hook. Installed once per
/// process; later calls are no-ops.
pub(crate) fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(capped_backtrace()));
            previous(info);
        }));
    });
}

/// Trace recorded for the panic just caught on this thread.
///
/// The panic unwinds synchronously through the caught future's poll, so
/// the hook and this read run on the same thread with no await point in
/// between. Falls back to capturing here if the hook never ran.
fn take_panic_trace() -> String {
    PANIC_TRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(capped_backtrace)
}

/// Catch panics from the rest of the chain and answer 500.
pub async fn recover_panics(req: Request, next: Next) -> Response {
    let request_dump = dump_request(&req);

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let stacktrace = take_panic_trace();
            tracing::error!(
                panic = panic_message(panic.as_ref()),
                stacktrace = %stacktrace,
                request = %request_dump,
                "internal server error"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Request line and headers only, never the body.
fn dump_request(req: &Request) -> String {
    let mut dump = format!("{} {} {:?}\r\n", req.method(), req.uri(), req.version());
    for (name, value) in req.headers() {
        dump.push_str(name.as_str());
        dump.push_str(": ");
        dump.push_str(value.to_str().unwrap_or("<binary>"));
        dump.push_str("\r\n");
    }
    dump
}

fn capped_backtrace() -> String {
    let mut trace = Backtrace::force_capture().to_string();
    if trace.len() > STACK_TRACE_LIMIT {
        let mut end = STACK_TRACE_LIMIT;
        while !trace.is_char_boundary(end) {
            end -= 1;
        }
        trace.truncate(end);
    }
    trace
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn erupt_for_backtrace_check() {
        panic!("boom");
    }

    #[tokio::test]
    async fn test_trace_includes_panic_site() {
        install_panic_hook();

        let caught = AssertUnwindSafe(async { erupt_for_backtrace_check() })
            .catch_unwind()
            .await;
        assert!(caught.is_err());

        let trace = take_panic_trace();
        assert!(
            trace.contains("erupt_for_backtrace_check"),
            "panic site missing from trace:\n{trace}"
        );
    }

    #[test]
    fn test_trace_falls_back_without_a_recorded_panic() {
        assert!(!take_panic_trace().is_empty());
    }
}
