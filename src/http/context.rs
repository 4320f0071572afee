//! Per-request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Extensions, StatusCode};

/// Request specific information, published by the lifecycle middleware and
/// read-only for downstream handlers. Dropped when the request completes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation identifier: client-supplied header value or a fresh UUID.
    pub request_id: String,
    /// Verbatim `x-forwarded-for` header value, unvalidated.
    pub forwarded_for: String,
    /// Organization identifier, empty when the header is absent.
    pub organization_id: String,
}

/// Error type for request context lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("no request context")]
    Missing,
}

/// Get request specific data from the request's extensions.
pub fn request_context(extensions: &Extensions) -> Result<&RequestContext, ContextError> {
    extensions
        .get::<RequestContext>()
        .ok_or(ContextError::Missing)
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        request_context(&parts.extensions)
            .cloned()
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "no request context"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context() {
        let extensions = Extensions::new();
        assert_eq!(request_context(&extensions), Err(ContextError::Missing));
    }

    #[test]
    fn test_context_round_trip() {
        let mut extensions = Extensions::new();
        extensions.insert(RequestContext {
            request_id: "test-id".into(),
            forwarded_for: "1.2.3.4".into(),
            organization_id: "1000".into(),
        });

        let ctx = request_context(&extensions).unwrap();
        assert_eq!(ctx.request_id, "test-id");
        assert_eq!(ctx.forwarded_for, "1.2.3.4");
        assert_eq!(ctx.organization_id, "1000");
    }
}
