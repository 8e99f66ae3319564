//! # Authentication Module
//!
//! Optional Bearer-key check for the storage routes. `/health` is mounted
//! outside this layer and never asks for a key.
//!
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// The configured API key.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl ApiKey {
    /// `None` for an empty key.
    pub fn new(key: &str) -> Option<Self> {
        (!key.is_empty()).then(|| Self(Arc::from(key)))
    }

    /// Constant-time comparison over the key bytes.
    pub fn matches(&self, provided: &str) -> bool {
        self.0.as_bytes().ct_eq(provided.as_bytes()).into()
    }

    /// Check an `Authorization` header value. Only the `Bearer` scheme is
    /// accepted.
    pub fn accepts(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| self.matches(token.trim()))
    }
}

fn unauthorized(reason: &'static str) -> Response {
    tracing::warn!(event = "auth_failure", reason, "request rejected");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        "Unauthorized",
    )
        .into_response()
}

/// Reject requests whose `Authorization` header does not carry the key.
pub async fn require_api_key(
    State(key): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorization = request.headers().get(header::AUTHORIZATION);
    let Some(value) = authorization else {
        return unauthorized("missing_authorization_header");
    };

    if key.accepts(value.to_str().ok()) {
        next.run(request).await
    } else {
        unauthorized("invalid_api_key")
    }
}

// =============================================================================
// TESTS
// =============================================================================
