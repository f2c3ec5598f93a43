//! # Authentication Module
//!
//! Optional API key check for the survey HTTP API.
//!
//! When `SURVEY_API_KEY` is set, every route outside [`PUBLIC_PATHS`]
//! requires `Authorization: Bearer <key>` (a bare `<key>` is accepted too).

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Routes reachable without a key: liveness and the read-only form definition.
pub const PUBLIC_PATHS: [&str; 2] = ["/health", "/catalog"];

/// Get API key from environment variable.
///
/// Returns `None` (authentication disabled) when unset or empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("SURVEY_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Compare two keys in constant time.
///
/// Both sides are zero-padded to the same length first, so the comparison
/// touches the same number of bytes whatever the provided length.
#[must_use]
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    let len = provided.len().max(expected.len());

    let mut lhs = vec![0u8; len];
    let mut rhs = vec![0u8; len];
    lhs[..provided.len()].copy_from_slice(provided);
    rhs[..expected.len()].copy_from_slice(expected);

    let same_bytes: bool = lhs.ct_eq(&rhs).into();
    same_bytes && provided.len() == expected.len()
}

/// API key authentication middleware.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(key) if keys_match(key, &expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                path = request.uri().path(),
                "Authentication failed: invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                path = request.uri().path(),
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
