//! # Middleware Module
//!
//! Global request rate limiting, configured by `SURVEY_RATE_LIMIT`
//! (requests per second, default 100, `0` disables it).

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Requests per second when unset or unparsable.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Shared, unkeyed limiter for the whole server.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a limiter allowing `requests_per_second` (zero falls back to the default).
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .or(NonZeroU32::new(DEFAULT_RATE_LIMIT))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Read `SURVEY_RATE_LIMIT`.
pub fn get_rate_limit_from_env() -> u32 {
    match std::env::var("SURVEY_RATE_LIMIT") {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid SURVEY_RATE_LIMIT '{}', using {}",
                raw,
                DEFAULT_RATE_LIMIT
            );
            DEFAULT_RATE_LIMIT
        }),
        Err(_) => DEFAULT_RATE_LIMIT,
    }
}

/// Reject with 429 and `Retry-After: 1` once the quota is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }

    tracing::warn!(path = request.uri().path(), "Rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, HeaderValue::from_static("1"))],
        "Too Many Requests",
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_exhausts_quota() {
        let limiter = create_rate_limiter(2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn zero_uses_default() {
        let limiter = create_rate_limiter(0);
        for _ in 0..DEFAULT_RATE_LIMIT {
            assert!(limiter.check().is_ok());
        }
    }
}
