//! # Survey HTTP API Module
//!
//! JSON form surface over one survey session, using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /catalog` - Categories, indicators and closed choices
//! - `GET /session` - Session snapshot
//! - `PUT /session/profile` - Set respondent profile
//! - `PUT /session/selection` - Set picks and proposals of one category
//! - `POST /session/evaluate` - Freeze selection, start evaluation
//! - `GET /session/evaluation` - Evaluation view
//! - `PUT /session/answers` - Set or clear answers
//! - `POST /session/submit` - Validate and append to the store
//! - `POST /session/reset` - Abandon the session
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `SURVEY_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `SURVEY_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `SURVEY_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use handlers::{
    answers_handler, catalog_handler, evaluate_handler, evaluation_handler, health_handler,
    profile_handler, reset_handler, selection_handler, session_handler, submit_handler,
};
pub use types::{
    AnswerEntry, AnswersRequest, ApiError, CatalogResponse, CategoryJson, ErrorResponse,
    EvaluationResponse, HealthResponse, Missing, OptionJson, SelectionEntry, SelectionJson,
    SessionResponse, SubmitResponse, WarningJson, status_for,
};

use crate::store::SheetBackend;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use survey_core::{Session, SurveyError, ValidationPolicy};
use tokio::sync::{Mutex, RwLock};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (256 KB).
const MAX_BODY_SIZE: usize = 256 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The respondent's session.
    pub session: Arc<RwLock<Session>>,
    /// Where submitted rows go.
    pub store: Arc<Mutex<SheetBackend>>,
    /// Submission rules.
    pub policy: ValidationPolicy,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(session: Session, store: SheetBackend, policy: ValidationPolicy) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            store: Arc::new(Mutex::new(store)),
            policy,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

/// Build CORS layer from `SURVEY_CORS_ORIGINS`.
///
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("SURVEY_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (SURVEY_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in SURVEY_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No SURVEY_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set SURVEY_API_KEY environment variable to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/catalog", get(handlers::catalog_handler))
        .route("/session", get(handlers::session_handler))
        .route("/session/profile", put(handlers::profile_handler))
        .route("/session/selection", put(handlers::selection_handler))
        .route("/session/evaluate", post(handlers::evaluate_handler))
        .route("/session/evaluation", get(handlers::evaluation_handler))
        .route("/session/answers", put(handlers::answers_handler))
        .route("/session/submit", post(handlers::submit_handler))
        .route("/session/reset", post(handlers::reset_handler));

    // Innermost: runs last on request
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), SurveyError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SurveyError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Survey HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SurveyError::IoError(format!("Server error: {}", e)))
}

/// Resolve on Ctrl+C. The session is abandoned without side effects.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
