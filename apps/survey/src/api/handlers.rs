//! # API Endpoint Handlers
//!
//! Every mutating handler works on a clone of the session and swaps it in
//! only when the whole request succeeded, so a rejected request leaves the
//! session exactly as it was.

use super::{
    AppState,
    types::{
        AnswersRequest, ApiError, CatalogResponse, EvaluationResponse, HealthResponse,
        SelectionEntry, SessionResponse, SubmitResponse,
    },
};
use crate::store::{self, timestamp_now};
use axum::{Json, extract::State, response::IntoResponse};
use survey_core::Profile;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CATALOG HANDLER
// =============================================================================

/// Categories, indicators and every closed choice of the form.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(CatalogResponse::from_catalog(session.catalog()))
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Current session snapshot.
pub async fn session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(SessionResponse::from_session(&session))
}

/// Replace the respondent profile.
pub async fn profile_handler(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.write().await;
    *session = session.clone().with_profile(profile)?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// Replace picks and proposals of one category.
pub async fn selection_handler(
    State(state): State<AppState>,
    Json(request): Json<SelectionEntry>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.write().await;
    *session = request.apply(session.clone())?;
    tracing::debug!(
        category = %request.category,
        indicators = session.selection().indicator_count(),
        "Selection updated"
    );
    Ok(Json(SessionResponse::from_session(&session)))
}

/// Freeze the selection and start evaluating.
pub async fn evaluate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    if !session.is_frozen() {
        tracing::info!(
            indicators = session.selection().indicator_count(),
            warnings = session.warnings().len(),
            "Evaluation started"
        );
    }
    *session = session.clone().begin_evaluation();
    Json(SessionResponse::from_session(&session))
}

/// Start over with an empty session.
pub async fn reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    *session = session.reset();
    tracing::info!("Session reset");
    Json(SessionResponse::from_session(&session))
}

// =============================================================================
// EVALUATION HANDLERS
// =============================================================================

/// Everything left to rate, with current answers.
pub async fn evaluation_handler(
    State(state): State<AppState>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let session = state.session.read().await;
    Ok(Json(session.evaluation()?.into()))
}

/// Set or clear answers; all or nothing.
pub async fn answers_handler(
    State(state): State<AppState>,
    Json(request): Json<AnswersRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let mut session = state.session.write().await;
    *session = session
        .clone()
        .answer_all(request.answers.iter().map(|a| (a.key(), a.answer)))?;
    Ok(Json(session.evaluation()?.into()))
}

// =============================================================================
// SUBMIT HANDLER
// =============================================================================

/// Validate, batch and append the session in one store call.
///
/// The session lock is held for the whole call so two submits cannot
/// interleave.
pub async fn submit_handler(
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut session = state.session.write().await;
    let mut backend = state.store.lock().await;

    let (next, batch) =
        store::submit(&session, &mut backend, state.policy, &timestamp_now()).await?;
    *session = next;

    Ok(Json(SubmitResponse::success(&batch, session.submissions())))
}
