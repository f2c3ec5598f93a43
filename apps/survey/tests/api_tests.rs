//! Integration tests for the survey HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use survey::api::{
    AppState, CatalogResponse, ErrorResponse, EvaluationResponse, HealthResponse, Missing,
    SessionResponse, SubmitResponse, create_router,
};
use survey::sheets::SheetsClient;
use survey::store::SheetBackend;
use survey_core::{MemorySheet, ProfileField, Session, SheetStore, SubmissionRow, ValidationPolicy};

/// Mutex to serialize tests since some modify env vars.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

const AIR: &str = "Calidad del Aire";
const WATER: &str = "Calidad del Agua";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("SURVEY_API_KEY") };
    }
}

fn lock_env() -> TestGuard {
    let guard = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("SURVEY_API_KEY") };
    TestGuard { _guard: guard }
}

/// Create a test server over a fresh session and an in-memory store.
/// Returns the state too, so tests can look at the stored rows.
fn create_test_server() -> (TestServer, AppState, TestGuard) {
    create_test_server_with(SheetBackend::Memory(MemorySheet::new()))
}

fn create_test_server_with(backend: SheetBackend) -> (TestServer, AppState, TestGuard) {
    let guard = lock_env();
    let state = AppState::new(Session::default(), backend, ValidationPolicy::default());
    let router = create_router(state.clone());
    (TestServer::new(router).unwrap(), state, guard)
}

async fn stored_rows(state: &AppState) -> Vec<SubmissionRow> {
    let backend = state.store.lock().await;
    match &*backend {
        SheetBackend::Memory(sheet) => sheet.rows().unwrap(),
        other => panic!("expected memory backend, got {:?}", other.kind()),
    }
}

async fn fill_profile(server: &TestServer) {
    server
        .put("/session/profile")
        .json(&json!({
            "name": "Ana",
            "profession": "Bióloga",
            "academic_level": "master",
            "province": "cartago",
            "experience": "five_to_ten"
        }))
        .await
        .assert_status_ok();
}

async fn select_one_air_indicator(server: &TestServer) {
    server
        .put("/session/selection")
        .json(&json!({ "category": AIR, "predefined": ["Monitoreo de gases"] }))
        .await
        .assert_status_ok();
}

fn all_criteria(category: &str, indicator: &str, answer: &str) -> Vec<serde_json::Value> {
    ["clarity", "environmental_pertinence", "measurability", "relevance"]
        .iter()
        .map(|criterion| {
            json!({
                "category": category,
                "indicator": indicator,
                "criterion": criterion,
                "answer": answer
            })
        })
        .collect()
}

// =============================================================================
// HEALTH & CATALOG
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _state, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_catalog_lists_categories_in_order() {
    let (server, _state, _guard) = create_test_server();

    let response = server.get("/catalog").await;

    response.assert_status_ok();
    let catalog: CatalogResponse = response.json();
    assert_eq!(catalog.categories[0].name, AIR);
    assert_eq!(catalog.categories[1].name, WATER);
    assert_eq!(catalog.criteria.len(), 4);
    assert_eq!(catalog.scale.len(), 3);
    assert_eq!(catalog.scale[0].label, "De Acuerdo (DA)");
    assert_eq!(catalog.max_additions_per_category, 2);
    assert_eq!(catalog.recommended_min_selections, 2);
}

// =============================================================================
// SELECTION STAGE
// =============================================================================

#[tokio::test]
async fn test_fresh_session_is_selecting() {
    let (server, _state, _guard) = create_test_server();

    let session: SessionResponse = server.get("/session").await.json();

    assert_eq!(session.stage, "Selecting");
    assert!(!session.frozen);
    assert_eq!(session.indicator_count, 0);
    assert_eq!(session.submissions, 0);
}

#[tokio::test]
async fn test_single_pick_warns_but_succeeds() {
    let (server, _state, _guard) = create_test_server();

    let response = server
        .put("/session/selection")
        .json(&json!({ "category": AIR, "predefined": ["Monitoreo de gases"] }))
        .await;

    response.assert_status_ok();
    let session: SessionResponse = response.json();
    assert_eq!(session.indicator_count, 1);
    assert_eq!(session.warnings.len(), 1);
    assert!(session.warnings[0].message.contains(AIR));
}

#[tokio::test]
async fn test_proposals_are_prefixed() {
    let (server, _state, _guard) = create_test_server();

    let session: SessionResponse = server
        .put("/session/selection")
        .json(&json!({ "category": AIR, "proposed": ["  Monitoreo X ", ""] }))
        .await
        .json();

    assert_eq!(session.selection[0].proposed, vec!["(NUEVO) Monitoreo X"]);
    // Proposals alone do not count towards the recommendation.
    assert!(session.warnings.is_empty());
}

#[tokio::test]
async fn test_unknown_indicator_rejected() {
    let (server, _state, _guard) = create_test_server();

    let response = server
        .put("/session/selection")
        .json(&json!({ "category": AIR, "predefined": ["Not in catalog"] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "unknown_indicator");

    let session: SessionResponse = server.get("/session").await.json();
    assert_eq!(session.indicator_count, 0);
}

#[tokio::test]
async fn test_selection_frozen_after_evaluate() {
    let (server, _state, _guard) = create_test_server();
    select_one_air_indicator(&server).await;

    let session: SessionResponse = server.post("/session/evaluate").await.json();
    assert!(session.frozen);
    assert_eq!(session.stage_name, "Evaluación de Indicadores");

    let response = server
        .put("/session/selection")
        .json(&json!({ "category": WATER, "predefined": ["Mediciones de calidad del agua"] }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "selection_frozen");
}

// =============================================================================
// EVALUATION STAGE
// =============================================================================

#[tokio::test]
async fn test_evaluation_before_transition_conflicts() {
    let (server, _state, _guard) = create_test_server();

    let response = server.get("/session/evaluation").await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "evaluation_not_started");
}

#[tokio::test]
async fn test_evaluation_lists_selected_only() {
    let (server, _state, _guard) = create_test_server();
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await.assert_status_ok();

    let evaluation: EvaluationResponse = server.get("/session/evaluation").await.json();

    assert_eq!(evaluation.view.categories.len(), 1);
    assert_eq!(evaluation.view.categories[0].name, AIR);
    assert_eq!(evaluation.view.categories[0].items[0].answers.len(), 4);
    assert_eq!(evaluation.missing, 4);
    assert!(!evaluation.nothing_to_evaluate);
}

#[tokio::test]
async fn test_empty_selection_has_nothing_to_evaluate() {
    let (server, _state, _guard) = create_test_server();
    server.post("/session/evaluate").await.assert_status_ok();

    let response = server.get("/session/evaluation").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["nothing_to_evaluate"], true);
    assert_eq!(body["missing"], 0);
}

#[tokio::test]
async fn test_answers_update_missing_count() {
    let (server, _state, _guard) = create_test_server();
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;

    let mut answers = all_criteria(AIR, "Monitoreo de gases", "agree");
    answers.truncate(3);
    let response = server
        .put("/session/answers")
        .json(&json!({ "answers": answers }))
        .await;

    response.assert_status_ok();
    let evaluation: EvaluationResponse = response.json();
    assert_eq!(evaluation.missing, 1);
}

#[tokio::test]
async fn test_answers_all_or_nothing() {
    let (server, _state, _guard) = create_test_server();
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;

    let mut answers = all_criteria(AIR, "Monitoreo de gases", "agree");
    answers.push(json!({
        "category": WATER,
        "indicator": "Mediciones de calidad del agua",
        "criterion": "clarity",
        "answer": "agree"
    }));
    let response = server
        .put("/session/answers")
        .json(&json!({ "answers": answers }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let evaluation: EvaluationResponse = server.get("/session/evaluation").await.json();
    assert_eq!(evaluation.missing, 4);
}

// =============================================================================
// SUBMISSION
// =============================================================================

#[tokio::test]
async fn test_submit_without_profile_lists_fields() {
    let (server, state, _guard) = create_test_server();
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;

    let response = server.post("/session/submit").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "profile_incomplete");
    assert_eq!(
        error.missing,
        Some(Missing::Fields(vec![ProfileField::Name, ProfileField::Profession]))
    );
    assert!(stored_rows(&state).await.is_empty());
}

#[tokio::test]
async fn test_submit_empty_selection() {
    let (server, _state, _guard) = create_test_server();
    fill_profile(&server).await;
    server.post("/session/evaluate").await;

    let response = server.post("/session/submit").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "empty_selection");
}

#[tokio::test]
async fn test_submit_reports_missing_count() {
    let (server, state, _guard) = create_test_server();
    fill_profile(&server).await;
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;
    let mut answers = all_criteria(AIR, "Monitoreo de gases", "neutral");
    answers.truncate(3);
    server
        .put("/session/answers")
        .json(&json!({ "answers": answers }))
        .await;

    let response = server.post("/session/submit").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.missing, Some(Missing::Count(1)));
    assert_eq!(error.error, "1 answers are still missing");
    assert!(stored_rows(&state).await.is_empty());
}

#[tokio::test]
async fn test_submit_writes_one_batch() {
    let (server, state, _guard) = create_test_server();
    fill_profile(&server).await;
    server
        .put("/session/selection")
        .json(&json!({
            "category": AIR,
            "predefined": ["Monitoreo de gases"],
            "proposed": ["Monitoreo X"]
        }))
        .await
        .assert_status_ok();
    server.post("/session/evaluate").await;
    let mut answers = all_criteria(AIR, "Monitoreo de gases", "agree");
    answers.extend(all_criteria(AIR, "(NUEVO) Monitoreo X", "disagree"));
    server
        .put("/session/answers")
        .json(&json!({ "answers": answers }))
        .await
        .assert_status_ok();

    let response = server.post("/session/submit").await;

    response.assert_status_ok();
    let submit: SubmitResponse = response.json();
    assert!(submit.success);
    assert_eq!(submit.rows, 8);
    assert_eq!(submit.submissions, 1);

    let rows = stored_rows(&state).await;
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|r| r.timestamp == submit.timestamp));
    assert_eq!(rows[0].name, "Ana");
    assert_eq!(rows[0].provenance, "Predefinido");
    assert_eq!(rows[4].indicator, "(NUEVO) Monitoreo X");
    assert_eq!(rows[4].provenance, "Nuevo");
    assert_eq!(rows[4].answer, "En Desacuerdo (ED)");

    let backend = state.store.lock().await;
    if let SheetBackend::Memory(sheet) = &*backend {
        assert_eq!(sheet.append_calls(), 1);
    }
}

#[tokio::test]
async fn test_store_failure_keeps_session() {
    let client = SheetsClient::new(
        "http://127.0.0.1:9",
        "sheet-id",
        "Sheet1",
        "token",
        Duration::from_secs(2),
    )
    .unwrap();
    let (server, _state, _guard) = create_test_server_with(SheetBackend::Remote(client));
    fill_profile(&server).await;
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;
    server
        .put("/session/answers")
        .json(&json!({ "answers": all_criteria(AIR, "Monitoreo de gases", "agree") }))
        .await;

    let response = server.post("/session/submit").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "store_failure");
    assert!(error.detail.is_some());

    let session: SessionResponse = server.get("/session").await.json();
    assert_eq!(session.submissions, 0);
    assert_eq!(session.profile.name, "Ana");
    let evaluation: EvaluationResponse = server.get("/session/evaluation").await.json();
    assert_eq!(evaluation.missing, 0);
}

#[tokio::test]
async fn test_reset_starts_over() {
    let (server, _state, _guard) = create_test_server();
    fill_profile(&server).await;
    select_one_air_indicator(&server).await;
    server.post("/session/evaluate").await;

    let session: SessionResponse = server.post("/session/reset").await.json();

    assert_eq!(session.stage, "Selecting");
    assert!(session.profile.name.is_empty());
    assert_eq!(session.indicator_count, 0);
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_auth_required_when_key_set() {
    let guard = lock_env();
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("SURVEY_API_KEY", "test-key") };
    let state = AppState::new(
        Session::default(),
        SheetBackend::Memory(MemorySheet::new()),
        ValidationPolicy::default(),
    );
    let server = TestServer::new(create_router(state)).unwrap();

    server.get("/health").await.assert_status_ok();
    server.get("/catalog").await.assert_status_ok();
    server
        .get("/session")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/session")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/session")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer test-key"))
        .await
        .assert_status_ok();

    drop(guard);
}
