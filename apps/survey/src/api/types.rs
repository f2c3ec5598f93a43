//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use survey_core::primitives::{MAX_ADDITIONS_PER_CATEGORY, RECOMMENDED_MIN_SELECTIONS};
use survey_core::{
    AcademicLevel, Catalog, Criterion, EvaluationView, Experience, Profile, ProfileField,
    Province, Scale, SelectionWarning, Session, SubmissionBatch, SurveyError,
};

pub use crate::response::{AnswerEntry, SelectionEntry};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// A closed choice: wire value plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionJson<T> {
    pub value: T,
    pub label: String,
}

/// One category and its predefined indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryJson {
    pub name: String,
    pub indicators: Vec<String>,
}

/// Everything a client needs to render the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub categories: Vec<CategoryJson>,
    pub criteria: Vec<OptionJson<Criterion>>,
    pub scale: Vec<OptionJson<Scale>>,
    pub academic_levels: Vec<OptionJson<AcademicLevel>>,
    pub provinces: Vec<OptionJson<Province>>,
    pub experience: Vec<OptionJson<Experience>>,
    pub max_additions_per_category: usize,
    pub recommended_min_selections: usize,
}

impl CatalogResponse {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            categories: catalog
                .categories()
                .iter()
                .map(|c| CategoryJson {
                    name: c.name.clone(),
                    indicators: c.indicators.clone(),
                })
                .collect(),
            criteria: Criterion::ALL
                .iter()
                .map(|&c| OptionJson { value: c, label: c.label().to_string() })
                .collect(),
            scale: Scale::ALL
                .iter()
                .map(|&s| OptionJson { value: s, label: s.label().to_string() })
                .collect(),
            academic_levels: AcademicLevel::ALL
                .iter()
                .map(|&a| OptionJson { value: a, label: a.label().to_string() })
                .collect(),
            provinces: Province::ALL
                .iter()
                .map(|&p| OptionJson { value: p, label: p.label().to_string() })
                .collect(),
            experience: Experience::ALL
                .iter()
                .map(|&e| OptionJson { value: e, label: e.label().to_string() })
                .collect(),
            max_additions_per_category: MAX_ADDITIONS_PER_CATEGORY,
            recommended_min_selections: RECOMMENDED_MIN_SELECTIONS,
        }
    }
}

// =============================================================================
// SESSION RESPONSE
// =============================================================================

/// Current selection of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionJson {
    pub category: String,
    pub predefined: Vec<String>,
    pub proposed: Vec<String>,
}

/// Advisory warning with its display message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningJson {
    #[serde(flatten)]
    pub warning: SelectionWarning,
    pub message: String,
}

/// Snapshot of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub stage: String,
    pub stage_name: String,
    pub frozen: bool,
    pub profile: Profile,
    pub selection: Vec<SelectionJson>,
    pub indicator_count: usize,
    pub warnings: Vec<WarningJson>,
    pub submissions: usize,
}

impl SessionResponse {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let selection = session
            .selection()
            .iter_ordered(session.catalog())
            .map(|(category, chosen)| SelectionJson {
                category: category.to_string(),
                predefined: chosen.predefined().iter().map(|i| i.label.clone()).collect(),
                proposed: chosen.proposed().iter().map(|i| i.label.clone()).collect(),
            })
            .collect();
        let warnings = session
            .warnings()
            .into_iter()
            .map(|warning| WarningJson {
                message: warning.message(),
                warning,
            })
            .collect();

        Self {
            stage: format!("{:?}", session.stage()),
            stage_name: session.stage().name().to_string(),
            frozen: session.is_frozen(),
            profile: session.profile().clone(),
            selection,
            indicator_count: session.selection().indicator_count(),
            warnings,
            submissions: session.submissions(),
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Answers to set or clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswersRequest {
    pub answers: Vec<AnswerEntry>,
}

/// Evaluation view plus the remaining count.
///
/// `nothing_to_evaluate` is set when the frozen selection is empty, so a form
/// can say so instead of rendering an empty grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub view: EvaluationView,
    pub missing: usize,
    pub nothing_to_evaluate: bool,
}

impl From<EvaluationView> for EvaluationResponse {
    fn from(view: EvaluationView) -> Self {
        let missing = view.missing();
        let nothing_to_evaluate = view.is_empty();
        Self {
            view,
            missing,
            nothing_to_evaluate,
        }
    }
}

// =============================================================================
// SUBMIT RESPONSE
// =============================================================================

/// Successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub rows: usize,
    pub timestamp: String,
    pub submissions: usize,
}

impl SubmitResponse {
    #[must_use]
    pub fn success(batch: &SubmissionBatch, submissions: usize) -> Self {
        Self {
            success: true,
            rows: batch.len(),
            timestamp: batch.timestamp().to_string(),
            submissions,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// What a validation failure is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Missing {
    Fields(Vec<ProfileField>),
    Count(usize),
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Missing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Build the body for `err`. Store failures get a generic message with
    /// the raw cause in `detail`.
    #[must_use]
    pub fn from_error(err: &SurveyError) -> Self {
        let (error, detail) = match err {
            SurveyError::StoreFailure(cause) => (
                "The survey could not be sent. Please try again.".to_string(),
                Some(cause.clone()),
            ),
            other => (other.to_string(), None),
        };
        let missing = match err {
            SurveyError::ProfileIncomplete { missing } => Some(Missing::Fields(missing.clone())),
            SurveyError::IncompleteAnswers { missing } => Some(Missing::Count(*missing)),
            _ => None,
        };

        Self {
            success: false,
            error,
            kind: err.kind().to_string(),
            missing,
            detail,
        }
    }
}

/// HTTP status for a workflow error.
#[must_use]
pub fn status_for(err: &SurveyError) -> StatusCode {
    match err {
        SurveyError::ProfileIncomplete { .. }
        | SurveyError::EmptySelection
        | SurveyError::IncompleteAnswers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SurveyError::StoreFailure(_) => StatusCode::BAD_GATEWAY,
        SurveyError::SelectionFrozen | SurveyError::EvaluationNotStarted => StatusCode::CONFLICT,
        SurveyError::UnknownCategory(_)
        | SurveyError::UnknownIndicator { .. }
        | SurveyError::UnknownAnswerTarget { .. }
        | SurveyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SurveyError::InvalidCatalog(_)
        | SurveyError::SerializationError(_)
        | SurveyError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler error: a `SurveyError` rendered as JSON with its status.
#[derive(Debug)]
pub struct ApiError(pub SurveyError);

impl From<SurveyError> for ApiError {
    fn from(err: SurveyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(&self.0), Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}
