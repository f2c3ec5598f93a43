//! # Core Type Definitions
//!
//! This module contains the value types shared by every survey stage:
//! - Indicator identity (`Indicator`, `Provenance`)
//! - Evaluation vocabulary (`Criterion`, `Scale`, `AnswerKey`)
//! - Respondent profile (`Profile`, `AcademicLevel`, `Province`, `Experience`)
//! - Error types (`SurveyError`)
//!
//! ## Ordering Guarantees
//!
//! Every enum here is a closed, ordered set. Declaration order is the order
//! used for presentation and for row emission, and `Ord` follows it so that
//! `BTreeMap`/`BTreeSet` iteration is deterministic.

use crate::primitives::NEW_INDICATOR_PREFIX;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// INDICATOR
// =============================================================================

/// Where an indicator came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Chosen from the catalog.
    #[default]
    Predefined,
    /// Proposed by the respondent as free text.
    New,
}

impl Provenance {
    /// Cell value written to the store.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Predefined => "Predefinido",
            Provenance::New => "Nuevo",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single item to be evaluated.
///
/// Provenance is carried as a tag. Labels of proposed indicators also carry
/// [`NEW_INDICATOR_PREFIX`] so respondents can tell them apart, but nothing
/// downstream inspects the label to recover the provenance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Indicator {
    /// Display label, unique within its category.
    pub label: String,
    /// Catalog pick or respondent proposal.
    pub provenance: Provenance,
}

impl Indicator {
    /// Create a predefined indicator.
    #[must_use]
    pub fn predefined(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            provenance: Provenance::Predefined,
        }
    }

    /// Create a proposed indicator from free text.
    ///
    /// Returns `None` when the text is empty or whitespace only.
    #[must_use]
    pub fn proposed(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            label: format!("{NEW_INDICATOR_PREFIX}{trimmed}"),
            provenance: Provenance::New,
        })
    }
}

// =============================================================================
// CRITERION & SCALE
// =============================================================================

/// One of the four fixed evaluation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Clarity of the wording.
    Clarity,
    /// Environmental pertinence.
    EnvironmentalPertinence,
    /// Feasibility of measurement.
    Measurability,
    /// Relevance for project control.
    Relevance,
}

impl Criterion {
    /// All criteria in presentation order.
    pub const ALL: [Criterion; 4] = [
        Criterion::Clarity,
        Criterion::EnvironmentalPertinence,
        Criterion::Measurability,
        Criterion::Relevance,
    ];

    /// Cell value written to the store.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Clarity => "Claridad en Redacción",
            Criterion::EnvironmentalPertinence => "Pertinencia Ambiental",
            Criterion::Measurability => "Factibilidad de Medición",
            Criterion::Relevance => "Relevancia Control",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-point agreement scale. "Unanswered" is the absence of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Agree,
    Neutral,
    Disagree,
}

impl Scale {
    /// All scale values in presentation order.
    pub const ALL: [Scale; 3] = [Scale::Agree, Scale::Neutral, Scale::Disagree];

    /// Cell value written to the store.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Scale::Agree => "De Acuerdo (DA)",
            Scale::Neutral => "Neutro (N)",
            Scale::Disagree => "En Desacuerdo (ED)",
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite identity of one evaluation cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnswerKey {
    pub category: String,
    pub indicator: String,
    pub criterion: Criterion,
}

impl AnswerKey {
    /// Create a new answer key.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        indicator: impl Into<String>,
        criterion: Criterion,
    ) -> Self {
        Self {
            category: category.into(),
            indicator: indicator.into(),
            criterion,
        }
    }
}

// =============================================================================
// RESPONDENT PROFILE
// =============================================================================

/// Highest academic degree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AcademicLevel {
    #[default]
    Bachelor,
    Licentiate,
    Master,
    Doctorate,
}

impl AcademicLevel {
    pub const ALL: [AcademicLevel; 4] = [
        AcademicLevel::Bachelor,
        AcademicLevel::Licentiate,
        AcademicLevel::Master,
        AcademicLevel::Doctorate,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AcademicLevel::Bachelor => "Bachillerato",
            AcademicLevel::Licentiate => "Licenciatura",
            AcademicLevel::Master => "Maestría",
            AcademicLevel::Doctorate => "Doctorado",
        }
    }
}

/// Province of residence or work.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Province {
    #[default]
    SanJose,
    Alajuela,
    Cartago,
    Heredia,
    Guanacaste,
    Puntarenas,
    Limon,
    Abroad,
}

impl Province {
    pub const ALL: [Province; 8] = [
        Province::SanJose,
        Province::Alajuela,
        Province::Cartago,
        Province::Heredia,
        Province::Guanacaste,
        Province::Puntarenas,
        Province::Limon,
        Province::Abroad,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Province::SanJose => "San José",
            Province::Alajuela => "Alajuela",
            Province::Cartago => "Cartago",
            Province::Heredia => "Heredia",
            Province::Guanacaste => "Guanacaste",
            Province::Puntarenas => "Puntarenas",
            Province::Limon => "Limón",
            Province::Abroad => "Fuera de Costa Rica",
        }
    }
}

/// Years of experience in infrastructure projects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    #[default]
    NoExperience,
    UnderFive,
    FiveToTen,
    OverTen,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::NoExperience,
        Experience::UnderFive,
        Experience::FiveToTen,
        Experience::OverTen,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Experience::NoExperience => "No tengo experiencia en infraestructura",
            Experience::UnderFive => "Menos de 5 años",
            Experience::FiveToTen => "5 - 10 años",
            Experience::OverTen => "Más de 10 años",
        }
    }
}

/// Identification data of the respondent, attached to every submitted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub profession: String,
    pub academic_level: AcademicLevel,
    pub province: Province,
    pub experience: Experience,
}

/// Required free-text profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Profession,
}

impl ProfileField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Profession => "profession",
        }
    }
}

fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(ProfileField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the survey workflow.
///
/// - Validation errors are local and recoverable: the respondent edits and resubmits
/// - No error ends the session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// Name or profession missing at submission time.
    #[error("Respondent profile incomplete: missing {}", join_fields(.missing))]
    ProfileIncomplete { missing: Vec<ProfileField> },

    /// No indicator is present in the frozen selection.
    #[error("No indicators selected for evaluation")]
    EmptySelection,

    /// One or more (indicator, criterion) cells are unanswered.
    #[error("{missing} answers are still missing")]
    IncompleteAnswers { missing: usize },

    /// The store rejected or failed the bulk append.
    #[error("Store failure: {0}")]
    StoreFailure(String),

    /// The category is not part of the catalog.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The label is not a predefined indicator of the category.
    #[error("Unknown indicator in {category}: {label}")]
    UnknownIndicator { category: String, label: String },

    /// The answer refers to an indicator outside the frozen selection.
    #[error("Not selected for evaluation: {category} / {indicator}")]
    UnknownAnswerTarget { category: String, indicator: String },

    /// Selection edits after the stage transition.
    #[error("Selection is frozen once evaluation has started")]
    SelectionFrozen,

    /// Evaluation operations before the stage transition.
    #[error("Evaluation has not started")]
    EvaluationNotStarted,

    /// A custom catalog failed validation.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Input rejected at the boundary (length limits, slot count).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SurveyError {
    /// Stable snake_case discriminator for API clients.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SurveyError::ProfileIncomplete { .. } => "profile_incomplete",
            SurveyError::EmptySelection => "empty_selection",
            SurveyError::IncompleteAnswers { .. } => "incomplete_answers",
            SurveyError::StoreFailure(_) => "store_failure",
            SurveyError::UnknownCategory(_) => "unknown_category",
            SurveyError::UnknownIndicator { .. } => "unknown_indicator",
            SurveyError::UnknownAnswerTarget { .. } => "unknown_answer_target",
            SurveyError::SelectionFrozen => "selection_frozen",
            SurveyError::EvaluationNotStarted => "evaluation_not_started",
            SurveyError::InvalidCatalog(_) => "invalid_catalog",
            SurveyError::InvalidInput(_) => "invalid_input",
            SurveyError::SerializationError(_) => "serialization_error",
            SurveyError::IoError(_) => "io_error",
        }
    }

    /// Check if this is one of the three submission validation failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SurveyError::ProfileIncomplete { .. }
                | SurveyError::EmptySelection
                | SurveyError::IncompleteAnswers { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_proposal_yields_nothing() {
        assert!(Indicator::proposed("").is_none());
        assert!(Indicator::proposed("   \t ").is_none());
    }

    #[test]
    fn proposal_is_trimmed_and_prefixed() {
        let indicator = Indicator::proposed("  Monitoreo X ").expect("proposal");
        assert_eq!(indicator.label, "(NUEVO) Monitoreo X");
        assert_eq!(indicator.provenance, Provenance::New);
    }

    #[test]
    fn provenance_is_not_inferred_from_label() {
        let indicator = Indicator::predefined("(NUEVO) looks new");
        assert_eq!(indicator.provenance.label(), "Predefinido");
    }

    #[test]
    fn criteria_ordering_follows_declaration() {
        let mut sorted = Criterion::ALL;
        sorted.sort();
        assert_eq!(sorted, Criterion::ALL);
    }

    #[test]
    fn profile_defaults_to_first_options() {
        let profile = Profile::default();
        assert_eq!(profile.academic_level.label(), "Bachillerato");
        assert_eq!(profile.province.label(), "San José");
        assert_eq!(
            profile.experience.label(),
            "No tengo experiencia en infraestructura"
        );
    }

    #[test]
    fn error_messages() {
        let err = SurveyError::ProfileIncomplete {
            missing: vec![ProfileField::Name, ProfileField::Profession],
        };
        assert_eq!(
            err.to_string(),
            "Respondent profile incomplete: missing name, profession"
        );
        assert_eq!(
            SurveyError::IncompleteAnswers { missing: 3 }.to_string(),
            "3 answers are still missing"
        );
        assert!(err.is_validation());
        assert!(!SurveyError::SelectionFrozen.is_validation());
    }
}
