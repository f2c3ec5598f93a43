//! # Session Module
//!
//! The explicit state of one respondent's survey.
//!
//! Every stage operation is a transformation `(Session, input) -> Result<Session>`.
//! Callers that must keep the old state on failure clone first and swap in the
//! result only on success; see `apps/survey` handlers.
//!
//! - The catalog is shared, immutable, and never copied per session
//! - Selection is editable only while `Selecting`
//! - Answers are editable only while `Evaluating`
//! - Nothing here is persisted; abandoning a session has no side effects

use crate::batcher::SubmissionBatch;
use crate::catalog::Catalog;
use crate::evaluation::{AnswerMap, EvaluationView};
use crate::primitives::MAX_PROFILE_FIELD_LENGTH;
use crate::selection::{SelectionSet, SelectionWarning};
use crate::storage::SheetStore;
use crate::system::{Stage, StageCapability};
use crate::validator::{CompletenessValidator, ValidationPolicy};
use crate::{AnswerKey, Profile, Scale, SurveyError};
use std::sync::Arc;

/// One respondent's survey state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Shared taxonomy.
    catalog: Arc<Catalog>,
    /// Identification data.
    profile: Profile,
    /// Chosen indicators. Frozen once the stage is `Evaluating`.
    selection: SelectionSet,
    /// Ratings keyed by (category, indicator, criterion).
    answers: AnswerMap,
    /// Current workflow stage.
    stage: Stage,
    /// Successful submissions made from this session.
    submissions: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::builtin()))
    }
}

impl Session {
    /// Create a new session over a shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            profile: Profile::default(),
            selection: SelectionSet::new(),
            answers: AnswerMap::new(),
            stage: Stage::Selecting,
            submissions: 0,
        }
    }

    /// A fresh session over the same catalog.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::new(Arc::clone(&self.catalog))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Current selection (the frozen set once evaluating).
    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Check if the selection can no longer change.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.stage == Stage::Evaluating
    }

    #[must_use]
    pub fn submissions(&self) -> usize {
        self.submissions
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Replace the respondent profile. Free-text fields are trimmed.
    pub fn with_profile(mut self, profile: Profile) -> Result<Self, SurveyError> {
        self.require(StageCapability::EditProfile)?;

        for (field, value) in [("name", &profile.name), ("profession", &profile.profession)] {
            if value.len() > MAX_PROFILE_FIELD_LENGTH {
                return Err(SurveyError::InvalidInput(format!(
                    "{} exceeds {} bytes",
                    field, MAX_PROFILE_FIELD_LENGTH
                )));
            }
        }

        self.profile = Profile {
            name: profile.name.trim().to_string(),
            profession: profile.profession.trim().to_string(),
            ..profile
        };
        Ok(self)
    }

    // =========================================================================
    // SELECTION STAGE
    // =========================================================================

    /// Replace the predefined picks of one category.
    pub fn select(mut self, category: &str, labels: &[String]) -> Result<Self, SurveyError> {
        self.require(StageCapability::EditSelection)?;
        self.selection.choose(&self.catalog, category, labels)?;
        Ok(self)
    }

    /// Replace the free-text proposals of one category.
    pub fn propose(mut self, category: &str, slots: &[String]) -> Result<Self, SurveyError> {
        self.require(StageCapability::EditSelection)?;
        self.selection.propose(&self.catalog, category, slots)?;
        Ok(self)
    }

    /// Advisory warnings on the current selection.
    #[must_use]
    pub fn warnings(&self) -> Vec<SelectionWarning> {
        self.selection.warnings(&self.catalog)
    }

    /// Freeze the selection and switch to evaluation.
    ///
    /// Calling this again once evaluating changes nothing.
    #[must_use]
    pub fn begin_evaluation(mut self) -> Self {
        if let Some(next) = self.stage.next() {
            self.stage = next;
            self.answers.retain_selected(&self.selection);
        }
        self
    }

    // =========================================================================
    // EVALUATION STAGE
    // =========================================================================

    /// Everything left to rate, with current answers.
    pub fn evaluation(&self) -> Result<EvaluationView, SurveyError> {
        self.require(StageCapability::Answer)?;
        Ok(EvaluationView::build(
            &self.catalog,
            &self.selection,
            &self.answers,
        ))
    }

    /// Set (`Some`) or clear (`None`) one answer.
    pub fn answer(mut self, key: AnswerKey, value: Option<Scale>) -> Result<Self, SurveyError> {
        self.require(StageCapability::Answer)?;
        if !self.selection.contains(&key.category, &key.indicator) {
            return Err(SurveyError::UnknownAnswerTarget {
                category: key.category,
                indicator: key.indicator,
            });
        }
        self.answers.set(key, value);
        Ok(self)
    }

    /// Apply several answers; stops at the first rejected one.
    pub fn answer_all(
        self,
        entries: impl IntoIterator<Item = (AnswerKey, Option<Scale>)>,
    ) -> Result<Self, SurveyError> {
        entries
            .into_iter()
            .try_fold(self, |session, (key, value)| session.answer(key, value))
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Run the completeness validator.
    pub fn validate(&self, policy: ValidationPolicy) -> Result<(), SurveyError> {
        self.require(StageCapability::Submit)?;
        CompletenessValidator::with_policy(policy).validate(
            &self.profile,
            &self.selection,
            &self.answers,
        )
    }

    /// Validate and flatten into one batch stamped with `timestamp`.
    pub fn prepare_submission(
        &self,
        policy: ValidationPolicy,
        timestamp: &str,
    ) -> Result<SubmissionBatch, SurveyError> {
        self.validate(policy)?;
        SubmissionBatch::assemble(
            &self.catalog,
            &self.profile,
            &self.selection,
            &self.answers,
            timestamp,
        )
    }

    /// Count a successful append. State is otherwise kept as is.
    #[must_use]
    pub fn record_submission(mut self) -> Self {
        self.submissions = self.submissions.saturating_add(1);
        self
    }

    /// Validate, batch, and append to a synchronous store in one call.
    ///
    /// Returns the updated session and the number of rows written.
    pub fn submit_to<S: SheetStore>(
        self,
        store: &mut S,
        policy: ValidationPolicy,
        timestamp: &str,
    ) -> Result<(Self, usize), SurveyError> {
        let batch = self.prepare_submission(policy, timestamp)?;
        let written = store.append_rows(batch.rows())?;
        Ok((self.record_submission(), written))
    }

    fn require(&self, capability: StageCapability) -> Result<(), SurveyError> {
        if capability.permitted_in(self.stage) {
            return Ok(());
        }
        match capability {
            StageCapability::EditSelection => Err(SurveyError::SelectionFrozen),
            StageCapability::EditProfile
            | StageCapability::Answer
            | StageCapability::Submit => Err(SurveyError::EvaluationNotStarted),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
